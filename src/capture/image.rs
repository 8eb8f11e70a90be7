//! Screenshot image that annotations are drawn over

use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::domain::Rect;
use crate::session::CoordinateSpace;

/// A loaded screenshot in RGBA form
#[derive(Clone, Debug)]
pub struct BaseImage {
    pub rgba: RgbaImage,
}

impl BaseImage {
    pub fn new(rgba: RgbaImage) -> Self {
        Self { rgba }
    }

    /// Decode a screenshot file (any format the `image` crate reads)
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let rgba = image::open(path)
            .with_context(|| format!("failed to open screenshot {}", path.display()))?
            .to_rgba8();
        log::debug!(
            "BaseImage loaded: {}x{} pixels from {}",
            rgba.width(),
            rgba.height(),
            path.display()
        );
        Ok(Self { rgba })
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Coordinate space for showing this image inside `display`
    pub fn coordinate_space(&self, display: Rect) -> CoordinateSpace {
        CoordinateSpace::new(self.width() as f32, self.height() as f32, display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        RgbaImage::from_pixel(6, 4, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        let base = BaseImage::open(&path).unwrap();
        assert_eq!((base.width(), base.height()), (6, 4));
        assert_eq!(base.rgba.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_open_missing_file_has_context() {
        let err = BaseImage::open(Path::new("/nonexistent/shot.png")).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to open screenshot"));
    }

    #[test]
    fn test_coordinate_space_scale() {
        let base = BaseImage::new(RgbaImage::new(200, 100));
        let space = base.coordinate_space(Rect::from_xywh(0.0, 0.0, 100.0, 50.0));
        assert_eq!(space.scale(), 0.5);
    }
}
