//! Padding frame around exported screenshots
//!
//! With padding enabled the screenshot sits inset on a gradient backdrop,
//! clipped to a rounded rectangle and optionally lifted by a soft shadow.

use image::RgbaImage;
use tiny_skia::{
    FillRule, GradientStop, LinearGradient, Mask, Paint, Pixmap, PixmapPaint, SpreadMode,
    Transform,
};

use super::image::{image_from_pixmap, pixmap_from_image, rounded_rect_path};
use crate::config::ShapeColor;
use crate::domain::Rect;
use crate::export::ExportError;

/// Gradient painted behind a padded screenshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientBackground {
    pub start: ShapeColor,
    pub end: ShapeColor,
    /// Direction in degrees, counter-clockwise from +X as seen on screen
    pub angle_degrees: f32,
}

impl Default for GradientBackground {
    fn default() -> Self {
        Self {
            start: ShapeColor::PURPLE,
            end: ShapeColor::BLUE,
            angle_degrees: 45.0,
        }
    }
}

/// Drop shadow cast by the inset screenshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowOptions {
    pub enabled: bool,
    /// Blur radius in pixels
    pub radius: f32,
    pub opacity: f32,
    /// Downward offset in pixels
    pub offset_y: f32,
}

impl Default for ShadowOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 20.0,
            opacity: 0.3,
            offset_y: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddingOptions {
    pub enabled: bool,
    /// Padding on each side in pixels
    pub amount: f32,
    pub corner_radius: f32,
    pub gradient: GradientBackground,
    pub shadow: ShadowOptions,
}

impl Default for PaddingOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 40.0,
            corner_radius: 12.0,
            gradient: GradientBackground::default(),
            shadow: ShadowOptions::default(),
        }
    }
}

impl PaddingOptions {
    /// Whole-pixel inset of the screenshot (0 when disabled)
    pub fn inset(&self) -> u32 {
        if self.enabled {
            self.amount.max(0.0).round() as u32
        } else {
            0
        }
    }
}

/// Options for flattening annotations into an exported image
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    pub padding: PaddingOptions,
}

/// Canvas with the base image placed on it, ready for annotations
pub(crate) struct Canvas {
    pub pixmap: Pixmap,
    /// Offset of the base image's origin on the canvas
    pub inset: f32,
}

/// Build the export canvas: the base image alone, or framed on a backdrop
pub(crate) fn compose_canvas(base: &RgbaImage, padding: &PaddingOptions) -> Result<Canvas, ExportError> {
    let base_pixmap = pixmap_from_image(base)?;
    let inset = padding.inset();
    if !padding.enabled {
        return Ok(Canvas {
            pixmap: base_pixmap,
            inset: 0.0,
        });
    }

    let padded = |side: u32| inset.checked_mul(2).and_then(|both| side.checked_add(both));
    let (Some(width), Some(height)) = (padded(base.width()), padded(base.height())) else {
        return Err(ExportError::RenderFailed(format!(
            "padding of {} px does not fit a {}x{} image",
            inset,
            base.width(),
            base.height()
        )));
    };
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        ExportError::RenderFailed(format!("cannot allocate {}x{} canvas", width, height))
    })?;

    fill_gradient(&mut pixmap, &padding.gradient);

    let image_rect = Rect::from_xywh(
        inset as f32,
        inset as f32,
        base.width() as f32,
        base.height() as f32,
    );
    let radius = padding.corner_radius;

    if padding.shadow.enabled && padding.shadow.opacity > 0.0 {
        draw_shadow(&mut pixmap, image_rect, radius, &padding.shadow)?;
    }

    if let Some(path) = rounded_rect_path(image_rect, radius) {
        // Backing card so transparent screenshots still read as a card
        let mut paint = Paint::default();
        paint.set_color(tiny_skia::Color::WHITE);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

        let mut clip = Mask::new(width, height)
            .ok_or_else(|| ExportError::RenderFailed("cannot allocate clip mask".into()))?;
        clip.fill_path(&path, FillRule::Winding, true, Transform::identity());
        pixmap.draw_pixmap(
            inset as i32,
            inset as i32,
            base_pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            Some(&clip),
        );
    }

    Ok(Canvas {
        pixmap,
        inset: inset as f32,
    })
}

/// Gradient endpoints spanning the canvas through its center along the angle
fn gradient_endpoints(width: f32, height: f32, angle_degrees: f32) -> (tiny_skia::Point, tiny_skia::Point) {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    // Y down on the pixmap, so a positive angle points up
    let (dx, dy) = (cos, -sin);
    let half = (width * 0.5 * cos).abs() + (height * 0.5 * sin).abs();
    let (cx, cy) = (width * 0.5, height * 0.5);
    (
        tiny_skia::Point::from_xy(cx - dx * half, cy - dy * half),
        tiny_skia::Point::from_xy(cx + dx * half, cy + dy * half),
    )
}

fn fill_gradient(pixmap: &mut Pixmap, gradient: &GradientBackground) {
    let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
    let (start, end) = gradient_endpoints(w, h, gradient.angle_degrees);
    let shader = LinearGradient::new(
        start,
        end,
        vec![
            GradientStop::new(0.0, gradient.start.into()),
            GradientStop::new(1.0, gradient.end.into()),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );

    let mut paint = Paint::default();
    match shader {
        Some(shader) => paint.shader = shader,
        // Degenerate gradient (zero-sized canvas or identical endpoints)
        None => paint.set_color(gradient.start.into()),
    }
    if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, w, h) {
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

fn draw_shadow(
    pixmap: &mut Pixmap,
    image_rect: Rect,
    radius: f32,
    shadow: &ShadowOptions,
) -> Result<(), ExportError> {
    let Some(path) = rounded_rect_path(image_rect.translate(0.0, shadow.offset_y), radius) else {
        return Ok(());
    };
    let mut layer = Pixmap::new(pixmap.width(), pixmap.height())
        .ok_or_else(|| ExportError::RenderFailed("cannot allocate shadow layer".into()))?;
    let mut paint = Paint::default();
    paint.set_color(ShapeColor::BLACK.with_alpha(shadow.opacity.clamp(0.0, 1.0)).into());
    paint.anti_alias = true;
    layer.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

    let layer = if shadow.radius > 0.0 {
        // Blur radius reads as roughly two standard deviations
        let blurred = image::imageops::blur(&image_from_pixmap(&layer), shadow.radius / 2.0);
        pixmap_from_image(&blurred)?
    } else {
        layer
    };

    pixmap.draw_pixmap(
        0,
        0,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba(px))
    }

    #[test]
    fn test_disabled_padding_keeps_size() {
        let base = solid(20, 10, [10, 20, 30, 255]);
        let canvas = compose_canvas(&base, &PaddingOptions::default()).unwrap();
        assert_eq!((canvas.pixmap.width(), canvas.pixmap.height()), (20, 10));
        assert_eq!(canvas.inset, 0.0);
    }

    #[test]
    fn test_padding_grows_canvas_and_insets_image() {
        let base = solid(20, 10, [0, 255, 0, 255]);
        let options = PaddingOptions {
            enabled: true,
            amount: 8.0,
            corner_radius: 0.0,
            shadow: ShadowOptions {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let canvas = compose_canvas(&base, &options).unwrap();
        assert_eq!((canvas.pixmap.width(), canvas.pixmap.height()), (36, 26));
        let out = image_from_pixmap(&canvas.pixmap);
        assert_eq!(out.get_pixel(18, 13).0, [0, 255, 0, 255]);
        // Backdrop is gradient, not the screenshot
        assert_ne!(out.get_pixel(1, 1).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_rounded_corners_clip_image() {
        let base = solid(40, 40, [0, 255, 0, 255]);
        let options = PaddingOptions {
            enabled: true,
            amount: 10.0,
            corner_radius: 12.0,
            shadow: ShadowOptions {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let out = image_from_pixmap(&compose_canvas(&base, &options).unwrap().pixmap);
        // Exact corner of the inset image lies outside the rounded clip
        assert_ne!(out.get_pixel(10, 10).0, [0, 255, 0, 255]);
        assert_eq!(out.get_pixel(30, 30).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_shadow_darkens_below_image() {
        let base = solid(20, 20, [255, 255, 255, 255]);
        let mut options = PaddingOptions {
            enabled: true,
            amount: 20.0,
            corner_radius: 0.0,
            gradient: GradientBackground {
                start: ShapeColor::WHITE,
                end: ShapeColor::WHITE,
                angle_degrees: 0.0,
            },
            shadow: ShadowOptions {
                enabled: false,
                ..Default::default()
            },
        };
        let plain = image_from_pixmap(&compose_canvas(&base, &options).unwrap().pixmap);
        options.shadow = ShadowOptions {
            enabled: true,
            radius: 4.0,
            opacity: 0.5,
            offset_y: 6.0,
        };
        let shadowed = image_from_pixmap(&compose_canvas(&base, &options).unwrap().pixmap);
        // Just below the image's bottom edge
        let (x, y) = (30, 43);
        assert!(shadowed.get_pixel(x, y).0[0] < plain.get_pixel(x, y).0[0]);
    }

    #[test]
    fn test_huge_padding_is_render_error() {
        let base = solid(4, 4, [0, 0, 0, 255]);
        let options = PaddingOptions {
            enabled: true,
            amount: 3.0e9,
            ..Default::default()
        };
        assert!(matches!(
            compose_canvas(&base, &options),
            Err(ExportError::RenderFailed(_))
        ));
    }

    #[test]
    fn test_gradient_endpoints_horizontal() {
        let (a, b) = gradient_endpoints(100.0, 50.0, 0.0);
        assert!((a.x - 0.0).abs() < 1e-3 && (b.x - 100.0).abs() < 1e-3);
        assert!((a.y - 25.0).abs() < 1e-3 && (b.y - 25.0).abs() < 1e-3);
    }
}
