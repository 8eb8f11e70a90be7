//! Mapping between display (screen) points and image pixels

use crate::domain::{Point, Rect};

/// Image pixel size plus the rectangle the image is displayed in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    pub image_width: f32,
    pub image_height: f32,
    pub display: Rect,
}

impl Default for CoordinateSpace {
    fn default() -> Self {
        Self::identity(0.0, 0.0)
    }
}

impl CoordinateSpace {
    pub fn new(image_width: f32, image_height: f32, display: Rect) -> Self {
        Self {
            image_width,
            image_height,
            display,
        }
    }

    /// Image displayed at its native size at the origin
    pub fn identity(image_width: f32, image_height: f32) -> Self {
        Self::new(
            image_width,
            image_height,
            Rect::from_xywh(0.0, 0.0, image_width, image_height),
        )
    }

    /// Display pixels per image pixel
    pub fn scale(&self) -> f32 {
        if self.image_width > 0.0 {
            self.display.width() / self.image_width
        } else {
            1.0
        }
    }

    fn is_degenerate(&self) -> bool {
        self.image_width <= 0.0 || self.display.width() <= 0.0
    }

    pub fn screen_to_image(&self, p: Point) -> Point {
        if self.is_degenerate() {
            return p;
        }
        let inv = self.image_width / self.display.width();
        Point::new(
            (p.x - self.display.left) * inv,
            (p.y - self.display.top) * inv,
        )
    }

    pub fn image_to_screen(&self, p: Point) -> Point {
        if self.is_degenerate() {
            return p;
        }
        let scale = self.display.width() / self.image_width;
        Point::new(
            p.x * scale + self.display.left,
            p.y * scale + self.display.top,
        )
    }

    /// Map an image-space rectangle to screen space
    pub fn rect_to_screen(&self, r: &Rect) -> Rect {
        Rect::from_corners(
            self.image_to_screen(r.origin()),
            self.image_to_screen(Point::new(r.right, r.bottom)),
        )
    }
}
