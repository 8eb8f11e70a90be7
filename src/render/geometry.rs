//! Shared geometry calculations for annotations
//!
//! Bounding boxes, arrow curves and text boxes are derived here and used by
//! hit testing, the transform engine and the rasterizer alike, so that what
//! the user grabs is exactly what gets exported.

use crate::domain::{Annotation, AnnotationKind, Point, Rect, TextContent};
use crate::config::TextAlignment;

use super::text::TextMeasure;

/// Arrow geometry constants
pub mod arrow {
    /// Arrowhead wing angle from the shaft in radians (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;
    /// Shortest arrowhead, regardless of stroke width
    pub const MIN_HEAD_LENGTH: f32 = 10.0;
    /// Arrowhead length per unit of stroke width
    pub const HEAD_LENGTH_PER_STROKE: f32 = 4.0;
    /// Average path deviation (px) below which the shaft stays straight
    pub const CURVE_THRESHOLD: f32 = 3.0;
    /// Control point exaggeration applied to the average deviation
    pub const CURVE_GAIN: f32 = 1.5;

    pub fn head_length(stroke_width: f32) -> f32 {
        MIN_HEAD_LENGTH.max(stroke_width * HEAD_LENGTH_PER_STROKE)
    }
}

/// Shape (rectangle/oval) geometry constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Text box constants
pub mod text {
    /// Narrowest measured text box, so empty text stays grabbable
    pub const MIN_WIDTH: f32 = 10.0;
    /// Upper clamp for background paddings set by resizing
    pub const MAX_BACKGROUND_PADDING: f32 = 50.0;
}

/// Calculate ellipse center and radii from bounding box
#[inline]
pub fn ellipse_from_bounds(rect: &Rect) -> (f32, f32, f32, f32) {
    let center = rect.center();
    let rx = (rect.width() * 0.5).max(1.0);
    let ry = (rect.height() * 0.5).max(1.0);
    (center.x, center.y, rx, ry)
}

/// Tip of the arrow: the last path sample, or `end` for a straight arrow
pub fn arrow_end(annotation: &Annotation) -> Point {
    annotation.points().last().copied().unwrap_or(annotation.end)
}

/// Quadratic control point approximating the drawn path of an arrow.
///
/// Averages the signed perpendicular distance of every path sample to the
/// start→end chord. Small deviations keep the arrow straight.
pub fn arrow_control_point(start: Point, end: Point, points: &[Point]) -> Point {
    let mid = start.midpoint(end);
    if points.is_empty() {
        return mid;
    }

    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len = dx.hypot(dy);
    if len <= 0.0 {
        return mid;
    }

    let total: f32 = points
        .iter()
        .map(|p| ((p.y - start.y) * dx - (p.x - start.x) * dy) / len)
        .sum();
    let avg = total / points.len() as f32;
    if avg.abs() < arrow::CURVE_THRESHOLD {
        return mid;
    }

    let (perp_x, perp_y) = (-dy / len, dx / len);
    mid.offset(
        perp_x * avg * arrow::CURVE_GAIN,
        perp_y * avg * arrow::CURVE_GAIN,
    )
}

/// Filled triangle at the end of an arrow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

impl ArrowHead {
    /// Where the shaft meets the head (midpoint of the wings)
    pub fn base(&self) -> Point {
        self.left.midpoint(self.right)
    }
}

/// Arrowhead oriented along the tangent from the control point into the tip
pub fn arrow_head(tip: Point, control: Point, stroke_width: f32) -> ArrowHead {
    let angle = (tip.y - control.y).atan2(tip.x - control.x);
    let len = arrow::head_length(stroke_width);
    let wing = |a: f32| Point::new(tip.x - len * a.cos(), tip.y - len * a.sin());
    ArrowHead {
        tip,
        left: wing(angle - arrow::HEAD_ANGLE),
        right: wing(angle + arrow::HEAD_ANGLE),
    }
}

/// Shaft and head of an arrow annotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    pub start: Point,
    pub control: Point,
    pub head: ArrowHead,
}

pub fn arrow_geometry(annotation: &Annotation) -> ArrowGeometry {
    let start = annotation.start;
    let tip = arrow_end(annotation);
    let control = arrow_control_point(start, tip, annotation.points());
    ArrowGeometry {
        start,
        control,
        head: arrow_head(tip, control, annotation.stroke_width),
    }
}

/// Vertices of a pen stroke in drawing order
pub fn pen_vertices(annotation: &Annotation) -> Vec<Point> {
    let points = annotation.points();
    if points.is_empty() {
        vec![annotation.start, annotation.end]
    } else {
        std::iter::once(annotation.start).chain(points.iter().copied()).collect()
    }
}

/// Padding added around the defining points to cover stroke and arrowhead
pub fn stroke_padding(annotation: &Annotation) -> f32 {
    let sw = annotation.stroke_width;
    match annotation.kind {
        AnnotationKind::Rectangle | AnnotationKind::Oval => {
            if annotation.filled { 0.0 } else { sw }
        }
        AnnotationKind::Line | AnnotationKind::Pen { .. } => sw,
        AnnotationKind::Arrow { .. } => (sw / 2.0).max(sw * 4.0),
        AnnotationKind::Text(_) => 0.0,
    }
}

/// Box spanning the points that define the shape, without any padding.
///
/// This is the frame resizing scales: start/end for shapes, start plus the
/// path for pens, start, tip and curve control point for arrows.
pub fn shape_rect(annotation: &Annotation) -> Rect {
    match annotation.kind {
        AnnotationKind::Pen { .. } => Rect::bounding(pen_vertices(annotation))
            .unwrap_or_else(|| Rect::from_corners(annotation.start, annotation.end)),
        AnnotationKind::Arrow { .. } => {
            let geom = arrow_geometry(annotation);
            Rect::bounding([geom.start, geom.head.tip, geom.control])
                .unwrap_or_else(|| Rect::from_corners(annotation.start, arrow_end(annotation)))
        }
        _ => Rect::from_corners(annotation.start, annotation.end),
    }
}

/// Measured text box of a text annotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    /// Box including background padding
    pub outer: Rect,
    /// Box the glyph lines are laid out in
    pub inner: Rect,
    pub line_height: f32,
}

pub fn text_box(content: &TextContent, anchor: Point, measure: &dyn TextMeasure) -> TextBox {
    let family = &content.font_family;
    let size = content.font_size;
    let lines: Vec<&str> = content.text.split('\n').collect();
    let line_height = measure.line_height(family, size);
    let width = lines
        .iter()
        .map(|line| measure.line_width(family, size, line))
        .fold(text::MIN_WIDTH, f32::max);
    let height = line_height * lines.len().max(1) as f32;

    let left = match content.alignment {
        TextAlignment::Left => anchor.x,
        TextAlignment::Center => anchor.x - width / 2.0,
        TextAlignment::Right => anchor.x - width,
    };
    let inner = Rect::from_xywh(left, anchor.y, width, height);
    let pad = content.effective_padding();
    let outer = Rect::new(
        inner.left - pad.left,
        inner.top - pad.top,
        inner.right + pad.right,
        inner.bottom + pad.bottom,
    );
    TextBox {
        outer,
        inner,
        line_height,
    }
}

/// Axis-aligned bounding rectangle in image space, before rotation
pub fn bounding_rect(annotation: &Annotation, measure: &dyn TextMeasure) -> Rect {
    match &annotation.kind {
        AnnotationKind::Text(content) => text_box(content, annotation.start, measure).outer,
        _ => shape_rect(annotation).expand(stroke_padding(annotation)),
    }
}
