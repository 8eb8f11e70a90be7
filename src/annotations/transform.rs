//! Move, resize and rotate math
//!
//! Every function here takes the annotation as it was when the gesture began
//! and returns the transformed copy, so a gesture never accumulates rounding
//! error across pointer samples.

use crate::domain::{Annotation, AnnotationKind, Handle, Point, Rect, TextPadding, rotate_point};
use crate::render::TextMeasure;
use crate::render::geometry::{bounding_rect, shape_rect, stroke_padding, text};

/// Aspect ratios this close to 1 are treated as square when constraining
pub const SQUARE_SNAP: f32 = 0.02;
/// Rotation below this many radians counts as no rotation at all
pub const ROTATION_THRESHOLD: f32 = 0.01;

pub fn translated(original: &Annotation, dx: f32, dy: f32) -> Annotation {
    let mut moved = original.clone();
    moved.translate(dx, dy);
    moved
}

/// End point of a drag from `start` constrained to a square
pub fn square_end(start: Point, end: Point) -> Point {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let size = dx.abs().max(dy.abs());
    Point::new(start.x + size * dx.signum(), start.y + size * dy.signum())
}

/// Corner that stays put while `handle` is dragged
fn anchor_corner(rect: &Rect, handle: Handle) -> Point {
    Point::new(
        if handle.is_left() { rect.right } else { rect.left },
        if handle.is_top() { rect.bottom } else { rect.top },
    )
}

/// Resize against the pre-gesture annotation.
///
/// `pointer` is in image space. Returns `None` for annotations that cannot be
/// resized (text without a background).
pub fn resized(
    original: &Annotation,
    handle: Handle,
    pointer: Point,
    keep_aspect: bool,
    measure: &dyn TextMeasure,
) -> Option<Annotation> {
    if original.is_text() {
        return resized_text_padding(original, handle, pointer, measure);
    }

    // Work along the shape's own axes
    let center = bounding_rect(original, measure).center();
    let pointer = rotate_point(pointer, center, -original.rotation);

    let pad = stroke_padding(original);
    let old = shape_rect(original);
    let target = Point::new(
        pointer.x + if handle.is_left() { pad } else { -pad },
        pointer.y + if handle.is_top() { pad } else { -pad },
    );
    let anchor = anchor_corner(&old, handle);
    let mut w = target.x - anchor.x;
    let mut h = target.y - anchor.y;

    if keep_aspect && old.width() > 0.0 && old.height() > 0.0 {
        let mut aspect = old.width() / old.height();
        if (aspect - 1.0).abs() < SQUARE_SNAP {
            aspect = 1.0;
        }
        let size = w.abs().max(h.abs());
        w = size * w.signum();
        h = size / aspect * h.signum();
    }

    let new = Rect::from_corners(anchor, Point::new(anchor.x + w, anchor.y + h));
    let mut out = original.clone();
    match &original.kind {
        AnnotationKind::Rectangle | AnnotationKind::Oval => {
            out.start = new.origin();
            out.end = Point::new(new.right, new.bottom);
        }
        AnnotationKind::Line => keep_direction(&mut out, &new),
        AnnotationKind::Arrow { points } if points.is_empty() => keep_direction(&mut out, &new),
        AnnotationKind::Arrow { .. } | AnnotationKind::Pen { .. } => scale_into(&mut out, &old, &new),
        AnnotationKind::Text(_) => {}
    }
    Some(out)
}

/// Place start/end on the new rect's edges, on the same sides as before
fn keep_direction(annotation: &mut Annotation, new: &Rect) {
    let start_at_min_x = annotation.start.x <= annotation.end.x;
    let start_at_min_y = annotation.start.y <= annotation.end.y;
    let (sx, ex) = if start_at_min_x { (new.left, new.right) } else { (new.right, new.left) };
    let (sy, ey) = if start_at_min_y { (new.top, new.bottom) } else { (new.bottom, new.top) };
    annotation.start = Point::new(sx, sy);
    annotation.end = Point::new(ex, ey);
}

/// Map every defining point from `old` into `new` proportionally
fn scale_into(annotation: &mut Annotation, old: &Rect, new: &Rect) {
    let sx = if old.width() > 0.0 { new.width() / old.width() } else { 1.0 };
    let sy = if old.height() > 0.0 { new.height() / old.height() } else { 1.0 };
    let map = |p: Point| Point::new(new.left + (p.x - old.left) * sx, new.top + (p.y - old.top) * sy);

    annotation.start = map(annotation.start);
    annotation.end = map(annotation.end);
    if let Some(points) = annotation.points_mut() {
        for p in points.iter_mut() {
            *p = map(*p);
        }
    }
}

/// Resizing a text callout grows its background padding instead of the text
fn resized_text_padding(
    original: &Annotation,
    handle: Handle,
    pointer: Point,
    measure: &dyn TextMeasure,
) -> Option<Annotation> {
    let content = original.text()?;
    content.background?;

    let outer = bounding_rect(original, measure);
    let clamp = |v: f32| v.clamp(0.0, text::MAX_BACKGROUND_PADDING);
    let mut padding: TextPadding = content.padding;
    if handle.is_left() {
        padding.left = clamp(padding.left + outer.left - pointer.x);
    } else {
        padding.right = clamp(padding.right + pointer.x - outer.right);
    }
    if handle.is_top() {
        padding.top = clamp(padding.top + outer.top - pointer.y);
    } else {
        padding.bottom = clamp(padding.bottom + pointer.y - outer.bottom);
    }

    let mut out = original.clone();
    if let Some(content) = out.text_mut() {
        content.padding = padding;
    }
    Some(out)
}

/// Signed angle swept by the pointer around `center` since the gesture began
pub fn rotation_delta(center: Point, from: Point, to: Point) -> f32 {
    let a0 = (from.y - center.y).atan2(from.x - center.x);
    let a1 = (to.y - center.y).atan2(to.x - center.x);
    a1 - a0
}

pub fn rotated(original: &Annotation, delta: f32) -> Annotation {
    let mut out = original.clone();
    out.rotation = original.rotation + delta;
    out
}
