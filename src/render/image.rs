//! Image rendering for annotations using tiny-skia
//!
//! Annotations are stored in a top-left, Y-down image space. The rasterizer
//! places each one in a bottom-left-origin drawing space first (offset by
//! the frame inset, Y flipped against the canvas height), applies the
//! annotation's rotation there, and finally maps that space onto pixmap rows
//! with a single surface transform. Export and live preview share this path.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use super::frame::{RenderOptions, compose_canvas};
use super::geometry::{self, shape};
use super::text::{FontBook, TextMeasure, glyph_path};
use crate::config::ShapeColor;
use crate::domain::{Annotation, AnnotationKind, Point, Rect, TextContent};
use crate::export::ExportError;

/// Copy an RgbaImage into a new (premultiplied) pixmap
pub(crate) fn pixmap_from_image(img: &RgbaImage) -> Result<Pixmap, ExportError> {
    let (w, h) = (img.width(), img.height());
    let mut pixmap = Pixmap::new(w, h)
        .ok_or_else(|| ExportError::RenderFailed(format!("invalid image size {}x{}", w, h)))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Copy a pixmap back out to a straight-alpha RgbaImage
pub(crate) fn image_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<tiny_skia::Path> {
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

fn build_rect_path(rect: Rect) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(rect.left, rect.top);
    pb.line_to(rect.right, rect.top);
    pb.line_to(rect.right, rect.bottom);
    pb.line_to(rect.left, rect.bottom);
    pb.close();
    pb.finish()
}

/// Rectangle with circular corners; radius is clamped to half the shorter side
pub(crate) fn rounded_rect_path(rect: Rect, radius: f32) -> Option<tiny_skia::Path> {
    let r = radius.min(rect.width() * 0.5).min(rect.height() * 0.5).max(0.0);
    if r <= 0.0 {
        return build_rect_path(rect);
    }
    let k = r * shape::BEZIER_K;
    let Rect {
        left,
        top,
        right,
        bottom,
    } = rect;

    let mut pb = PathBuilder::new();
    pb.move_to(left + r, top);
    pb.line_to(right - r, top);
    pb.cubic_to(right - r + k, top, right, top + r - k, right, top + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(left + r, bottom);
    pb.cubic_to(left + r - k, bottom, left, bottom - r + k, left, bottom - r);
    pb.line_to(left, top + r);
    pb.cubic_to(left, top + r - k, left + r - k, top, left + r, top);
    pb.close();
    pb.finish()
}

fn build_polyline_path(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

fn paint_for(color: ShapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke_for(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Full transform from image space to pixmap rows for one annotation
fn annotation_transform(
    annotation: &Annotation,
    canvas_height: f32,
    inset: f32,
    measure: &dyn TextMeasure,
) -> Transform {
    // Image space -> bottom-left drawing space
    let flip = Transform::from_row(1.0, 0.0, 0.0, -1.0, inset, canvas_height - inset);
    // Bottom-left drawing space -> pixmap rows
    let surface = Transform::from_row(1.0, 0.0, 0.0, -1.0, 0.0, canvas_height);
    if annotation.rotation == 0.0 {
        return surface.pre_concat(flip);
    }

    let center = geometry::bounding_rect(annotation, measure).center();
    let (cx, cy) = (center.x + inset, canvas_height - (center.y + inset));
    // Flipped Y turns the rotation direction around
    let rotate = Transform::from_rotate_at(-annotation.rotation.to_degrees(), cx, cy);
    surface.pre_concat(rotate).pre_concat(flip)
}

fn draw_arrow(pixmap: &mut Pixmap, annotation: &Annotation, paint: &Paint, ts: Transform) {
    let geom = geometry::arrow_geometry(annotation);
    let base = geom.head.base();

    let mut shaft = PathBuilder::new();
    shaft.move_to(geom.start.x, geom.start.y);
    shaft.quad_to(geom.control.x, geom.control.y, base.x, base.y);
    if let Some(path) = shaft.finish() {
        pixmap.stroke_path(&path, paint, &stroke_for(annotation.stroke_width), ts, None);
    }

    let mut head = PathBuilder::new();
    head.move_to(geom.head.tip.x, geom.head.tip.y);
    head.line_to(geom.head.left.x, geom.head.left.y);
    head.line_to(geom.head.right.x, geom.head.right.y);
    head.close();
    if let Some(path) = head.finish() {
        pixmap.fill_path(&path, paint, FillRule::Winding, ts, None);
    }
}

fn draw_text(
    pixmap: &mut Pixmap,
    annotation: &Annotation,
    content: &TextContent,
    fonts: &FontBook,
    ts: Transform,
) {
    let layout = geometry::text_box(content, annotation.start, fonts);

    if let Some(background) = content.background
        && let Some(path) = rounded_rect_path(layout.outer, content.corner_radius)
    {
        pixmap.fill_path(&path, &paint_for(background), FillRule::Winding, ts, None);
    }

    let Some(font) = fonts.resolve(&content.font_family) else {
        log::warn!("No font available, skipping glyphs of text annotation {}", annotation.id);
        return;
    };
    let Some(glyphs) = glyph_path(font, content, &layout) else {
        return;
    };
    if let Some(outline) = content.outline
        && outline.width > 0.0
    {
        pixmap.stroke_path(&glyphs, &paint_for(outline.color), &stroke_for(outline.width), ts, None);
    }
    pixmap.fill_path(&glyphs, &paint_for(annotation.stroke_color), FillRule::Winding, ts, None);
}

/// Draw one annotation onto the canvas
fn draw_annotation(pixmap: &mut Pixmap, annotation: &Annotation, inset: f32, fonts: &FontBook) {
    let ts = annotation_transform(annotation, pixmap.height() as f32, inset, fonts);
    let paint = paint_for(annotation.stroke_color);
    let stroke = stroke_for(annotation.stroke_width);

    let path = match &annotation.kind {
        AnnotationKind::Rectangle => build_rect_path(geometry::shape_rect(annotation)),
        AnnotationKind::Oval => {
            let (cx, cy, rx, ry) = geometry::ellipse_from_bounds(&geometry::shape_rect(annotation));
            build_ellipse_path(cx, cy, rx, ry)
        }
        AnnotationKind::Line => build_polyline_path(&[annotation.start, annotation.end]),
        AnnotationKind::Pen { .. } => build_polyline_path(&geometry::pen_vertices(annotation)),
        AnnotationKind::Arrow { .. } => {
            draw_arrow(pixmap, annotation, &paint, ts);
            return;
        }
        AnnotationKind::Text(content) => {
            draw_text(pixmap, annotation, content, fonts, ts);
            return;
        }
    };
    let Some(path) = path else {
        return;
    };

    if annotation.is_filled() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, ts, None);
    } else {
        pixmap.stroke_path(&path, &paint, &stroke, ts, None);
    }
}

/// Draw all annotations in order; later annotations paint over earlier ones
pub(crate) fn draw_annotations_in_order<'a>(
    pixmap: &mut Pixmap,
    annotations: impl IntoIterator<Item = &'a Annotation>,
    inset: f32,
    fonts: &FontBook,
) {
    for annotation in annotations {
        draw_annotation(pixmap, annotation, inset, fonts);
    }
}

/// Flatten the base image and annotations into a new image
pub fn render(
    base: &RgbaImage,
    annotations: &[Annotation],
    options: &RenderOptions,
    fonts: &FontBook,
) -> Result<RgbaImage, ExportError> {
    render_preview(base, annotations, None, options, fonts)
}

/// Like [`render`], additionally painting the annotation still being drawn
pub fn render_preview(
    base: &RgbaImage,
    annotations: &[Annotation],
    current: Option<&Annotation>,
    options: &RenderOptions,
    fonts: &FontBook,
) -> Result<RgbaImage, ExportError> {
    let mut canvas = compose_canvas(base, &options.padding)?;
    draw_annotations_in_order(
        &mut canvas.pixmap,
        annotations.iter().chain(current),
        canvas.inset,
        fonts,
    );
    log::debug!(
        "Rendered {} annotations onto {}x{} canvas",
        annotations.len() + usize::from(current.is_some()),
        canvas.pixmap.width(),
        canvas.pixmap.height()
    );
    Ok(image_from_pixmap(&canvas.pixmap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnnotationId;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba(WHITE))
    }

    fn ann(kind: AnnotationKind, start: Point, end: Point) -> Annotation {
        Annotation::new(AnnotationId(1), kind, start, end).with_stroke(ShapeColor::BLACK, 2.0)
    }

    fn is_dark(img: &RgbaImage, x: u32, y: u32) -> bool {
        img.get_pixel(x, y).0[0] < 128
    }

    fn topmost_non_white_row(img: &RgbaImage) -> Option<u32> {
        (0..img.height()).find(|&y| (0..img.width()).any(|x| img.get_pixel(x, y).0 != WHITE))
    }

    #[test]
    fn test_filled_rect_lands_at_display_rows() {
        let rect = ann(AnnotationKind::Rectangle, Point::new(10.0, 5.0), Point::new(90.0, 15.0))
            .with_fill(true);
        let out = render(&white(100, 100), &[rect], &RenderOptions::default(), &FontBook::empty())
            .unwrap();
        let top = topmost_non_white_row(&out).unwrap();
        assert!((4..=6).contains(&top), "topmost painted row was {}", top);
        assert!(is_dark(&out, 50, 10));
        assert!(!is_dark(&out, 50, 90));
    }

    #[test]
    fn test_rotation_turns_line_vertical() {
        let line = ann(AnnotationKind::Line, Point::new(20.0, 50.0), Point::new(80.0, 50.0))
            .with_rotation(std::f32::consts::FRAC_PI_2);
        let out = render(&white(100, 100), &[line], &RenderOptions::default(), &FontBook::empty())
            .unwrap();
        assert!(is_dark(&out, 50, 25));
        assert!(is_dark(&out, 50, 75));
        assert!(!is_dark(&out, 25, 50));
    }

    #[test]
    fn test_arrow_head_filled_at_tip() {
        let arrow = ann(
            AnnotationKind::Arrow { points: vec![] },
            Point::new(10.0, 50.0),
            Point::new(90.0, 50.0),
        );
        let out = render(&white(100, 100), &[arrow], &RenderOptions::default(), &FontBook::empty())
            .unwrap();
        assert!(is_dark(&out, 87, 50));
        // Head is wider than the shaft
        assert!(is_dark(&out, 84, 52));
        assert!(!is_dark(&out, 50, 56));
    }

    #[test]
    fn test_text_background_without_fonts() {
        let text = ann(
            AnnotationKind::Text(TextContent {
                text: "hello".into(),
                font_size: 20.0,
                background: Some(ShapeColor::BLACK),
                corner_radius: 0.0,
                ..Default::default()
            }),
            Point::new(10.0, 10.0),
            Point::new(10.0, 10.0),
        );
        let out = render(&white(100, 100), &[text], &RenderOptions::default(), &FontBook::empty())
            .unwrap();
        // 5 chars * 12 = 60 wide, 24 high, plus 4px padding
        assert!(is_dark(&out, 40, 20));
        assert!(!is_dark(&out, 40, 60));
    }

    #[test]
    fn test_padding_offsets_annotations() {
        let rect = ann(AnnotationKind::Rectangle, Point::new(0.0, 0.0), Point::new(10.0, 10.0))
            .with_fill(true);
        let mut options = RenderOptions::default();
        options.padding.enabled = true;
        options.padding.amount = 20.0;
        options.padding.corner_radius = 0.0;
        options.padding.shadow.enabled = false;
        let out = render(&white(50, 50), &[rect], &options, &FontBook::empty()).unwrap();
        assert_eq!((out.width(), out.height()), (90, 90));
        assert!(is_dark(&out, 25, 25));
        assert_eq!(out.get_pixel(45, 45).0, WHITE);
    }

    #[test]
    fn test_preview_paints_current_annotation() {
        let current = ann(AnnotationKind::Rectangle, Point::new(40.0, 40.0), Point::new(60.0, 60.0))
            .with_fill(true);
        let base = white(100, 100);
        let options = RenderOptions::default();
        let fonts = FontBook::empty();
        let without = render(&base, &[], &options, &fonts).unwrap();
        let with = render_preview(&base, &[], Some(&current), &options, &fonts).unwrap();
        assert!(!is_dark(&without, 50, 50));
        assert!(is_dark(&with, 50, 50));
    }

    #[test]
    fn test_empty_image_is_render_error() {
        let result = render(&RgbaImage::new(0, 0), &[], &RenderOptions::default(), &FontBook::empty());
        assert!(matches!(result, Err(ExportError::RenderFailed(_))));
    }

    #[test]
    fn test_pixmap_conversion_keeps_opaque_pixels() {
        let mut img = white(4, 4);
        img.put_pixel(1, 2, image::Rgba([12, 34, 56, 255]));
        let back = image_from_pixmap(&pixmap_from_image(&img).unwrap());
        assert_eq!(back, img);
    }
}
