//! Annotation types for drawing on screenshots
//!
//! All annotation coordinates are stored in image pixel space so they stay
//! valid when the display rectangle changes.

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::config::{ShapeColor, TextAlignment};

/// Stable identifier of an annotation, never reused within a store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Font family of a text annotation
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// Whatever default font the font book resolved at startup
    #[default]
    System,
    Named(String),
}

impl FontFamily {
    pub fn name(&self) -> &str {
        match self {
            FontFamily::System => "System",
            FontFamily::Named(name) => name,
        }
    }
}

/// Independent background padding for each edge of a text box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextPadding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl TextPadding {
    pub const ZERO: TextPadding = TextPadding::uniform(0.0);

    pub const fn uniform(amount: f32) -> Self {
        Self {
            top: amount,
            right: amount,
            bottom: amount,
            left: amount,
        }
    }
}

impl Default for TextPadding {
    fn default() -> Self {
        Self::uniform(4.0)
    }
}

/// Outline stroked around each glyph
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextOutline {
    pub color: ShapeColor,
    /// Stroke width in image pixels
    pub width: f32,
}

/// Content and style of a text callout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    #[serde(default)]
    pub font_family: FontFamily,
    pub font_size: f32,
    #[serde(default)]
    pub alignment: TextAlignment,
    /// Rounded background box; paddings only apply when this is set
    #[serde(default)]
    pub background: Option<ShapeColor>,
    #[serde(default)]
    pub padding: TextPadding,
    #[serde(default)]
    pub corner_radius: f32,
    #[serde(default)]
    pub outline: Option<TextOutline>,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: FontFamily::System,
            font_size: 16.0,
            alignment: TextAlignment::Left,
            background: None,
            padding: TextPadding::default(),
            corner_radius: 4.0,
            outline: None,
        }
    }
}

impl TextContent {
    /// Paddings that actually contribute to the box (zero without a background)
    pub fn effective_padding(&self) -> TextPadding {
        if self.background.is_some() {
            self.padding
        } else {
            TextPadding::ZERO
        }
    }
}

/// Kind tag of an annotation with the data specific to that kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationKind {
    Rectangle,
    Oval,
    Line,
    /// Freehand arrow; an empty path is a straight arrow from start to end
    Arrow { points: Vec<Point> },
    /// Freehand pen stroke; an empty path is a straight segment
    Pen { points: Vec<Point> },
    Text(TextContent),
}

/// Unified annotation record for ordered drawing and undo/redo
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    pub start: Point,
    pub end: Point,
    pub stroke_color: ShapeColor,
    pub stroke_width: f32,
    /// Radians about the bounding-box center
    #[serde(default)]
    pub rotation: f32,
    /// Only meaningful for rectangles and ovals
    #[serde(default)]
    pub filled: bool,
}

impl Annotation {
    pub fn new(id: AnnotationId, kind: AnnotationKind, start: Point, end: Point) -> Self {
        Self {
            id,
            kind,
            start,
            end,
            stroke_color: ShapeColor::default(),
            stroke_width: 2.0,
            rotation: 0.0,
            filled: false,
        }
    }

    pub fn with_stroke(mut self, color: ShapeColor, width: f32) -> Self {
        self.stroke_color = color;
        self.stroke_width = width.max(0.0);
        self
    }

    pub fn with_fill(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Short name of the kind, used in log output
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Oval => "oval",
            AnnotationKind::Line => "line",
            AnnotationKind::Arrow { .. } => "arrow",
            AnnotationKind::Pen { .. } => "pen",
            AnnotationKind::Text(_) => "text",
        }
    }

    /// Rectangle, oval or line
    pub fn is_shape(&self) -> bool {
        matches!(
            self.kind,
            AnnotationKind::Rectangle | AnnotationKind::Oval | AnnotationKind::Line
        )
    }

    /// Pen or arrow (annotations that carry a path)
    pub fn is_drawn_path(&self) -> bool {
        matches!(self.kind, AnnotationKind::Arrow { .. } | AnnotationKind::Pen { .. })
    }

    pub fn can_be_filled(&self) -> bool {
        matches!(self.kind, AnnotationKind::Rectangle | AnnotationKind::Oval)
    }

    /// Whether the shape is painted filled (ignores the flag for other kinds)
    pub fn is_filled(&self) -> bool {
        self.filled && self.can_be_filled()
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, AnnotationKind::Text(_))
    }

    /// Intermediate path points for pens and arrows
    pub fn points(&self) -> &[Point] {
        match &self.kind {
            AnnotationKind::Arrow { points } | AnnotationKind::Pen { points } => points,
            _ => &[],
        }
    }

    pub fn points_mut(&mut self) -> Option<&mut Vec<Point>> {
        match &mut self.kind {
            AnnotationKind::Arrow { points } | AnnotationKind::Pen { points } => Some(points),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextContent> {
        match &self.kind {
            AnnotationKind::Text(content) => Some(content),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextContent> {
        match &mut self.kind {
            AnnotationKind::Text(content) => Some(content),
            _ => None,
        }
    }

    /// Move start, end and every path point by the same delta
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.start = self.start.offset(dx, dy);
        self.end = self.end.offset(dx, dy);
        if let Some(points) = self.points_mut() {
            for p in points.iter_mut() {
                *p = p.offset(dx, dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicates() {
        let id = AnnotationId(1);
        let rect = Annotation::new(id, AnnotationKind::Rectangle, Point::default(), Point::default());
        assert!(rect.is_shape() && rect.can_be_filled() && !rect.is_drawn_path());

        let pen = Annotation::new(
            id,
            AnnotationKind::Pen { points: vec![] },
            Point::default(),
            Point::default(),
        );
        assert!(pen.is_drawn_path() && !pen.can_be_filled());

        let line = Annotation::new(id, AnnotationKind::Line, Point::default(), Point::default())
            .with_fill(true);
        assert!(!line.is_filled());
    }

    #[test]
    fn test_translate_moves_path_points() {
        let mut arrow = Annotation::new(
            AnnotationId(3),
            AnnotationKind::Arrow {
                points: vec![Point::new(5.0, 5.0), Point::new(10.0, 0.0)],
            },
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        arrow.translate(2.0, -1.0);
        assert_eq!(arrow.start, Point::new(2.0, -1.0));
        assert_eq!(arrow.end, Point::new(12.0, -1.0));
        assert_eq!(arrow.points(), &[Point::new(7.0, 4.0), Point::new(12.0, -1.0)]);
    }

    #[test]
    fn test_text_padding_ignored_without_background() {
        let mut content = TextContent {
            padding: TextPadding::uniform(8.0),
            ..Default::default()
        };
        assert_eq!(content.effective_padding(), TextPadding::ZERO);
        content.background = Some(ShapeColor::BLACK);
        assert_eq!(content.effective_padding(), TextPadding::uniform(8.0));
    }

    #[test]
    fn test_serde_roundtrip_keeps_kind_tag() {
        let ann = Annotation::new(
            AnnotationId(9),
            AnnotationKind::Text(TextContent {
                text: "hi".into(),
                ..Default::default()
            }),
            Point::new(1.0, 2.0),
            Point::new(1.0, 2.0),
        );
        let json = serde_json::to_string(&ann).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ann);
    }
}
