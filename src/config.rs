//! Configuration persistence for snapmark settings

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{Annotation, AnnotationKind, FontFamily, TextContent, TextOutline, TextPadding};
use crate::render::frame::{GradientBackground, PaddingOptions, RenderOptions, ShadowOptions};

/// Serializable color representation for config storage (components in 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::RED
    }
}

impl From<ShapeColor> for tiny_skia::Color {
    fn from(c: ShapeColor) -> Self {
        let [r, g, b, a] = c.to_rgba_u8();
        tiny_skia::Color::from_rgba8(r, g, b, a)
    }
}

impl ShapeColor {
    pub const RED: ShapeColor = ShapeColor::rgb(0.9, 0.1, 0.1);
    pub const BLACK: ShapeColor = ShapeColor::rgb(0.0, 0.0, 0.0);
    pub const WHITE: ShapeColor = ShapeColor::rgb(1.0, 1.0, 1.0);
    pub const PURPLE: ShapeColor = ShapeColor::rgb(0.69, 0.32, 0.87);
    pub const BLUE: ShapeColor = ShapeColor::rgb(0.0, 0.48, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }
}

/// Active editing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Select,
    #[default]
    Rectangle,
    Oval,
    Line,
    Arrow,
    Pen,
    Text,
}

impl Tool {
    /// Annotation kind a drag with this tool creates, if any
    pub fn drawing_kind(self) -> Option<AnnotationKind> {
        match self {
            Tool::Rectangle => Some(AnnotationKind::Rectangle),
            Tool::Oval => Some(AnnotationKind::Oval),
            Tool::Line => Some(AnnotationKind::Line),
            Tool::Arrow => Some(AnnotationKind::Arrow { points: Vec::new() }),
            Tool::Pen => Some(AnnotationKind::Pen { points: Vec::new() }),
            Tool::Select | Tool::Text => None,
        }
    }

    /// Tool that creates annotations of the given kind
    pub fn for_kind(kind: &AnnotationKind) -> Self {
        match kind {
            AnnotationKind::Rectangle => Tool::Rectangle,
            AnnotationKind::Oval => Tool::Oval,
            AnnotationKind::Line => Tool::Line,
            AnnotationKind::Arrow { .. } => Tool::Arrow,
            AnnotationKind::Pen { .. } => Tool::Pen,
            AnnotationKind::Text(_) => Tool::Text,
        }
    }

    /// Rectangle and oval drags snap to a square with shift held
    pub fn constrains_to_square(self) -> bool {
        matches!(self, Tool::Rectangle | Tool::Oval)
    }
}

/// Horizontal alignment of text relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Style copied onto newly created text annotations
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefaults {
    pub font_family: FontFamily,
    pub font_size: f32,
    pub alignment: TextAlignment,
    pub background: Option<ShapeColor>,
    pub padding: TextPadding,
    pub corner_radius: f32,
    pub outline: Option<TextOutline>,
}

impl Default for TextDefaults {
    fn default() -> Self {
        let content = TextContent::default();
        Self {
            font_family: content.font_family,
            font_size: content.font_size,
            alignment: content.alignment,
            background: content.background,
            padding: content.padding,
            corner_radius: content.corner_radius,
            outline: content.outline,
        }
    }
}

impl TextDefaults {
    /// Text content carrying these defaults
    pub fn content(&self, text: impl Into<String>) -> TextContent {
        TextContent {
            text: text.into(),
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            alignment: self.alignment,
            background: self.background,
            padding: self.padding,
            corner_radius: self.corner_radius,
            outline: self.outline,
        }
    }
}

/// Current tool and the style applied to new annotations
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub tool: Tool,
    pub stroke_color: ShapeColor,
    pub stroke_width: f32,
    pub fill: bool,
    pub text: TextDefaults,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            stroke_color: ShapeColor::default(),
            stroke_width: 2.0,
            fill: false,
            text: TextDefaults::default(),
        }
    }
}

impl ToolSettings {
    /// Take over the tool and style of an annotation the user just selected
    pub fn adopt_style(&mut self, annotation: &Annotation) {
        self.tool = Tool::for_kind(&annotation.kind);
        self.stroke_color = annotation.stroke_color;
        self.stroke_width = annotation.stroke_width;
        self.fill = annotation.filled;
        if let Some(content) = annotation.text() {
            self.text = TextDefaults {
                font_family: content.font_family.clone(),
                font_size: content.font_size,
                alignment: content.alignment,
                background: content.background,
                padding: content.padding,
                corner_radius: content.corner_radius,
                outline: content.outline,
            };
        }
    }
}

/// Application settings persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tool: Tool,
    pub stroke_color: ShapeColor,
    pub stroke_width: f32,
    pub fill_shapes: bool,
    pub text_font_name: String,
    pub text_font_size: f32,
    pub text_alignment: TextAlignment,
    /// Background color for new text; `None` disables the box
    pub text_background: Option<ShapeColor>,
    pub text_padding_top: f32,
    pub text_padding_right: f32,
    pub text_padding_bottom: f32,
    pub text_padding_left: f32,
    pub text_corner_radius: f32,
    pub text_outline: Option<TextOutline>,
    pub padding_enabled: bool,
    pub padding_amount: f32,
    pub padding_corner_radius: f32,
    pub gradient_start: ShapeColor,
    pub gradient_end: ShapeColor,
    /// Degrees
    pub gradient_angle: f32,
    pub shadow_enabled: bool,
    pub shadow_radius: f32,
    pub shadow_opacity: f32,
    pub shadow_offset_y: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self::capture(&ToolSettings::default(), &RenderOptions::default())
    }
}

impl Settings {
    /// Flatten tool settings and render options into a persisted record
    pub fn capture(tools: &ToolSettings, render: &RenderOptions) -> Self {
        let padding = &render.padding;
        Self {
            tool: tools.tool,
            stroke_color: tools.stroke_color,
            stroke_width: tools.stroke_width,
            fill_shapes: tools.fill,
            text_font_name: tools.text.font_family.name().to_string(),
            text_font_size: tools.text.font_size,
            text_alignment: tools.text.alignment,
            text_background: tools.text.background,
            text_padding_top: tools.text.padding.top,
            text_padding_right: tools.text.padding.right,
            text_padding_bottom: tools.text.padding.bottom,
            text_padding_left: tools.text.padding.left,
            text_corner_radius: tools.text.corner_radius,
            text_outline: tools.text.outline,
            padding_enabled: padding.enabled,
            padding_amount: padding.amount,
            padding_corner_radius: padding.corner_radius,
            gradient_start: padding.gradient.start,
            gradient_end: padding.gradient.end,
            gradient_angle: padding.gradient.angle_degrees,
            shadow_enabled: padding.shadow.enabled,
            shadow_radius: padding.shadow.radius,
            shadow_opacity: padding.shadow.opacity,
            shadow_offset_y: padding.shadow.offset_y,
        }
    }

    pub fn tool_settings(&self) -> ToolSettings {
        let font_family = if self.text_font_name.is_empty()
            || self.text_font_name == FontFamily::System.name()
        {
            FontFamily::System
        } else {
            FontFamily::Named(self.text_font_name.clone())
        };
        ToolSettings {
            tool: self.tool,
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width.max(0.0),
            fill: self.fill_shapes,
            text: TextDefaults {
                font_family,
                font_size: self.text_font_size,
                alignment: self.text_alignment,
                background: self.text_background,
                padding: TextPadding {
                    top: self.text_padding_top,
                    right: self.text_padding_right,
                    bottom: self.text_padding_bottom,
                    left: self.text_padding_left,
                },
                corner_radius: self.text_corner_radius,
                outline: self.text_outline,
            },
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            padding: PaddingOptions {
                enabled: self.padding_enabled,
                amount: self.padding_amount.max(0.0),
                corner_radius: self.padding_corner_radius.max(0.0),
                gradient: GradientBackground {
                    start: self.gradient_start,
                    end: self.gradient_end,
                    angle_degrees: self.gradient_angle,
                },
                shadow: ShadowOptions {
                    enabled: self.shadow_enabled,
                    radius: self.shadow_radius.max(0.0),
                    opacity: self.shadow_opacity.clamp(0.0, 1.0),
                    offset_y: self.shadow_offset_y,
                },
            },
        }
    }

    /// Load settings from a store, or return defaults if unavailable
    pub fn load_from(store: &dyn SettingsStore) -> Self {
        match store.load() {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Error loading settings, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save settings to a store, logging failures
    pub fn save_to(&self, store: &dyn SettingsStore) {
        if let Err(err) = store.save(self) {
            log::error!("Failed to save settings: {:?}", err);
        }
    }
}

/// Storage medium for persisted settings
pub trait SettingsStore {
    fn load(&self) -> anyhow::Result<Settings>;
    fn save(&self, settings: &Settings) -> anyhow::Result<()>;
}

/// Settings stored as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    pub const APP_DIR: &'static str = "snapmark";
    pub const FILE_NAME: &'static str = "settings.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/snapmark/settings.json`, if the platform has a config dir
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join(Self::APP_DIR).join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsFile {
    fn load(&self) -> anyhow::Result<Settings> {
        if !self.path.exists() {
            log::debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }
        let data = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(settings).context("failed to serialize settings")?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnotationId, Point};

    #[test]
    fn test_rgba_u8_includes_alpha() {
        assert_eq!(ShapeColor::WHITE.to_rgba_u8(), [255, 255, 255, 255]);
        assert_eq!(ShapeColor::BLACK.with_alpha(0.5).to_rgba_u8(), [0, 0, 0, 128]);
    }

    #[test]
    fn test_color_without_alpha_deserializes_opaque() {
        let c: ShapeColor = serde_json::from_str(r#"{"r":0.0,"g":1.0,"b":0.0}"#).unwrap();
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_settings_projection_roundtrip() {
        let mut tools = ToolSettings::default();
        tools.tool = Tool::Arrow;
        tools.stroke_width = 5.0;
        tools.text.font_family = FontFamily::Named("DejaVu Sans".into());
        tools.text.background = Some(ShapeColor::WHITE);
        let mut render = RenderOptions::default();
        render.padding.enabled = true;
        render.padding.amount = 24.0;

        let settings = Settings::capture(&tools, &render);
        assert_eq!(settings.tool_settings(), tools);
        assert_eq!(settings.render_options(), render);
    }

    #[test]
    fn test_system_font_name_maps_back_to_sentinel() {
        let settings = Settings::default();
        assert_eq!(settings.text_font_name, "System");
        assert_eq!(settings.tool_settings().text.font_family, FontFamily::System);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsFile::new(dir.path().join("nested").join("settings.json"));

        // Missing file yields defaults
        assert_eq!(store.load().unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.stroke_width = 7.5;
        settings.shadow_enabled = false;
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonSettingsFile::new(&path);
        assert!(store.load().is_err());
        assert_eq!(Settings::load_from(&store), Settings::default());
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"stroke_width": 9.0, "tool": "pen"}"#).unwrap();
        let loaded = JsonSettingsFile::new(&path).load().unwrap();
        assert_eq!(loaded.stroke_width, 9.0);
        assert_eq!(loaded.tool, Tool::Pen);
        assert_eq!(loaded.padding_amount, Settings::default().padding_amount);
    }

    #[test]
    fn test_adopt_style_from_text() {
        let ann = Annotation::new(
            AnnotationId(1),
            AnnotationKind::Text(TextContent {
                text: "note".into(),
                font_size: 30.0,
                alignment: TextAlignment::Right,
                ..Default::default()
            }),
            Point::default(),
            Point::default(),
        )
        .with_stroke(ShapeColor::BLUE, 3.0);

        let mut tools = ToolSettings::default();
        tools.adopt_style(&ann);
        assert_eq!(tools.tool, Tool::Text);
        assert_eq!(tools.stroke_color, ShapeColor::BLUE);
        assert_eq!(tools.stroke_width, 3.0);
        assert_eq!(tools.text.font_size, 30.0);
        assert_eq!(tools.text.alignment, TextAlignment::Right);
    }
}
