//! Fonts, text measurement and glyph outlines
//!
//! Text is drawn as filled glyph outlines built with ab_glyph so the export
//! does not depend on any platform text stack. When no font file can be
//! found, measurement falls back to fixed metrics and glyphs are skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, OutlineCurve, ScaleFont};
use tiny_skia::PathBuilder;

use super::geometry::TextBox;
use crate::config::TextAlignment;
use crate::domain::{FontFamily, TextContent};

/// Advance per character when no font is loaded, as a fraction of font size
const FALLBACK_ADVANCE: f32 = 0.6;
const FALLBACK_LINE_HEIGHT: f32 = 1.2;
const FALLBACK_ASCENT: f32 = 0.95;

/// How deep to walk font directories
const MAX_SCAN_DEPTH: usize = 4;

/// Files tried, in order, for the default font
const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/System/Library/Fonts",
    "/Library/Fonts",
    "C:\\Windows\\Fonts",
];

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

/// Text metrics needed for layout
pub trait TextMeasure {
    /// Advance width of a single line of text
    fn line_width(&self, family: &FontFamily, size: f32, line: &str) -> f32;
    /// Distance between consecutive baselines
    fn line_height(&self, family: &FontFamily, size: f32) -> f32;
    /// Distance from the top of a line to its baseline
    fn ascent(&self, family: &FontFamily, size: f32) -> f32;
}

/// Fixed metrics used when no font is available
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMetrics;

impl TextMeasure for FallbackMetrics {
    fn line_width(&self, _family: &FontFamily, size: f32, line: &str) -> f32 {
        line.chars().count() as f32 * FALLBACK_ADVANCE * size
    }

    fn line_height(&self, _family: &FontFamily, size: f32) -> f32 {
        FALLBACK_LINE_HEIGHT * size
    }

    fn ascent(&self, _family: &FontFamily, size: f32) -> f32 {
        FALLBACK_ASCENT * size
    }
}

/// Normalized lookup key: "DejaVu Sans", "dejavu-sans" and "DejaVuSans" collide
fn family_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
}

/// Fonts available for text annotations
#[derive(Clone, Default)]
pub struct FontBook {
    default: Option<FontArc>,
    loaded: HashMap<String, FontArc>,
    /// Font files found on disk but not parsed yet, by family key
    index: HashMap<String, PathBuf>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("has_default", &self.default.is_some())
            .field("loaded", &self.loaded.keys().collect::<Vec<_>>())
            .field("indexed", &self.index.len())
            .finish()
    }
}

impl FontBook {
    /// Font book without any fonts; all measurement uses fallback metrics
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index fonts from the user and system font directories and load a default
    pub fn discover() -> Self {
        let mut book = Self::empty();
        let mut font_dirs: Vec<PathBuf> = dirs::font_dir().into_iter().collect();
        font_dirs.extend(SYSTEM_FONT_DIRS.iter().map(PathBuf::from));
        for dir in &font_dirs {
            book.scan_dir(dir, 0);
        }

        for candidate in DEFAULT_FONT_CANDIDATES {
            match load_font_file(Path::new(candidate)) {
                Ok(font) => {
                    log::debug!("Using default font {}", candidate);
                    book.default = Some(font);
                    break;
                }
                Err(FontError::Read { .. }) => {}
                Err(err) => log::warn!("{}", err),
            }
        }
        if book.default.is_none() {
            // Any indexed font beats fallback metrics
            let first = book
                .index
                .iter()
                .min_by(|a, b| a.0.cmp(b.0))
                .map(|(_, path)| path.clone());
            if let Some(path) = first {
                match load_font_file(&path) {
                    Ok(font) => book.default = Some(font),
                    Err(err) => log::warn!("{}", err),
                }
            }
        }
        if book.default.is_none() {
            log::warn!("No usable font found, text will be measured with fallback metrics and not drawn");
        }
        log::debug!("Indexed {} font files", book.index.len());
        book
    }

    fn scan_dir(&mut self, dir: &Path, depth: usize) {
        if depth > MAX_SCAN_DEPTH {
            return;
        }
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.scan_dir(&path, depth + 1);
            } else if is_font_file(&path) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    let key = family_key(stem);
                    // "Foo-Regular" also answers to "Foo"
                    if let Some(base) = stem.strip_suffix("-Regular") {
                        self.index.entry(family_key(base)).or_insert_with(|| path.clone());
                    }
                    self.index.entry(key).or_insert(path);
                }
            }
        }
    }

    /// Register a font under a family name
    pub fn insert(&mut self, name: &str, font: FontArc) {
        self.loaded.insert(family_key(name), font);
    }

    /// Load a font file and register it under a family name
    pub fn load_file(&mut self, name: &str, path: &Path) -> Result<(), FontError> {
        let font = load_font_file(path)?;
        self.insert(name, font);
        Ok(())
    }

    /// Parse an indexed font for `family` if it is not loaded yet.
    ///
    /// Returns false when the family is unknown; rendering then uses the default font.
    pub fn ensure_loaded(&mut self, family: &FontFamily) -> bool {
        let FontFamily::Named(name) = family else {
            return self.default.is_some();
        };
        let key = family_key(name);
        if self.loaded.contains_key(&key) {
            return true;
        }
        let Some(path) = self.index.get(&key).cloned() else {
            log::debug!("Font family {:?} not found, falling back to default", name);
            return false;
        };
        match load_font_file(&path) {
            Ok(font) => {
                self.loaded.insert(key, font);
                true
            }
            Err(err) => {
                log::warn!("{}", err);
                self.index.remove(&key);
                false
            }
        }
    }

    /// Font used for `family`: the named font if loaded, else the default
    pub fn resolve(&self, family: &FontFamily) -> Option<&FontArc> {
        match family {
            FontFamily::Named(name) => self
                .loaded
                .get(&family_key(name))
                .or(self.default.as_ref()),
            FontFamily::System => self.default.as_ref(),
        }
    }
}

fn load_font_file(path: &Path) -> Result<FontArc, FontError> {
    let data = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(data).map_err(|source| FontError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn scaled_line_width(font: &FontArc, size: f32, line: &str) -> f32 {
    let scaled = font.as_scaled(size);
    let mut width = 0.0;
    let mut prev = None;
    for ch in line.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev_id) = prev {
            width += scaled.kern(prev_id, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

impl TextMeasure for FontBook {
    fn line_width(&self, family: &FontFamily, size: f32, line: &str) -> f32 {
        match self.resolve(family) {
            Some(font) => scaled_line_width(font, size, line),
            None => FallbackMetrics.line_width(family, size, line),
        }
    }

    fn line_height(&self, family: &FontFamily, size: f32) -> f32 {
        match self.resolve(family) {
            Some(font) => {
                let scaled = font.as_scaled(size);
                scaled.height() + scaled.line_gap()
            }
            None => FallbackMetrics.line_height(family, size),
        }
    }

    fn ascent(&self, family: &FontFamily, size: f32) -> f32 {
        match self.resolve(family) {
            Some(font) => font.as_scaled(size).ascent(),
            None => FallbackMetrics.ascent(family, size),
        }
    }
}

/// Glyph outlines of every line of `content`, laid out inside `layout.inner`.
///
/// Coordinates are in image space (Y down). Returns `None` when the text has
/// no visible glyphs.
pub fn glyph_path(font: &FontArc, content: &TextContent, layout: &TextBox) -> Option<tiny_skia::Path> {
    let size = content.font_size;
    let scaled = font.as_scaled(size);
    let (hs, vs) = (scaled.h_scale_factor(), scaled.v_scale_factor());
    let inner = layout.inner;

    let mut pb = PathBuilder::new();
    for (row, line) in content.text.split('\n').enumerate() {
        let line_width = scaled_line_width(font, size, line);
        let mut pen_x = match content.alignment {
            TextAlignment::Left => inner.left,
            TextAlignment::Center => inner.left + (inner.width() - line_width) / 2.0,
            TextAlignment::Right => inner.right - line_width,
        };
        let baseline = inner.top + row as f32 * layout.line_height + scaled.ascent();

        let mut prev = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev_id) = prev {
                pen_x += scaled.kern(prev_id, id);
            }
            if let Some(outline) = font.outline(id) {
                // Font units are Y up; flip around the baseline
                let map = |p: ab_glyph::Point| (pen_x + p.x * hs, baseline - p.y * vs);
                append_outline(&mut pb, &outline.curves, map);
            }
            pen_x += scaled.h_advance(id);
            prev = Some(id);
        }
    }
    pb.finish()
}

fn append_outline<F>(pb: &mut PathBuilder, curves: &[OutlineCurve], map: F)
where
    F: Fn(ab_glyph::Point) -> (f32, f32),
{
    let mut last: Option<ab_glyph::Point> = None;
    for curve in curves {
        let (from, to) = match curve {
            OutlineCurve::Line(a, b) => (*a, *b),
            OutlineCurve::Quad(a, _, c) => (*a, *c),
            OutlineCurve::Cubic(a, _, _, d) => (*a, *d),
        };
        if last != Some(from) {
            if last.is_some() {
                pb.close();
            }
            let (x, y) = map(from);
            pb.move_to(x, y);
        }
        match curve {
            OutlineCurve::Line(_, b) => {
                let (x, y) = map(*b);
                pb.line_to(x, y);
            }
            OutlineCurve::Quad(_, b, c) => {
                let (x1, y1) = map(*b);
                let (x, y) = map(*c);
                pb.quad_to(x1, y1, x, y);
            }
            OutlineCurve::Cubic(_, b, c, d) => {
                let (x1, y1) = map(*b);
                let (x2, y2) = map(*c);
                let (x, y) = map(*d);
                pb.cubic_to(x1, y1, x2, y2, x, y);
            }
        }
        last = Some(to);
    }
    if last.is_some() {
        pb.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_key_normalizes() {
        assert_eq!(family_key("DejaVu Sans"), "dejavusans");
        assert_eq!(family_key("dejavu-sans"), "dejavusans");
        assert_eq!(family_key("DejaVuSans"), "dejavusans");
    }

    #[test]
    fn test_empty_book_uses_fallback_metrics() {
        let book = FontBook::empty();
        let family = FontFamily::Named("Nope".into());
        assert!(book.resolve(&family).is_none());
        assert_eq!(book.line_width(&family, 10.0, "abc"), FallbackMetrics.line_width(&family, 10.0, "abc"));
        assert!((book.line_height(&FontFamily::System, 20.0) - 24.0).abs() < 1e-4);
        assert!((book.ascent(&FontFamily::System, 20.0) - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_family_is_not_loaded() {
        let mut book = FontBook::empty();
        assert!(!book.ensure_loaded(&FontFamily::Named("Missing Font".into())));
        assert!(!book.ensure_loaded(&FontFamily::System));
    }

    #[test]
    fn test_load_file_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = FontBook::empty();
        let missing = dir.path().join("missing.ttf");
        assert!(matches!(book.load_file("x", &missing), Err(FontError::Read { .. })));

        let junk = dir.path().join("junk.ttf");
        std::fs::write(&junk, b"not a font").unwrap();
        assert!(matches!(book.load_file("x", &junk), Err(FontError::Parse { .. })));
    }

    #[test]
    fn test_scan_indexes_font_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("truetype").join("acme");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Acme-Regular.ttf"), b"").unwrap();
        std::fs::write(nested.join("readme.txt"), b"").unwrap();

        let mut book = FontBook::empty();
        book.scan_dir(dir.path(), 0);
        assert!(book.index.contains_key("acme"));
        assert!(book.index.contains_key("acmeregular"));
        assert_eq!(book.index.len(), 2);
    }
}
