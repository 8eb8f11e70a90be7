//! Export of flattened screenshots: PNG encoding, files and the clipboard

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

/// MIME type offered to the clipboard
pub const PNG_MIME: &str = "image/png";

/// Failure while producing or delivering an exported image
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("rendering failed: {0}")]
    RenderFailed(String),

    #[error("image conversion failed: {0}")]
    ImageConversionFailed(#[from] image::ImageError),

    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("clipboard rejected the image: {0}")]
    ClipboardFailed(String),
}

/// Destination for copied images; implemented by the host's clipboard integration
pub trait ClipboardSink {
    fn write(&self, mime_type: &str, bytes: Vec<u8>) -> anyhow::Result<()>;
}

/// Encode an image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Encode and write a PNG file
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), ExportError> {
    let bytes = encode_png(image)?;
    std::fs::write(path, bytes).map_err(|source| ExportError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "Saved {}x{} image to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

pub fn copy_to_clipboard(sink: &dyn ClipboardSink, image: &RgbaImage) -> Result<(), ExportError> {
    let bytes = encode_png(image)?;
    let len = bytes.len();
    sink.write(PNG_MIME, bytes)
        .map_err(|err| ExportError::ClipboardFailed(format!("{:#}", err)))?;
    log::debug!("Copied {} PNG bytes to clipboard", len);
    Ok(())
}
