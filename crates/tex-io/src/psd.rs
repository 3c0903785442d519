//! Adobe Photoshop (PSD) support, read-only.
//!
//! Only the flattened composite is read, as RGBA UNorm8. Layers, masks and
//! adjustment data are ignored.

use crate::raw::RawImage2D;
use crate::{IoError, IoResult};
use psd::{ColorMode, Psd};
use tex_core::{ElementLayout, Image, PixelDataType};

/// Decodes the composite image of an RGB or grayscale document.
pub fn decode(data: &[u8]) -> IoResult<RawImage2D> {
    let psd = Psd::from_bytes(data).map_err(|e| IoError::decode(format!("PSD parse error: {e}")))?;

    match psd.color_mode() {
        ColorMode::Rgb | ColorMode::Grayscale => {}
        mode => {
            return Err(IoError::UnsupportedFormat(format!(
                "psd: color mode {mode:?} not supported"
            )));
        }
    }

    RawImage2D::new(
        psd.width(),
        psd.height(),
        ElementLayout::Rgba,
        PixelDataType::UNorm8,
        psd.rgba(),
    )
}

/// Reads the composite of a PSD as a single-level 2D image.
pub fn read_from_memory(data: &[u8]) -> IoResult<Image> {
    decode(data)?.into_image()
}
