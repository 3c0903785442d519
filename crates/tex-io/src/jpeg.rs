//! JPEG format support.
//!
//! Decoding via `jpeg-decoder`, encoding via `jpeg-encoder`.
//!
//! # Overview
//!
//! JPEG is a lossy, 2D-only format:
//! - Grayscale read as R UNorm8 (or R UNorm16 for 16-bit lossless streams)
//! - Color read as RGB UNorm8; CMYK is converted to RGB
//! - Written from R or RGB UNorm8; there is no alpha channel
//!
//! # Example
//!
//! ```rust,ignore
//! use tex_io::jpeg::{write_to_memory, JpegWriterOptions};
//!
//! let out = write_to_memory(&image, &JpegWriterOptions { quality: 95 })?;
//! ```

use crate::raw::RawImage2D;
use crate::{IoError, IoResult};
use std::io::Cursor;
use tex_core::{ElementLayout, Image, PixelDataType};

/// Options for writing JPEG files.
#[derive(Debug, Clone)]
pub struct JpegWriterOptions {
    /// Quality level 1-100. Higher = better quality, larger files.
    /// Default: 90.
    pub quality: u8,
}

impl Default for JpegWriterOptions {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    cmyk.chunks_exact(4)
        .flat_map(|p| {
            let k = 1.0 - p[3] as f32 / 255.0;
            let channel = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0).round() as u8;
            [channel(p[0]), channel(p[1]), channel(p[2])]
        })
        .collect()
}

/// Decodes a baseline or progressive JPEG.
pub fn decode(data: &[u8]) -> IoResult<RawImage2D> {
    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
    let pixels = decoder.decode().map_err(IoError::decode)?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::decode("missing JPEG info"))?;
    let (width, height) = (info.width as u32, info.height as u32);

    match info.pixel_format {
        jpeg_decoder::PixelFormat::L8 => {
            RawImage2D::new(width, height, ElementLayout::R, PixelDataType::UNorm8, pixels)
        }
        jpeg_decoder::PixelFormat::L16 => {
            let mut pixels = pixels;
            RawImage2D::swap_u16_bytes(&mut pixels);
            RawImage2D::new(width, height, ElementLayout::R, PixelDataType::UNorm16, pixels)
        }
        jpeg_decoder::PixelFormat::RGB24 => {
            RawImage2D::new(width, height, ElementLayout::Rgb, PixelDataType::UNorm8, pixels)
        }
        jpeg_decoder::PixelFormat::CMYK32 => RawImage2D::new(
            width,
            height,
            ElementLayout::Rgb,
            PixelDataType::UNorm8,
            cmyk_to_rgb(&pixels),
        ),
    }
}

/// Encodes R or RGB UNorm8 pixels.
pub fn encode(raw: &RawImage2D, options: &JpegWriterOptions) -> IoResult<Vec<u8>> {
    if raw.ty != PixelDataType::UNorm8 {
        return Err(IoError::encode(format!("JPEG cannot store {} samples", raw.ty)));
    }
    let color = match raw.layout {
        ElementLayout::R => jpeg_encoder::ColorType::Luma,
        ElementLayout::Rgb => jpeg_encoder::ColorType::Rgb,
        other => return Err(IoError::encode(format!("JPEG cannot store {other} layout"))),
    };
    let width = u16::try_from(raw.width).map_err(|_| IoError::encode("JPEG width exceeds 65535"))?;
    let height =
        u16::try_from(raw.height).map_err(|_| IoError::encode("JPEG height exceeds 65535"))?;

    let mut out = Vec::new();
    let encoder = jpeg_encoder::Encoder::new(&mut out, options.quality.clamp(1, 100));
    encoder
        .encode(&raw.data, width, height, color)
        .map_err(IoError::encode)?;
    Ok(out)
}

/// Reads a JPEG from memory as a single-level 2D image.
pub fn read_from_memory(data: &[u8]) -> IoResult<Image> {
    decode(data)?.into_image()
}

/// Writes layer 0 / mip 0 of an image as JPEG.
pub fn write_to_memory(image: &Image, options: &JpegWriterOptions) -> IoResult<Vec<u8>> {
    encode(&RawImage2D::from_image(image)?, options)
}
