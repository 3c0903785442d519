//! PNG format support.
//!
//! Reading and writing of 8-bit and 16-bit PNG images through the `png`
//! crate.
//!
//! # Features
//!
//! - Gray, gray-alpha, RGB and RGBA at 8 or 16 bits
//! - Palette and low bit depth images expanded on read
//! - 16-bit samples swapped between PNG big-endian and in-memory little-endian
//! - Compression level control
//!
//! # Example
//!
//! ```rust,ignore
//! use tex_io::png::{read_from_memory, write_to_memory, PngWriterOptions};
//!
//! let image = read_from_memory(&bytes)?;
//! let out = write_to_memory(&image, &PngWriterOptions::default())?;
//! ```

use crate::raw::RawImage2D;
use crate::{IoError, IoResult};
use std::io::Cursor;
use tex_core::{ElementLayout, Image, PixelDataType};

/// Options for writing PNG files.
#[derive(Debug, Clone, Default)]
pub struct PngWriterOptions {
    /// Trade file size for encoding speed. Default: false.
    pub fast: bool,
}

/// Decodes a PNG into R/RG/RGB/RGBA UNorm8 or UNorm16 pixels.
pub fn decode(data: &[u8]) -> IoResult<RawImage2D> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info().map_err(IoError::decode)?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::decode("cannot determine PNG output buffer size"))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader.next_frame(&mut buf).map_err(IoError::decode)?;
    buf.truncate(info.buffer_size());

    let layout = match info.color_type {
        png::ColorType::Grayscale => ElementLayout::R,
        png::ColorType::GrayscaleAlpha => ElementLayout::Rg,
        png::ColorType::Rgb => ElementLayout::Rgb,
        png::ColorType::Rgba => ElementLayout::Rgba,
        png::ColorType::Indexed => {
            return Err(IoError::decode("PNG palette was not expanded"));
        }
    };
    let ty = match info.bit_depth {
        png::BitDepth::Eight => PixelDataType::UNorm8,
        png::BitDepth::Sixteen => {
            RawImage2D::swap_u16_bytes(&mut buf);
            PixelDataType::UNorm16
        }
        other => {
            return Err(IoError::decode(format!("unexpected PNG bit depth {other:?}")));
        }
    };

    RawImage2D::new(info.width, info.height, layout, ty, buf)
}

/// Encodes UNorm8 or UNorm16 pixels with 1 to 4 components.
pub fn encode(raw: &RawImage2D, options: &PngWriterOptions) -> IoResult<Vec<u8>> {
    let color = match raw.layout {
        ElementLayout::R => png::ColorType::Grayscale,
        ElementLayout::Rg => png::ColorType::GrayscaleAlpha,
        ElementLayout::Rgb => png::ColorType::Rgb,
        ElementLayout::Rgba => png::ColorType::Rgba,
        other => return Err(IoError::encode(format!("PNG cannot store {other} layout"))),
    };
    let (depth, data) = match raw.ty {
        PixelDataType::UNorm8 => (png::BitDepth::Eight, raw.data.clone()),
        PixelDataType::UNorm16 => {
            let mut swapped = raw.data.clone();
            RawImage2D::swap_u16_bytes(&mut swapped);
            (png::BitDepth::Sixteen, swapped)
        }
        other => return Err(IoError::encode(format!("PNG cannot store {other} samples"))),
    };

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, raw.width, raw.height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        encoder.set_compression(if options.fast {
            png::Compression::Fast
        } else {
            png::Compression::default()
        });
        let mut writer = encoder.write_header().map_err(IoError::encode)?;
        writer.write_image_data(&data).map_err(IoError::encode)?;
        writer.finish().map_err(IoError::encode)?;
    }
    Ok(out)
}

/// Reads a PNG from memory as a single-level 2D image.
pub fn read_from_memory(data: &[u8]) -> IoResult<Image> {
    decode(data)?.into_image()
}

/// Writes layer 0 / mip 0 of an image as PNG.
pub fn write_to_memory(image: &Image, options: &PngWriterOptions) -> IoResult<Vec<u8>> {
    encode(&RawImage2D::from_image(image)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_rgb8() {
        let data: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 5) as u8).collect();
        let raw = RawImage2D::new(4, 3, ElementLayout::Rgb, PixelDataType::UNorm8, data).unwrap();
        let bytes = encode(&raw, &PngWriterOptions::default()).unwrap();
        assert_eq!(decode(&bytes).unwrap(), raw);
    }

    #[test]
    fn test_roundtrip_gray_alpha16() {
        let data: Vec<u8> = [0x0102u16, 0xFFFE, 0x8000, 0x0001]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let raw = RawImage2D::new(2, 1, ElementLayout::Rg, PixelDataType::UNorm16, data).unwrap();
        let bytes = encode(&raw, &PngWriterOptions { fast: true }).unwrap();
        let back = decode(&bytes).unwrap();
        assert_eq!(back, raw);
        assert_eq!(&back.data[..2], &0x0102u16.to_le_bytes());
    }

    #[test]
    fn test_rejects_float() {
        let raw = RawImage2D::new(1, 1, ElementLayout::R, PixelDataType::F32, vec![0; 4]).unwrap();
        assert!(encode(&raw, &PngWriterOptions::default()).is_err());
    }

    #[test]
    fn test_garbage() {
        assert!(decode(b"not a png").is_err());
    }
}
