//! BMP, TGA and GIF support through the `image` crate.
//!
//! All three decode to RGB or RGBA UNorm8 depending on whether the source
//! carries alpha. BMP and TGA can be written from RGB/RGBA UNorm8; GIF is
//! read-only and yields its first frame.

use crate::detect::Format;
use crate::raw::RawImage2D;
use crate::{IoError, IoResult};
use std::io::Cursor;
use tex_core::{ElementLayout, Image, PixelDataType};

fn image_format(format: Format) -> IoResult<image::ImageFormat> {
    match format {
        Format::Bmp => Ok(image::ImageFormat::Bmp),
        Format::Tga => Ok(image::ImageFormat::Tga),
        Format::Gif => Ok(image::ImageFormat::Gif),
        other => Err(IoError::UnsupportedFormat(format!(
            "{other} is not handled by the bitmap codec"
        ))),
    }
}

/// Decodes a BMP, TGA or GIF.
pub fn decode(data: &[u8], format: Format) -> IoResult<RawImage2D> {
    let decoded = image::load_from_memory_with_format(data, image_format(format)?)
        .map_err(IoError::decode)?;
    let (width, height) = (decoded.width(), decoded.height());
    if decoded.color().has_alpha() {
        let pixels = decoded.into_rgba8().into_raw();
        RawImage2D::new(width, height, ElementLayout::Rgba, PixelDataType::UNorm8, pixels)
    } else {
        let pixels = decoded.into_rgb8().into_raw();
        RawImage2D::new(width, height, ElementLayout::Rgb, PixelDataType::UNorm8, pixels)
    }
}

/// Encodes RGB or RGBA UNorm8 pixels as BMP or TGA.
pub fn encode(raw: &RawImage2D, format: Format) -> IoResult<Vec<u8>> {
    if format == Format::Gif {
        return Err(IoError::Unsupported("gif is read-only".into()));
    }
    let target = image_format(format)?;
    let color = match (raw.layout, raw.ty) {
        (ElementLayout::Rgb, PixelDataType::UNorm8) => image::ExtendedColorType::Rgb8,
        (ElementLayout::Rgba, PixelDataType::UNorm8) => image::ExtendedColorType::Rgba8,
        (layout, ty) => {
            return Err(IoError::encode(format!("{format} cannot store {layout} {ty}")));
        }
    };

    let mut out = Cursor::new(Vec::new());
    image::write_buffer_with_format(&mut out, &raw.data, raw.width, raw.height, color, target)
        .map_err(IoError::encode)?;
    Ok(out.into_inner())
}

/// Reads a BMP, TGA or GIF from memory as a single-level 2D image.
pub fn read_from_memory(data: &[u8], format: Format) -> IoResult<Image> {
    decode(data, format)?.into_image()
}

/// Writes layer 0 / mip 0 of an image as BMP or TGA.
pub fn write_to_memory(image: &Image, format: Format) -> IoResult<Vec<u8>> {
    encode(&RawImage2D::from_image(image)?, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(layout: ElementLayout) -> RawImage2D {
        let n = 5 * 3 * layout.component_count();
        let data = (0..n).map(|i| (i * 17 % 256) as u8).collect();
        RawImage2D::new(5, 3, layout, PixelDataType::UNorm8, data).unwrap()
    }

    #[test]
    fn test_bmp_roundtrip() {
        let raw = checker(ElementLayout::Rgb);
        let bytes = encode(&raw, Format::Bmp).unwrap();
        assert_eq!(&bytes[..2], b"BM");
        assert_eq!(decode(&bytes, Format::Bmp).unwrap(), raw);
    }

    #[test]
    fn test_tga_roundtrip_alpha() {
        let raw = checker(ElementLayout::Rgba);
        let bytes = encode(&raw, Format::Tga).unwrap();
        assert_eq!(decode(&bytes, Format::Tga).unwrap(), raw);
    }

    #[test]
    fn test_gif_not_writable() {
        let raw = checker(ElementLayout::Rgb);
        assert!(matches!(encode(&raw, Format::Gif), Err(IoError::Unsupported(_))));
    }

    #[test]
    fn test_wrong_format() {
        assert!(decode(&[], Format::Png).is_err());
    }
}
