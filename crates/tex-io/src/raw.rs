//! Single-level 2D pixel buffer exchanged with the delegated codecs.
//!
//! Bitmap-style formats only know one 2D image. Their decoders produce a
//! [`RawImage2D`]; the facade turns it into a one-layer, one-mip
//! [`Image`], and encoders get one back out of layer 0 / mip 0.

use crate::{IoError, IoResult};
use tex_core::{
    convert_buffer, ElementLayout, Image, ImageDescriptor, PixelDataType, PixelFormat,
};

/// Tightly packed, little-endian 2D pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage2D {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Component layout.
    pub layout: ElementLayout,
    /// Component type.
    pub ty: PixelDataType,
    /// Pixel bytes, rows top to bottom.
    pub data: Vec<u8>,
}

impl RawImage2D {
    /// Wraps decoded pixels, checking the buffer length.
    pub fn new(
        width: u32,
        height: u32,
        layout: ElementLayout,
        ty: PixelDataType,
        data: Vec<u8>,
    ) -> IoResult<Self> {
        let texels = width as usize * height as usize;
        let expected = texels * layout.component_count() * ty.byte_width();
        if data.len() != expected {
            return Err(IoError::decode(format!(
                "decoder returned {} bytes for {width}x{height} {layout} {ty}, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            ty,
            data,
        })
    }

    /// Number of components per pixel.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.layout.component_count()
    }

    /// Whether components are floating point.
    #[inline]
    pub fn is_float(&self) -> bool {
        self.ty.is_float()
    }

    /// Bytes per component.
    #[inline]
    pub fn element_bytes(&self) -> usize {
        self.ty.byte_width()
    }

    /// Copy converted to another layout and type.
    pub fn convert(&self, layout: ElementLayout, ty: PixelDataType) -> Self {
        Self {
            width: self.width,
            height: self.height,
            layout,
            ty,
            data: convert_buffer(&self.data, self.layout, self.ty, layout, ty),
        }
    }

    /// Single-layer, single-mip 2D image holding these pixels.
    pub fn into_image(self) -> IoResult<Image> {
        let desc = ImageDescriptor::new_2d(
            self.width,
            self.height,
            PixelFormat::uncompressed(self.layout, self.ty),
        )?;
        Ok(Image::from_data(desc, self.data)?)
    }

    /// Layer 0 / mip 0 of an uncompressed image.
    pub fn from_image(image: &Image) -> IoResult<Self> {
        let desc = image.descriptor();
        let PixelFormat::Uncompressed { layout, ty } = desc.format() else {
            return Err(IoError::Unsupported(format!(
                "{} data has no per-pixel form",
                desc.compression()
            )));
        };
        Ok(Self {
            width: desc.width(),
            height: desc.height(),
            layout,
            ty,
            data: image.level(0, 0)?.to_vec(),
        })
    }

    /// Swaps the byte order of every 16-bit component in place.
    pub fn swap_u16_bytes(data: &mut [u8]) {
        for pair in data.chunks_exact_mut(2) {
            pair.swap(0, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_checked() {
        let err = RawImage2D::new(2, 2, ElementLayout::Rgb, PixelDataType::UNorm8, vec![0; 11]);
        assert!(err.is_err());
    }

    #[test]
    fn test_image_round_trip() {
        let raw = RawImage2D::new(
            2,
            1,
            ElementLayout::Rg,
            PixelDataType::UNorm8,
            vec![1, 2, 3, 4],
        )
        .unwrap();
        let image = raw.clone().into_image().unwrap();
        assert_eq!(image.descriptor().width(), 2);
        assert_eq!(RawImage2D::from_image(&image).unwrap(), raw);
    }

    #[test]
    fn test_convert() {
        let raw =
            RawImage2D::new(1, 1, ElementLayout::R, PixelDataType::UNorm8, vec![255]).unwrap();
        let rgba = raw.convert(ElementLayout::Rgba, PixelDataType::F32);
        assert!(rgba.is_float());
        assert_eq!(rgba.element_bytes(), 4);
        assert_eq!(&rgba.data[..4], &1.0f32.to_le_bytes());
        assert_eq!(&rgba.data[12..], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_swap_u16() {
        let mut data = [0x12, 0x34, 0xAB, 0xCD];
        RawImage2D::swap_u16_bytes(&mut data);
        assert_eq!(data, [0x34, 0x12, 0xCD, 0xAB]);
    }
}
