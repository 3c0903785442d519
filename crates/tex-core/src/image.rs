//! Texture value: descriptor plus owned pixel buffer.
//!
//! [`Image`] pairs an [`ImageDescriptor`] with one contiguous byte buffer in
//! the layout the descriptor defines. Raw level accessors convert between
//! the caller's element layout/type and the image's own on the fly.
//!
//! # Example
//!
//! ```rust
//! use tex_core::{Compression, ElementLayout, Image, ImageDescriptor, PixelDataType, PixelFormat};
//!
//! let fmt = PixelFormat::uncompressed(ElementLayout::Rgba, PixelDataType::UNorm8);
//! let mut img = Image::new(ImageDescriptor::new_2d(2, 1, fmt).unwrap()).unwrap();
//!
//! // Two RGB float texels become RGBA8, alpha filled in.
//! let src: Vec<u8> = [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0]
//!     .iter()
//!     .flat_map(|v| v.to_le_bytes())
//!     .collect();
//! let f32 = Some(PixelDataType::F32);
//! img.set_raw_image(0, 0, &src, ElementLayout::Rgb, f32, Compression::None).unwrap();
//!
//! assert_eq!(img.level(0, 0).unwrap(), &[255, 0, 0, 255, 0, 255, 0, 255]);
//! ```

use crate::convert::convert_elements;
use crate::descriptor::ImageDescriptor;
use crate::error::{Error, Result};
use crate::format::{Compression, ElementLayout, PixelDataType, PixelFormat};

/// Zero-filled buffer whose allocation failure is reported, not aborted on.
fn allocate_zeroed(size: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|e| Error::allocation_failed(size, e.to_string()))?;
    data.resize(size, 0);
    Ok(data)
}

/// A texture with exclusively owned pixel storage.
///
/// Size-affecting descriptor edits through [`Image::descriptor_mut`] leave
/// the buffer stale until [`Image::alloc`] is called; level accessors return
/// [`Error::NotAllocated`] meanwhile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    desc: ImageDescriptor,
    data: Vec<u8>,
    stale: bool,
}

impl Image {
    /// Creates an image with a zero-filled buffer of `desc.total_size()` bytes.
    pub fn new(desc: ImageDescriptor) -> Result<Self> {
        let data = allocate_zeroed(desc.total_size())?;
        Ok(Self {
            desc,
            data,
            stale: false,
        })
    }

    /// Wraps an existing buffer, which must be exactly `desc.total_size()` bytes.
    pub fn from_data(desc: ImageDescriptor, data: Vec<u8>) -> Result<Self> {
        if data.len() != desc.total_size() {
            return Err(Error::size_mismatch(desc.total_size(), data.len()));
        }
        Ok(Self {
            desc,
            data,
            stale: false,
        })
    }

    /// Discards the pixel data and allocates a zeroed buffer for the current descriptor.
    pub fn alloc(&mut self) -> Result<()> {
        self.data = allocate_zeroed(self.desc.total_size())?;
        self.stale = false;
        Ok(())
    }

    /// The descriptor.
    #[inline]
    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.desc
    }

    /// Mutable descriptor access. Marks the buffer stale.
    pub fn descriptor_mut(&mut self) -> &mut ImageDescriptor {
        self.stale = true;
        &mut self.desc
    }

    /// Whether the buffer matches the current descriptor.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        !self.stale && self.data.len() == self.desc.total_size()
    }

    /// Whole pixel buffer.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whole pixel buffer, mutable.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Splits into descriptor and buffer.
    pub fn into_parts(self) -> (ImageDescriptor, Vec<u8>) {
        (self.desc, self.data)
    }

    fn range(&self, layer: u32, mip: u32) -> Result<std::ops::Range<usize>> {
        if !self.is_allocated() {
            return Err(Error::NotAllocated);
        }
        self.desc.level_range(layer, mip)
    }

    /// Bytes of (`layer`, `mip`) in the image's own format.
    pub fn level(&self, layer: u32, mip: u32) -> Result<&[u8]> {
        let range = self.range(layer, mip)?;
        Ok(&self.data[range])
    }

    /// Mutable bytes of (`layer`, `mip`).
    pub fn level_mut(&mut self, layer: u32, mip: u32) -> Result<&mut [u8]> {
        let range = self.range(layer, mip)?;
        Ok(&mut self.data[range])
    }

    /// Number of texels in mip `mip` of one layer.
    pub fn texel_count(&self, mip: u32) -> usize {
        self.desc.mip_width(mip) as usize
            * self.desc.mip_height(mip) as usize
            * self.desc.mip_depth(mip) as usize
    }

    /// Copies (`layer`, `mip`) out, converted to `layout` / `ty`.
    ///
    /// Block compressed images have no per-texel representation; use
    /// [`Image::level`] for their raw blocks.
    pub fn get_raw_image(
        &self,
        layer: u32,
        mip: u32,
        layout: ElementLayout,
        ty: PixelDataType,
    ) -> Result<Vec<u8>> {
        let src = self.level(layer, mip)?;
        let PixelFormat::Uncompressed {
            layout: own_layout,
            ty: own_ty,
        } = self.desc.format()
        else {
            return Err(Error::CompressionMismatch {
                expected: Compression::None,
                got: self.desc.compression(),
            });
        };

        let texels = src.len() / own_layout.component_count() / own_ty.byte_width();
        let mut out = allocate_zeroed(texels * layout.component_count() * ty.byte_width())?;
        convert_elements(src, own_layout, own_ty, &mut out, layout, ty);
        Ok(out)
    }

    /// Fills (`layer`, `mip`) from `src`.
    ///
    /// `compression` must equal the image's exactly. Block data is copied
    /// verbatim and must be exactly the level size. Uncompressed data needs
    /// `ty` and is converted component by component when `layout` or `ty`
    /// differ from the image's.
    pub fn set_raw_image(
        &mut self,
        layer: u32,
        mip: u32,
        src: &[u8],
        layout: ElementLayout,
        ty: Option<PixelDataType>,
        compression: Compression,
    ) -> Result<()> {
        let own = self.desc.format();
        if compression != own.compression() {
            return Err(Error::CompressionMismatch {
                expected: own.compression(),
                got: compression,
            });
        }
        let texels = self.texel_count(mip);
        let dst = self.level_mut(layer, mip)?;

        match own {
            PixelFormat::Compressed { .. } => {
                if src.len() != dst.len() {
                    return Err(Error::size_mismatch(dst.len(), src.len()));
                }
                dst.copy_from_slice(src);
            }
            PixelFormat::Uncompressed {
                layout: own_layout,
                ty: own_ty,
            } => {
                let ty = ty.ok_or_else(|| {
                    Error::invalid_descriptor("uncompressed source data needs a pixel type")
                })?;
                let expected = texels * layout.component_count() * ty.byte_width();
                if src.len() != expected {
                    return Err(Error::size_mismatch(expected, src.len()));
                }
                convert_elements(src, layout, ty, dst, own_layout, own_ty);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ImageKind;

    fn rgba8(w: u32, h: u32) -> ImageDescriptor {
        ImageDescriptor::new_2d(
            w,
            h,
            PixelFormat::uncompressed(ElementLayout::Rgba, PixelDataType::UNorm8),
        )
        .unwrap()
    }

    #[test]
    fn test_new_zeroed() {
        let img = Image::new(rgba8(4, 4)).unwrap();
        assert_eq!(img.data().len(), 64);
        assert!(img.data().iter().all(|&b| b == 0));
        assert!(img.is_allocated());
    }

    #[test]
    fn test_from_data_size_checked() {
        let err = Image::from_data(rgba8(2, 2), vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 16, got: 15 }));
    }

    #[test]
    fn test_descriptor_mut_marks_stale() {
        let mut img = Image::new(rgba8(4, 4)).unwrap();
        img.descriptor_mut().set_dimensions(8, 8, 1).unwrap();
        assert!(!img.is_allocated());
        assert!(matches!(img.level(0, 0), Err(Error::NotAllocated)));

        img.alloc().unwrap();
        assert_eq!(img.level(0, 0).unwrap().len(), 256);
    }

    #[test]
    fn test_level_slices() {
        let desc = ImageDescriptor::new(
            ImageKind::Image2D,
            2,
            2,
            1,
            2,
            2,
            PixelFormat::uncompressed(ElementLayout::R, PixelDataType::UInt8),
        )
        .unwrap();
        let img = Image::from_data(desc, (0..10).collect()).unwrap();
        assert_eq!(img.level(0, 1).unwrap(), &[4]);
        assert_eq!(img.level(1, 0).unwrap(), &[5, 6, 7, 8]);
        assert!(img.level(2, 0).unwrap_err().is_bounds_error());
    }

    #[test]
    fn test_set_raw_same_format() {
        let mut img = Image::new(rgba8(1, 2)).unwrap();
        let src = [1, 2, 3, 4, 5, 6, 7, 8];
        let ty = Some(PixelDataType::UNorm8);
        img.set_raw_image(0, 0, &src, ElementLayout::Rgba, ty, Compression::None)
            .unwrap();
        assert_eq!(img.data(), &src);
    }

    #[test]
    fn test_set_raw_converts() {
        let mut img = Image::new(rgba8(1, 1)).unwrap();
        let src: Vec<u8> = [u16::MAX, 0, u16::MAX]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let ty = Some(PixelDataType::UNorm16);
        img.set_raw_image(0, 0, &src, ElementLayout::Bgr, ty, Compression::None)
            .unwrap();
        assert_eq!(img.data(), &[255, 0, 255, 255]);
    }

    #[test]
    fn test_set_raw_size_mismatch() {
        let mut img = Image::new(rgba8(2, 2)).unwrap();
        let ty = Some(PixelDataType::UNorm8);
        let err = img
            .set_raw_image(0, 0, &[0; 12], ElementLayout::Rgba, ty, Compression::None)
            .unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 16, got: 12 }));
    }

    #[test]
    fn test_set_raw_needs_type() {
        let mut img = Image::new(rgba8(1, 1)).unwrap();
        let err = img
            .set_raw_image(0, 0, &[0; 4], ElementLayout::Rgba, None, Compression::None)
            .unwrap_err();
        assert!(err.is_descriptor_error());
    }

    #[test]
    fn test_compression_must_match() {
        let desc =
            ImageDescriptor::new_2d(8, 8, PixelFormat::compressed(Compression::Bc1)).unwrap();
        let mut img = Image::new(desc).unwrap();
        assert_eq!(img.data().len(), 32);

        let err = img
            .set_raw_image(0, 0, &[0; 64], ElementLayout::Rgba, None, Compression::Bc3)
            .unwrap_err();
        assert!(matches!(err, Error::CompressionMismatch { .. }));

        let blocks: Vec<u8> = (0..32).collect();
        img.set_raw_image(0, 0, &blocks, ElementLayout::Rgb, None, Compression::Bc1)
            .unwrap();
        assert_eq!(img.level(0, 0).unwrap(), blocks.as_slice());
    }

    #[test]
    fn test_get_raw_compressed_rejected() {
        let desc =
            ImageDescriptor::new_2d(4, 4, PixelFormat::compressed(Compression::Bc7)).unwrap();
        let img = Image::new(desc).unwrap();
        assert!(img.get_raw_image(0, 0, ElementLayout::Rgba, PixelDataType::UNorm8).is_err());
    }

    #[test]
    fn test_get_raw_image() {
        let mut img = Image::new(rgba8(1, 1)).unwrap();
        img.data_mut().copy_from_slice(&[255, 0, 0, 128]);
        let out = img.get_raw_image(0, 0, ElementLayout::R, PixelDataType::F32).unwrap();
        assert_eq!(out, 1.0f32.to_le_bytes());
    }
}
