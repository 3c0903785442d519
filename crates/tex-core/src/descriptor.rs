//! Image descriptors and mip chain layout.
//!
//! This module provides [`ImageDescriptor`] - the metadata record of one
//! logical texture (dimensions, kind, array/mip counts, texel format) - and
//! the pure functions that derive byte sizes and offsets of every mip level.
//!
//! # Buffer Layout
//!
//! A texture's pixel buffer is one contiguous region. Array layers are the
//! outer dimension, mip levels the inner one, base level first, with no
//! padding anywhere. Cubemaps contribute six consecutive layers per cube:
//!
//! ```text
//! ┌──────────── layer 0 ────────────┬──────────── layer 1 ────────────┐
//! │ mip 0 │ mip 1 │ mip 2 │ ... │   │ mip 0 │ mip 1 │ mip 2 │ ... │   │
//! └─────────────────────────────────┴─────────────────────────────────┘
//!   <-------- layer_size -------->
//! ```
//!
//! # Level Sizes
//!
//! - Uncompressed: `w_i * h_i * d_i * element_size`
//! - Block compressed: `max(ceil(w_i/4) * ceil(h_i/4), 1) * block_bytes * d_i`
//!
//! where `w_i = max(1, width >> i)` and likewise for height and depth.
//!
//! # Usage
//!
//! ```rust
//! use tex_core::{ElementLayout, ImageDescriptor, ImageKind, PixelDataType, PixelFormat};
//!
//! let fmt = PixelFormat::uncompressed(ElementLayout::Rgba, PixelDataType::UNorm8);
//! let desc = ImageDescriptor::new(ImageKind::Image2D, 64, 64, 1, 1, 7, fmt).unwrap();
//!
//! assert_eq!(desc.mip_size(0), 16384);
//! assert_eq!(desc.layer_size(), 21844);
//! ```

use crate::error::{Error, Result};
use crate::format::{Compression, ElementLayout, PixelDataType, PixelFormat};
use std::ops::Range;

/// Upper bound on the number of mip levels of any descriptor.
pub const MAX_MIP_COUNT: u32 = 32;

/// Dimensionality of a texture.
///
/// Whether a texture is an array is derived from its array count: any
/// kind with `array_count > 1` is an array of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageKind {
    /// One-dimensional image, height and depth fixed at 1.
    Image1D,
    /// Two-dimensional image, depth fixed at 1.
    #[default]
    Image2D,
    /// Volume texture.
    Image3D,
    /// Six square 2D faces (+X, -X, +Y, -Y, +Z, -Z).
    Cubemap,
}

impl ImageKind {
    /// Number of faces per array element: 6 for cubemaps, 1 otherwise.
    #[inline]
    pub const fn face_count(&self) -> u32 {
        match self {
            Self::Cubemap => 6,
            _ => 1,
        }
    }

    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Image1D => "1d",
            Self::Image2D => "2d",
            Self::Image3D => "3d",
            Self::Cubemap => "cube",
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Derived per-level sizes and offsets of one array layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MipLayout {
    sizes: Vec<usize>,
    offsets: Vec<usize>,
    layer_size: usize,
}

impl MipLayout {
    /// Byte size of each mip level, base level first.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Byte offset of each mip level from the start of its layer.
    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Sum of all level sizes.
    #[inline]
    pub fn layer_size(&self) -> usize {
        self.layer_size
    }
}

/// Number of levels in a full mip chain: `floor(log2(max(w, h, d))) + 1`.
///
/// Zero extents count as 1.
pub fn max_mip_count(width: u32, height: u32, depth: u32) -> u32 {
    let largest = width.max(height).max(depth).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Extent of an axis at mip `level`: `max(1, extent >> level)`.
#[inline]
pub fn mip_extent(extent: u32, level: u32) -> u32 {
    extent.checked_shr(level).unwrap_or(0).max(1)
}

/// Byte size of a single `width x height x depth` level in `format`.
///
/// Returns `None` on arithmetic overflow.
pub fn level_size(format: PixelFormat, width: u32, height: u32, depth: u32) -> Option<usize> {
    let (w, h, d) = (width as usize, height as usize, depth as usize);
    match format {
        PixelFormat::Uncompressed { layout, ty } => w
            .checked_mul(h)?
            .checked_mul(d)?
            .checked_mul(layout.component_count() * ty.byte_width()),
        PixelFormat::Compressed { compression, .. } => {
            let blocks = (w.div_ceil(4).checked_mul(h.div_ceil(4))?).max(1);
            blocks.checked_mul(compression.block_bytes())?.checked_mul(d)
        }
    }
}

/// Computes per-level sizes, offsets and the layer size of a mip chain.
///
/// `mip_count` is used as given; callers clamp it first.
pub fn compute_layout(
    format: PixelFormat,
    width: u32,
    height: u32,
    depth: u32,
    mip_count: u32,
) -> Result<MipLayout> {
    let mut sizes = Vec::with_capacity(mip_count as usize);
    let mut offsets = Vec::with_capacity(mip_count as usize);
    let mut offset = 0usize;

    for level in 0..mip_count {
        let size = level_size(
            format,
            mip_extent(width, level),
            mip_extent(height, level),
            mip_extent(depth, level),
        )
        .ok_or_else(|| Error::invalid_descriptor(format!("mip {level} size overflows")))?;
        offsets.push(offset);
        sizes.push(size);
        offset = offset
            .checked_add(size)
            .ok_or_else(|| Error::invalid_descriptor("layer size overflows"))?;
    }

    Ok(MipLayout {
        sizes,
        offsets,
        layer_size: offset,
    })
}

/// Metadata of one logical texture.
///
/// Construction validates the fields and caches the mip layout. Every
/// setter re-validates and recomputes the layout; an [`crate::Image`]
/// holding the descriptor must be re-allocated afterwards.
///
/// # Invariants
///
/// - `width`, `height`, `depth` are at least 1; axes unused by the kind are 1
/// - `mip_count` is in `1..=max_mip_count(width, height, depth)`
/// - `array_count` is at least 1 and counts whole cubes for cubemaps
/// - block-compressed formats carry no pixel type
///
/// # Example
///
/// ```rust
/// use tex_core::{Compression, ImageDescriptor, ImageKind, PixelFormat};
///
/// // Requested mip count is clamped to the full chain length.
/// let desc = ImageDescriptor::new(
///     ImageKind::Cubemap, 16, 16, 1, 2, 20,
///     PixelFormat::compressed(Compression::Bc3),
/// ).unwrap();
///
/// assert_eq!(desc.mip_count(), 5);
/// assert_eq!(desc.layer_count(), 12);
/// assert_eq!(desc.total_size(), desc.layer_size() * 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    kind: ImageKind,
    width: u32,
    height: u32,
    depth: u32,
    array_count: u32,
    mip_count: u32,
    format: PixelFormat,
    layout: MipLayout,
}

impl ImageDescriptor {
    /// Creates a validated descriptor.
    ///
    /// Zero extents are coerced to 1 and extents unused by `kind` are forced
    /// to 1. `mip_count` is silently clamped to the longest chain the base
    /// extents allow.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDescriptor`] if `mip_count` or `array_count` is zero,
    /// a cubemap is not square, the block format cannot decode to the
    /// requested layout, or the total size overflows.
    pub fn new(
        kind: ImageKind,
        width: u32,
        height: u32,
        depth: u32,
        array_count: u32,
        mip_count: u32,
        format: PixelFormat,
    ) -> Result<Self> {
        if mip_count == 0 {
            return Err(Error::invalid_descriptor("mip count must be at least 1"));
        }
        if array_count == 0 {
            return Err(Error::invalid_descriptor("array count must be at least 1"));
        }
        if let PixelFormat::Compressed { compression, layout } = format {
            if !compression.is_compressed() {
                return Err(Error::invalid_descriptor(
                    "compressed format needs a block compression kind",
                ));
            }
            if !compression.accepts_layout(layout) {
                return Err(Error::invalid_descriptor(format!(
                    "{compression} cannot decode to {layout}"
                )));
            }
        }

        let width = width.max(1);
        let (height, depth) = match kind {
            ImageKind::Image1D => (1, 1),
            ImageKind::Image2D | ImageKind::Cubemap => (height.max(1), 1),
            ImageKind::Image3D => (height.max(1), depth.max(1)),
        };
        if kind == ImageKind::Cubemap && width != height {
            return Err(Error::invalid_descriptor(format!(
                "cubemap faces must be square, got {width}x{height}"
            )));
        }

        let mip_count = mip_count
            .min(max_mip_count(width, height, depth))
            .min(MAX_MIP_COUNT);
        let layout = compute_layout(format, width, height, depth, mip_count)?;

        let desc = Self {
            kind,
            width,
            height,
            depth,
            array_count,
            mip_count,
            format,
            layout,
        };
        desc.checked_total_size()?;
        Ok(desc)
    }

    /// Single-layer 2D descriptor with one mip level.
    pub fn new_2d(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        Self::new(ImageKind::Image2D, width, height, 1, 1, 1, format)
    }

    fn rebuild(&mut self, f: impl FnOnce(&mut Self)) -> Result<()> {
        let mut next = self.clone();
        f(&mut next);
        *self = Self::new(
            next.kind,
            next.width,
            next.height,
            next.depth,
            next.array_count,
            next.mip_count,
            next.format,
        )?;
        Ok(())
    }

    /// Changes the texture kind. Re-validates and recomputes the layout.
    pub fn set_kind(&mut self, kind: ImageKind) -> Result<()> {
        self.rebuild(|d| d.kind = kind)
    }

    /// Changes the base extents. Re-validates, re-clamps mips, recomputes the layout.
    pub fn set_dimensions(&mut self, width: u32, height: u32, depth: u32) -> Result<()> {
        self.rebuild(|d| {
            d.width = width;
            d.height = height;
            d.depth = depth;
        })
    }

    /// Changes the mip count (clamped). Recomputes the layout.
    pub fn set_mip_count(&mut self, mip_count: u32) -> Result<()> {
        self.rebuild(|d| d.mip_count = mip_count)
    }

    /// Changes the array count (cubes for cubemaps).
    pub fn set_array_count(&mut self, array_count: u32) -> Result<()> {
        self.rebuild(|d| d.array_count = array_count)
    }

    /// Changes the texel format. Recomputes the layout.
    pub fn set_format(&mut self, format: PixelFormat) -> Result<()> {
        self.rebuild(|d| d.format = format)
    }

    /// Texture kind.
    #[inline]
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Base width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Base height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Base depth in texels (1 unless 3D).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of array elements (cubes for cubemaps).
    #[inline]
    pub fn array_count(&self) -> u32 {
        self.array_count
    }

    /// Number of mip levels after clamping.
    #[inline]
    pub fn mip_count(&self) -> u32 {
        self.mip_count
    }

    /// Texel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Component layout.
    #[inline]
    pub fn element_layout(&self) -> ElementLayout {
        self.format.layout()
    }

    /// Component type, `None` when block compressed.
    #[inline]
    pub fn pixel_type(&self) -> Option<PixelDataType> {
        self.format.pixel_type()
    }

    /// Block compression kind.
    #[inline]
    pub fn compression(&self) -> Compression {
        self.format.compression()
    }

    /// Bytes per texel, uncompressed only.
    #[inline]
    pub fn element_size(&self) -> Option<usize> {
        self.format.element_size()
    }

    /// Cached mip layout of one layer.
    #[inline]
    pub fn layout(&self) -> &MipLayout {
        &self.layout
    }

    /// Whether this is an array texture (`array_count > 1`).
    #[inline]
    pub fn is_array(&self) -> bool {
        self.array_count > 1
    }

    /// Whether this is a cubemap or cubemap array.
    #[inline]
    pub fn is_cubemap(&self) -> bool {
        self.kind == ImageKind::Cubemap
    }

    /// Faces per array element.
    #[inline]
    pub fn face_count(&self) -> u32 {
        self.kind.face_count()
    }

    /// Addressable layers: `array_count * face_count`.
    #[inline]
    pub fn layer_count(&self) -> u32 {
        self.array_count * self.face_count()
    }

    /// Width of mip `level`.
    #[inline]
    pub fn mip_width(&self, level: u32) -> u32 {
        mip_extent(self.width, level)
    }

    /// Height of mip `level`.
    #[inline]
    pub fn mip_height(&self, level: u32) -> u32 {
        mip_extent(self.height, level)
    }

    /// Depth of mip `level`.
    #[inline]
    pub fn mip_depth(&self, level: u32) -> u32 {
        mip_extent(self.depth, level)
    }

    /// Byte size of mip `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= mip_count()`.
    #[inline]
    pub fn mip_size(&self, level: u32) -> usize {
        self.layout.sizes[level as usize]
    }

    /// Byte offset of mip `level` within its layer.
    ///
    /// # Panics
    ///
    /// Panics if `level >= mip_count()`.
    #[inline]
    pub fn mip_offset(&self, level: u32) -> usize {
        self.layout.offsets[level as usize]
    }

    /// Byte size of one layer's full mip chain.
    #[inline]
    pub fn layer_size(&self) -> usize {
        self.layout.layer_size
    }

    /// Size of the whole pixel buffer:
    /// `layer_size * array_count * face_count`.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.layout.layer_size * self.layer_count() as usize
    }

    fn checked_total_size(&self) -> Result<usize> {
        self.layout
            .layer_size
            .checked_mul(self.array_count as usize)
            .and_then(|s| s.checked_mul(self.face_count() as usize))
            .ok_or_else(|| Error::invalid_descriptor("total size overflows"))
    }

    /// Byte offset of `layer` in the pixel buffer.
    pub fn layer_offset(&self, layer: u32) -> Result<usize> {
        self.check_layer(layer)?;
        Ok(self.layout.layer_size * layer as usize)
    }

    /// Byte range of (`layer`, `mip`) in the pixel buffer.
    pub fn level_range(&self, layer: u32, mip: u32) -> Result<Range<usize>> {
        self.check_layer(layer)?;
        if mip >= self.mip_count {
            return Err(Error::MipOutOfRange {
                mip,
                count: self.mip_count,
            });
        }
        let start = self.layout.layer_size * layer as usize + self.mip_offset(mip);
        Ok(start..start + self.mip_size(mip))
    }

    fn check_layer(&self, layer: u32) -> Result<()> {
        if layer >= self.layer_count() {
            return Err(Error::LayerOutOfRange {
                layer,
                count: self.layer_count(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}x{}x{} {} (array {}, mips {})",
            self.kind,
            self.width,
            self.height,
            self.depth,
            self.format,
            self.array_count,
            self.mip_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8() -> PixelFormat {
        PixelFormat::uncompressed(ElementLayout::Rgba, PixelDataType::UNorm8)
    }

    #[test]
    fn test_max_mip_count() {
        assert_eq!(max_mip_count(1, 1, 1), 1);
        assert_eq!(max_mip_count(256, 256, 1), 9);
        assert_eq!(max_mip_count(255, 1, 1), 8);
        assert_eq!(max_mip_count(1, 1, 1024), 11);
        assert_eq!(max_mip_count(0, 0, 0), 1);
        assert_eq!(max_mip_count(u32::MAX, 1, 1), 32);
    }

    #[test]
    fn test_mip_extent() {
        assert_eq!(mip_extent(64, 0), 64);
        assert_eq!(mip_extent(64, 6), 1);
        assert_eq!(mip_extent(64, 10), 1);
        assert_eq!(mip_extent(5, 1), 2);
        assert_eq!(mip_extent(u32::MAX, 40), 1);
    }

    #[test]
    fn test_rgba8_64x64_chain() {
        let desc = ImageDescriptor::new(ImageKind::Image2D, 64, 64, 1, 1, 7, rgba8()).unwrap();
        assert_eq!(desc.layout().sizes(), &[16384, 4096, 1024, 256, 64, 16, 4]);
        assert_eq!(desc.layer_size(), 21844);
        assert_eq!(desc.total_size(), 21844);
    }

    #[test]
    fn test_layout_invariant() {
        for (w, h, d, mips) in [(64, 32, 1, 7), (13, 7, 5, 4), (1, 1, 1, 1), (300, 2, 9, 12)] {
            let desc = ImageDescriptor::new(ImageKind::Image3D, w, h, d, 1, mips, rgba8()).unwrap();
            let layout = desc.layout();
            assert_eq!(layout.sizes().iter().sum::<usize>(), layout.layer_size());
            for i in 0..layout.sizes().len() {
                assert_eq!(layout.offsets()[i], layout.sizes()[..i].iter().sum::<usize>());
            }
        }
    }

    #[test]
    fn test_block_sizes() {
        let bc1 = PixelFormat::compressed(Compression::Bc1);
        let bc7 = PixelFormat::compressed(Compression::Bc7);
        assert_eq!(level_size(bc1, 4, 4, 1), Some(8));
        assert_eq!(level_size(bc1, 1, 1, 1), Some(8));
        assert_eq!(level_size(bc1, 5, 5, 1), Some(32));
        assert_eq!(level_size(bc7, 16, 8, 1), Some(16 * 8));
        // Depth is not block-quantized.
        assert_eq!(level_size(bc7, 4, 4, 3), Some(48));
    }

    #[test]
    fn test_compressed_chain() {
        let desc = ImageDescriptor::new(
            ImageKind::Image2D,
            16,
            16,
            1,
            1,
            5,
            PixelFormat::compressed(Compression::Bc3),
        )
        .unwrap();
        assert_eq!(desc.layout().sizes(), &[256, 64, 16, 16, 16]);
        assert_eq!(desc.pixel_type(), None);
    }

    #[test]
    fn test_mip_clamp_is_silent() {
        let desc = ImageDescriptor::new(ImageKind::Image2D, 256, 256, 1, 1, 30, rgba8()).unwrap();
        assert_eq!(desc.mip_count(), 9);
        let desc = ImageDescriptor::new(ImageKind::Image2D, 1, 1, 1, 1, 4, rgba8()).unwrap();
        assert_eq!(desc.mip_count(), 1);
    }

    #[test]
    fn test_zero_counts_rejected() {
        let err = ImageDescriptor::new(ImageKind::Image2D, 4, 4, 1, 1, 0, rgba8()).unwrap_err();
        assert!(err.is_descriptor_error());
        let err = ImageDescriptor::new(ImageKind::Image2D, 4, 4, 1, 0, 1, rgba8()).unwrap_err();
        assert!(err.is_descriptor_error());
    }

    #[test]
    fn test_zero_dimensions_coerced() {
        let desc = ImageDescriptor::new(ImageKind::Image3D, 0, 0, 0, 1, 1, rgba8()).unwrap();
        assert_eq!((desc.width(), desc.height(), desc.depth()), (1, 1, 1));
        let desc = ImageDescriptor::new(ImageKind::Image1D, 8, 8, 8, 1, 1, rgba8()).unwrap();
        assert_eq!((desc.width(), desc.height(), desc.depth()), (8, 1, 1));
    }

    #[test]
    fn test_cubemap_layers() {
        let desc = ImageDescriptor::new(ImageKind::Cubemap, 8, 8, 1, 3, 1, rgba8()).unwrap();
        assert_eq!(desc.layer_count(), 18);
        assert!(desc.is_array());
        assert_eq!(desc.total_size(), 8 * 8 * 4 * 18);
        assert_eq!(desc.level_range(17, 0).unwrap(), (17 * 256)..(18 * 256));
        assert!(desc.level_range(18, 0).unwrap_err().is_bounds_error());
    }

    #[test]
    fn test_cubemap_must_be_square() {
        let err = ImageDescriptor::new(ImageKind::Cubemap, 8, 4, 1, 1, 1, rgba8()).unwrap_err();
        assert!(err.is_descriptor_error());
    }

    #[test]
    fn test_compressed_layout_checked() {
        let bad = PixelFormat::Compressed {
            compression: Compression::Bc4,
            layout: ElementLayout::Rgba,
        };
        assert!(ImageDescriptor::new_2d(4, 4, bad).is_err());
        let bc1a = PixelFormat::Compressed {
            compression: Compression::Bc1,
            layout: ElementLayout::Rgba,
        };
        assert!(ImageDescriptor::new_2d(4, 4, bc1a).is_ok());
    }

    #[test]
    fn test_setters_recompute() {
        let mut desc = ImageDescriptor::new(ImageKind::Image2D, 64, 64, 1, 1, 7, rgba8()).unwrap();
        desc.set_dimensions(8, 8, 1).unwrap();
        assert_eq!(desc.mip_count(), 4);
        assert_eq!(desc.layer_size(), 256 + 64 + 16 + 4);

        desc.set_format(PixelFormat::uncompressed(ElementLayout::R, PixelDataType::F32)).unwrap();
        assert_eq!(desc.mip_size(0), 256);

        assert!(desc.set_mip_count(0).is_err());
        // Failed setter leaves the descriptor untouched.
        assert_eq!(desc.mip_count(), 4);
    }

    #[test]
    fn test_level_range() {
        let desc = ImageDescriptor::new(ImageKind::Image2D, 4, 4, 1, 2, 3, rgba8()).unwrap();
        assert_eq!(desc.layer_size(), 64 + 16 + 4);
        assert_eq!(desc.level_range(1, 2).unwrap(), (84 + 80)..(84 + 84));
        assert!(matches!(
            desc.level_range(0, 3),
            Err(Error::MipOutOfRange { mip: 3, count: 3 })
        ));
    }
}
