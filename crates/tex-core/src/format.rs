//! Pixel element types, channel layouts and block compression kinds.
//!
//! This module provides the canonical definitions for texel storage used
//! across all tex-rs crates.
//!
//! # Types
//!
//! - [`PixelDataType`] - Scalar element kind (integer, normalized integer, float)
//! - [`ElementLayout`] - Component count and order (R, RG, RGB, RGBA, BGR, BGRA)
//! - [`Compression`] - Block compression kind (BC1..BC7) or none
//! - [`PixelFormat`] - Either an uncompressed element or a compressed block format
//!
//! # Usage
//!
//! ```rust
//! use tex_core::format::{ElementLayout, PixelDataType, PixelFormat};
//!
//! let fmt = PixelFormat::uncompressed(ElementLayout::Rgba, PixelDataType::UNorm8);
//! assert_eq!(fmt.element_size(), Some(4));
//!
//! assert!(PixelDataType::SNorm16.is_normalized());
//! assert_eq!(PixelDataType::F16.byte_width(), 2);
//! ```

/// Scalar element kind of an uncompressed texel component.
///
/// Normalized variants share the storage layout of their plain integer
/// counterpart (`UNorm8` is stored exactly like `UInt8`) but convert to and
/// from floating point as a fixed-point fraction of the representable range.
///
/// # Variants
///
/// - `Int*` / `UInt*` - plain signed / unsigned integers (8/16/32/64 bits)
/// - `SNorm*` / `UNorm*` - normalized signed / unsigned integers
/// - `F16`, `F32`, `F64` - IEEE 754 floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelDataType {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 8-bit signed normalized integer, [-1, 1].
    SNorm8,
    /// 16-bit signed normalized integer, [-1, 1].
    SNorm16,
    /// 32-bit signed normalized integer, [-1, 1].
    SNorm32,
    /// 64-bit signed normalized integer, [-1, 1].
    SNorm64,
    /// 8-bit unsigned normalized integer, [0, 1].
    UNorm8,
    /// 16-bit unsigned normalized integer, [0, 1].
    UNorm16,
    /// 32-bit unsigned normalized integer, [0, 1].
    UNorm32,
    /// 64-bit unsigned normalized integer, [0, 1].
    UNorm64,
    /// 16-bit half-precision float.
    F16,
    /// 32-bit single-precision float.
    F32,
    /// 64-bit double-precision float.
    F64,
}

/// Numeric family of a [`PixelDataType`], used by the conversion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    /// Plain signed integer.
    Int,
    /// Plain unsigned integer.
    UInt,
    /// Signed normalized integer.
    SNorm,
    /// Unsigned normalized integer.
    UNorm,
    /// Floating point.
    Float,
}

impl PixelDataType {
    /// Every tag, in declaration order.
    pub const ALL: [PixelDataType; 19] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::SNorm8,
        Self::SNorm16,
        Self::SNorm32,
        Self::SNorm64,
        Self::UNorm8,
        Self::UNorm16,
        Self::UNorm32,
        Self::UNorm64,
        Self::F16,
        Self::F32,
        Self::F64,
    ];

    /// Number of bits per component.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Int8 | Self::UInt8 | Self::SNorm8 | Self::UNorm8 => 8,
            Self::Int16 | Self::UInt16 | Self::SNorm16 | Self::UNorm16 | Self::F16 => 16,
            Self::Int32 | Self::UInt32 | Self::SNorm32 | Self::UNorm32 | Self::F32 => 32,
            Self::Int64 | Self::UInt64 | Self::SNorm64 | Self::UNorm64 | Self::F64 => 64,
        }
    }

    /// Number of bytes per component.
    #[inline]
    pub const fn byte_width(&self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Numeric family of this type.
    #[inline]
    pub const fn class(&self) -> TypeClass {
        match self {
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => TypeClass::Int,
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => TypeClass::UInt,
            Self::SNorm8 | Self::SNorm16 | Self::SNorm32 | Self::SNorm64 => TypeClass::SNorm,
            Self::UNorm8 | Self::UNorm16 | Self::UNorm32 | Self::UNorm64 => TypeClass::UNorm,
            Self::F16 | Self::F32 | Self::F64 => TypeClass::Float,
        }
    }

    /// Whether this is a floating-point type.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self.class(), TypeClass::Float)
    }

    /// Whether this is a normalized integer type.
    #[inline]
    pub const fn is_normalized(&self) -> bool {
        matches!(self.class(), TypeClass::SNorm | TypeClass::UNorm)
    }

    /// Whether values of this type can be negative. Floats are signed.
    #[inline]
    pub const fn is_signed(&self) -> bool {
        matches!(self.class(), TypeClass::Int | TypeClass::SNorm | TypeClass::Float)
    }

    /// Whether this is any kind of integer type.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Plain integer type sharing this type's storage layout.
    ///
    /// Returns `self` for plain integers and floats.
    pub const fn storage_type(&self) -> PixelDataType {
        match self {
            Self::SNorm8 => Self::Int8,
            Self::SNorm16 => Self::Int16,
            Self::SNorm32 => Self::Int32,
            Self::SNorm64 => Self::Int64,
            Self::UNorm8 => Self::UInt8,
            Self::UNorm16 => Self::UInt16,
            Self::UNorm32 => Self::UInt32,
            Self::UNorm64 => Self::UInt64,
            other => *other,
        }
    }

    /// Largest unsigned value representable in `bits` bits.
    #[inline]
    pub const fn max_unsigned(bits: u32) -> u64 {
        if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
    }

    /// Largest signed value representable in `bits` bits.
    #[inline]
    pub const fn max_signed(bits: u32) -> i64 {
        (Self::max_unsigned(bits) >> 1) as i64
    }

    /// Smallest signed value representable in `bits` bits.
    #[inline]
    pub const fn min_signed(bits: u32) -> i64 {
        -Self::max_signed(bits) - 1
    }

    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt8 => "u8",
            Self::UInt16 => "u16",
            Self::UInt32 => "u32",
            Self::UInt64 => "u64",
            Self::SNorm8 => "snorm8",
            Self::SNorm16 => "snorm16",
            Self::SNorm32 => "snorm32",
            Self::SNorm64 => "snorm64",
            Self::UNorm8 => "unorm8",
            Self::UNorm16 => "unorm16",
            Self::UNorm32 => "unorm32",
            Self::UNorm64 => "unorm64",
            Self::F16 => "f16",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Index of this tag inside [`PixelDataType::ALL`].
    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for PixelDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identity of a single component inside a texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red.
    R,
    /// Green.
    G,
    /// Blue.
    B,
    /// Alpha.
    A,
}

/// Component count and order of a texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementLayout {
    /// Single channel.
    R,
    /// Two channels.
    Rg,
    /// Three channels.
    Rgb,
    /// Four channels.
    #[default]
    Rgba,
    /// Three channels, blue first (legacy D3D masks).
    Bgr,
    /// Four channels, blue first (legacy D3D masks, BGRA8).
    Bgra,
}

impl ElementLayout {
    /// Number of components per texel.
    #[inline]
    pub const fn component_count(&self) -> usize {
        match self {
            Self::R => 1,
            Self::Rg => 2,
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    /// Channel identity of each component, in storage order.
    pub const fn channels(&self) -> &'static [Channel] {
        match self {
            Self::R => &[Channel::R],
            Self::Rg => &[Channel::R, Channel::G],
            Self::Rgb => &[Channel::R, Channel::G, Channel::B],
            Self::Rgba => &[Channel::R, Channel::G, Channel::B, Channel::A],
            Self::Bgr => &[Channel::B, Channel::G, Channel::R],
            Self::Bgra => &[Channel::B, Channel::G, Channel::R, Channel::A],
        }
    }

    /// Whether the layout carries an alpha component.
    #[inline]
    pub const fn has_alpha(&self) -> bool {
        matches!(self, Self::Rgba | Self::Bgra)
    }

    /// Position of `channel` in storage order, if present.
    pub fn position(&self, channel: Channel) -> Option<usize> {
        self.channels().iter().position(|&c| c == channel)
    }

    /// RGB-ordered layout with the given number of components.
    pub const fn from_component_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::R),
            2 => Some(Self::Rg),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }

    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::R => "r",
            Self::Rg => "rg",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
            Self::Bgr => "bgr",
            Self::Bgra => "bgra",
        }
    }
}

impl std::fmt::Display for ElementLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Block compression kind.
///
/// All BCn formats encode 4x4 texel blocks into a fixed number of bytes.
///
/// | Kind | Bytes/block | Canonical layout |
/// |------|-------------|------------------|
/// | BC1 | 8 | RGB (RGBA with 1-bit alpha) |
/// | BC2 | 16 | RGBA |
/// | BC3 | 16 | RGBA |
/// | BC4 | 8 | R |
/// | BC5 | 16 | RG |
/// | BC6H | 16 | RGB (HDR) |
/// | BC7 | 16 | RGBA |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// Uncompressed.
    #[default]
    None,
    /// BC1 / DXT1.
    Bc1,
    /// BC2 / DXT3, explicit alpha.
    Bc2,
    /// BC3 / DXT5, interpolated alpha.
    Bc3,
    /// BC4, single channel.
    Bc4,
    /// BC5, two channels (normal maps).
    Bc5,
    /// BC6H, HDR RGB.
    Bc6h,
    /// BC7, high quality RGBA.
    Bc7,
}

impl Compression {
    /// Returns true for any block-compressed kind.
    #[inline]
    pub const fn is_compressed(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Bytes per 4x4 block. Zero for [`Compression::None`].
    #[inline]
    pub const fn block_bytes(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Bc1 | Self::Bc4 => 8,
            Self::Bc2 | Self::Bc3 | Self::Bc5 | Self::Bc6h | Self::Bc7 => 16,
        }
    }

    /// Layout a block format decodes to when nothing else is known.
    ///
    /// BC1 reports RGB here; the 1-bit-alpha flavour is carried
    /// explicitly by the descriptor's layout.
    pub const fn default_layout(&self) -> ElementLayout {
        match self {
            Self::None | Self::Bc2 | Self::Bc3 | Self::Bc7 => ElementLayout::Rgba,
            Self::Bc1 | Self::Bc6h => ElementLayout::Rgb,
            Self::Bc4 => ElementLayout::R,
            Self::Bc5 => ElementLayout::Rg,
        }
    }

    /// Whether `layout` is a valid decoded layout for this block format.
    pub const fn accepts_layout(&self, layout: ElementLayout) -> bool {
        match self {
            Self::None => true,
            Self::Bc1 => matches!(layout, ElementLayout::Rgb | ElementLayout::Rgba),
            other => other.default_layout() as u8 == layout as u8,
        }
    }

    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bc1 => "bc1",
            Self::Bc2 => "bc2",
            Self::Bc3 => "bc3",
            Self::Bc4 => "bc4",
            Self::Bc5 => "bc5",
            Self::Bc6h => "bc6h",
            Self::Bc7 => "bc7",
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Complete texel encoding of an image.
///
/// The pixel type only exists for uncompressed data; block formats carry
/// their own bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Tightly packed components of a single scalar type.
    Uncompressed {
        /// Component order.
        layout: ElementLayout,
        /// Component type.
        ty: PixelDataType,
    },
    /// 4x4 block-compressed data.
    Compressed {
        /// Block kind, never [`Compression::None`].
        compression: Compression,
        /// Decoded component layout.
        layout: ElementLayout,
    },
}

impl PixelFormat {
    /// Uncompressed format.
    #[inline]
    pub const fn uncompressed(layout: ElementLayout, ty: PixelDataType) -> Self {
        Self::Uncompressed { layout, ty }
    }

    /// Compressed format with the block kind's default layout.
    #[inline]
    pub const fn compressed(compression: Compression) -> Self {
        Self::Compressed {
            compression,
            layout: compression.default_layout(),
        }
    }

    /// Component layout.
    #[inline]
    pub const fn layout(&self) -> ElementLayout {
        match self {
            Self::Uncompressed { layout, .. } | Self::Compressed { layout, .. } => *layout,
        }
    }

    /// Component type, `None` for block formats.
    #[inline]
    pub const fn pixel_type(&self) -> Option<PixelDataType> {
        match self {
            Self::Uncompressed { ty, .. } => Some(*ty),
            Self::Compressed { .. } => None,
        }
    }

    /// Compression kind, [`Compression::None`] for uncompressed data.
    #[inline]
    pub const fn compression(&self) -> Compression {
        match self {
            Self::Uncompressed { .. } => Compression::None,
            Self::Compressed { compression, .. } => *compression,
        }
    }

    /// Bytes per texel, uncompressed formats only.
    #[inline]
    pub const fn element_size(&self) -> Option<usize> {
        match self {
            Self::Uncompressed { layout, ty } => Some(layout.component_count() * ty.byte_width()),
            Self::Compressed { .. } => None,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uncompressed { layout, ty } => write!(f, "{layout} {ty}"),
            Self::Compressed { compression, layout } => write!(f, "{compression} ({layout})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_bits() {
        assert_eq!(PixelDataType::UInt8.bits(), 8);
        assert_eq!(PixelDataType::SNorm16.bits(), 16);
        assert_eq!(PixelDataType::F16.bits(), 16);
        assert_eq!(PixelDataType::F32.byte_width(), 4);
        assert_eq!(PixelDataType::UNorm64.byte_width(), 8);
    }

    #[test]
    fn test_all_table_matches_index() {
        for (i, ty) in PixelDataType::ALL.iter().enumerate() {
            assert_eq!(ty.index(), i);
        }
    }

    #[test]
    fn test_normalized_shares_storage() {
        for ty in PixelDataType::ALL {
            let storage = ty.storage_type();
            assert_eq!(storage.bits(), ty.bits());
            assert_eq!(storage.is_signed(), ty.is_signed());
            assert!(!storage.is_normalized());
        }
    }

    #[test]
    fn test_integer_limits() {
        assert_eq!(PixelDataType::max_unsigned(8), 255);
        assert_eq!(PixelDataType::max_signed(8), 127);
        assert_eq!(PixelDataType::min_signed(8), -128);
        assert_eq!(PixelDataType::max_unsigned(64), u64::MAX);
        assert_eq!(PixelDataType::max_signed(64), i64::MAX);
        assert_eq!(PixelDataType::min_signed(64), i64::MIN);
    }

    #[test]
    fn test_layout_channels() {
        assert_eq!(ElementLayout::Bgra.position(Channel::R), Some(2));
        assert_eq!(ElementLayout::Rg.position(Channel::B), None);
        assert!(ElementLayout::Bgra.has_alpha());
        assert!(!ElementLayout::Rgb.has_alpha());
    }

    #[test]
    fn test_block_bytes() {
        assert_eq!(Compression::Bc1.block_bytes(), 8);
        assert_eq!(Compression::Bc4.block_bytes(), 8);
        assert_eq!(Compression::Bc3.block_bytes(), 16);
        assert_eq!(Compression::Bc7.block_bytes(), 16);
        assert_eq!(Compression::None.block_bytes(), 0);
    }

    #[test]
    fn test_compressed_layouts() {
        assert!(Compression::Bc1.accepts_layout(ElementLayout::Rgba));
        assert!(Compression::Bc1.accepts_layout(ElementLayout::Rgb));
        assert!(!Compression::Bc4.accepts_layout(ElementLayout::Rg));
        assert!(Compression::Bc5.accepts_layout(ElementLayout::Rg));
    }

    #[test]
    fn test_pixel_format_accessors() {
        let fmt = PixelFormat::uncompressed(ElementLayout::Rgb, PixelDataType::F16);
        assert_eq!(fmt.element_size(), Some(6));
        assert_eq!(fmt.compression(), Compression::None);

        let bc = PixelFormat::compressed(Compression::Bc5);
        assert_eq!(bc.pixel_type(), None);
        assert_eq!(bc.layout(), ElementLayout::Rg);
        assert_eq!(bc.element_size(), None);
    }
}
