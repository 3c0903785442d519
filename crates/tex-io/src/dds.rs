//! DirectDraw Surface (DDS) container support.
//!
//! DDS stores GPU textures with their full shape: 1D/2D/3D images,
//! cubemaps, arrays, mip chains, uncompressed and BC-compressed texels.
//! This is the only format that round-trips every [`ImageDescriptor`].
//!
//! # Layout
//!
//! ```text
//! "DDS " | header (124 bytes, incl. 32-byte pixel format) | [DX10 block (20 bytes)] | payload
//! ```
//!
//! The DX10 block is present iff the pixel format's FourCC is `DX10`.
//! Payload is layer-major then mip-major, except 3D textures with more
//! than one mip, which are mip-major then depth-slice-major.
//!
//! # Features
//!
//! - Reads DX10 headers and legacy FourCC, D3DFMT and RGB-mask headers
//! - Always writes DX10 headers
//! - BC1-BC7 payloads are copied, never decoded
//!
//! # Example
//!
//! ```rust,ignore
//! use tex_io::dds::{read_from_memory, read_header, write_to_memory, DdsWriterOptions};
//!
//! let header = read_header(&bytes)?;
//! println!("{}x{}", header.legacy().width, header.legacy().height);
//!
//! let image = read_from_memory(&bytes)?;
//! let out = write_to_memory(&image, &DdsWriterOptions::default())?;
//! ```

use crate::error::Stage;
use crate::{IoError, IoResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ddsfile::{DxgiFormat, FourCC};
use std::io::Cursor;
use std::ops::Range;
use tex_core::{
    Compression, ElementLayout, Image, ImageDescriptor, ImageKind, PixelDataType, PixelFormat,
};
use tracing::{debug, trace, warn};

/// `"DDS "` as a little-endian word.
pub const MAGIC: u32 = 0x2053_4444;

const HEADER_SIZE: u32 = 124;
const PIXEL_FORMAT_SIZE: u32 = 32;
const EXTENDED_SIZE: usize = 20;
const LEGACY_LEN: usize = 4 + HEADER_SIZE as usize;
const EXTENDED_LEN: usize = LEGACY_LEN + EXTENDED_SIZE;

/// FourCC marking a DX10 extended header.
pub const FOURCC_DX10: u32 = FourCC::DX10;

/// Header flags (`DDSD_*`).
pub mod flags {
    /// Caps words are valid.
    pub const CAPS: u32 = 0x1;
    /// Height is valid.
    pub const HEIGHT: u32 = 0x2;
    /// Width is valid.
    pub const WIDTH: u32 = 0x4;
    /// Pitch field holds the row pitch.
    pub const PITCH: u32 = 0x8;
    /// Pixel format is valid.
    pub const PIXELFORMAT: u32 = 0x1000;
    /// Mip count is valid.
    pub const MIPMAPCOUNT: u32 = 0x20000;
    /// Pitch field holds the top-level linear size.
    pub const LINEARSIZE: u32 = 0x80000;
    /// Depth is valid.
    pub const DEPTH: u32 = 0x80_0000;
}

/// Capability words (`DDSCAPS_*`, `DDSCAPS2_*`).
pub mod caps {
    /// More than one surface.
    pub const COMPLEX: u32 = 0x8;
    /// Always set.
    pub const TEXTURE: u32 = 0x1000;
    /// Has a mip chain.
    pub const MIPMAP: u32 = 0x40_0000;
    /// Cubemap (caps2).
    pub const CUBEMAP: u32 = 0x200;
    /// All six cube faces (caps2).
    pub const ALLFACES: u32 = 0xFC00;
    /// Volume texture (caps2).
    pub const VOLUME: u32 = 0x20_0000;
}

/// Pixel format flags (`DDPF_*`).
pub mod pf {
    /// Alpha mask is valid.
    pub const ALPHAPIXELS: u32 = 0x1;
    /// Alpha-only surface.
    pub const ALPHA: u32 = 0x2;
    /// FourCC is valid.
    pub const FOURCC: u32 = 0x4;
    /// RGB masks are valid.
    pub const RGB: u32 = 0x40;
    /// Luminance surface.
    pub const LUMINANCE: u32 = 0x2_0000;
}

const DIMENSION_1D: u32 = 2;
const DIMENSION_2D: u32 = 3;
const DIMENSION_3D: u32 = 4;
const MISC_TEXTURECUBE: u32 = 0x4;
const ALPHA_MODE_MASK: u32 = 0x7;
const ALPHA_MODE_STRAIGHT: u32 = 1;
const ALPHA_MODE_OPAQUE: u32 = 3;

/// Legacy pixel format sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyPixelFormat {
    /// Structure size, 32.
    pub size: u32,
    /// `DDPF_*` flags.
    pub flags: u32,
    /// Compression code or D3DFMT number.
    pub fourcc: u32,
    /// Bits per pixel for RGB/luminance formats.
    pub rgb_bit_count: u32,
    /// Red (or luminance) mask.
    pub r_mask: u32,
    /// Green mask.
    pub g_mask: u32,
    /// Blue mask.
    pub b_mask: u32,
    /// Alpha mask.
    pub a_mask: u32,
}

/// The fixed 124-byte header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyHeader {
    /// Structure size, 124.
    pub size: u32,
    /// `DDSD_*` flags.
    pub flags: u32,
    /// Base height.
    pub height: u32,
    /// Base width.
    pub width: u32,
    /// Row pitch or top-level linear size.
    pub pitch_or_linear_size: u32,
    /// Base depth for volumes.
    pub depth: u32,
    /// Number of mip levels.
    pub mip_map_count: u32,
    /// Unused.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: LegacyPixelFormat,
    /// `DDSCAPS_*`.
    pub caps: u32,
    /// `DDSCAPS2_*`.
    pub caps2: u32,
    /// Unused.
    pub caps3: u32,
    /// Unused.
    pub caps4: u32,
    /// Unused.
    pub reserved2: u32,
}

/// The 20-byte DX10 block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedHeader {
    /// DXGI format code.
    pub dxgi_format: u32,
    /// Resource dimension (2 = 1D, 3 = 2D, 4 = 3D).
    pub resource_dimension: u32,
    /// Misc flags, bit 2 marks cubemaps.
    pub misc_flag: u32,
    /// Array elements; whole cubes for cubemaps.
    pub array_size: u32,
    /// Alpha mode in the low three bits.
    pub misc_flags2: u32,
}

/// Parsed container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// No DX10 block.
    Legacy(LegacyHeader),
    /// Legacy header followed by a DX10 block.
    Extended(LegacyHeader, ExtendedHeader),
}

impl Header {
    /// The fixed header.
    pub fn legacy(&self) -> &LegacyHeader {
        match self {
            Self::Legacy(h) | Self::Extended(h, _) => h,
        }
    }

    /// The DX10 block, if present.
    pub fn extended(&self) -> Option<&ExtendedHeader> {
        match self {
            Self::Legacy(_) => None,
            Self::Extended(_, ext) => Some(ext),
        }
    }

    /// Bytes from file start to payload start.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Legacy(_) => LEGACY_LEN,
            Self::Extended(..) => EXTENDED_LEN,
        }
    }
}

/// Options for writing DDS files.
#[derive(Debug, Clone)]
pub struct DdsWriterOptions {
    /// Fill the pitch-or-linear-size field and set its flag. Default: true.
    pub write_pitch: bool,
}

impl Default for DdsWriterOptions {
    fn default() -> Self {
        Self { write_pitch: true }
    }
}

// === DXGI table ===

type D = DxgiFormat;
type L = ElementLayout;
type T = PixelDataType;

const fn u(layout: ElementLayout, ty: PixelDataType) -> PixelFormat {
    PixelFormat::uncompressed(layout, ty)
}

/// DXGI formats written for each texel format. Read accepts these plus [`DXGI_ALIASES`].
const DXGI_FORMATS: &[(DxgiFormat, PixelFormat)] = &[
    (D::R32G32B32A32_Float, u(L::Rgba, T::F32)),
    (D::R32G32B32A32_UInt, u(L::Rgba, T::UInt32)),
    (D::R32G32B32A32_SInt, u(L::Rgba, T::Int32)),
    (D::R32G32B32_Float, u(L::Rgb, T::F32)),
    (D::R32G32B32_UInt, u(L::Rgb, T::UInt32)),
    (D::R32G32B32_SInt, u(L::Rgb, T::Int32)),
    (D::R16G16B16A16_Float, u(L::Rgba, T::F16)),
    (D::R16G16B16A16_UNorm, u(L::Rgba, T::UNorm16)),
    (D::R16G16B16A16_UInt, u(L::Rgba, T::UInt16)),
    (D::R16G16B16A16_SNorm, u(L::Rgba, T::SNorm16)),
    (D::R16G16B16A16_SInt, u(L::Rgba, T::Int16)),
    (D::R32G32_Float, u(L::Rg, T::F32)),
    (D::R32G32_UInt, u(L::Rg, T::UInt32)),
    (D::R32G32_SInt, u(L::Rg, T::Int32)),
    (D::R8G8B8A8_UNorm, u(L::Rgba, T::UNorm8)),
    (D::R8G8B8A8_UInt, u(L::Rgba, T::UInt8)),
    (D::R8G8B8A8_SNorm, u(L::Rgba, T::SNorm8)),
    (D::R8G8B8A8_SInt, u(L::Rgba, T::Int8)),
    (D::R16G16_Float, u(L::Rg, T::F16)),
    (D::R16G16_UNorm, u(L::Rg, T::UNorm16)),
    (D::R16G16_UInt, u(L::Rg, T::UInt16)),
    (D::R16G16_SNorm, u(L::Rg, T::SNorm16)),
    (D::R16G16_SInt, u(L::Rg, T::Int16)),
    (D::R32_Float, u(L::R, T::F32)),
    (D::R32_UInt, u(L::R, T::UInt32)),
    (D::R32_SInt, u(L::R, T::Int32)),
    (D::R8G8_UNorm, u(L::Rg, T::UNorm8)),
    (D::R8G8_UInt, u(L::Rg, T::UInt8)),
    (D::R8G8_SNorm, u(L::Rg, T::SNorm8)),
    (D::R8G8_SInt, u(L::Rg, T::Int8)),
    (D::R16_Float, u(L::R, T::F16)),
    (D::R16_UNorm, u(L::R, T::UNorm16)),
    (D::R16_UInt, u(L::R, T::UInt16)),
    (D::R16_SNorm, u(L::R, T::SNorm16)),
    (D::R16_SInt, u(L::R, T::Int16)),
    (D::R8_UNorm, u(L::R, T::UNorm8)),
    (D::R8_UInt, u(L::R, T::UInt8)),
    (D::R8_SNorm, u(L::R, T::SNorm8)),
    (D::R8_SInt, u(L::R, T::Int8)),
    (D::BC1_UNorm, PixelFormat::compressed(Compression::Bc1)),
    (D::BC2_UNorm, PixelFormat::compressed(Compression::Bc2)),
    (D::BC3_UNorm, PixelFormat::compressed(Compression::Bc3)),
    (D::BC4_UNorm, PixelFormat::compressed(Compression::Bc4)),
    (D::BC5_UNorm, PixelFormat::compressed(Compression::Bc5)),
    (D::B8G8R8A8_UNorm, u(L::Bgra, T::UNorm8)),
    (D::BC6H_UF16, PixelFormat::compressed(Compression::Bc6h)),
    (D::BC7_UNorm, PixelFormat::compressed(Compression::Bc7)),
];

/// sRGB, signed and X-padded formats, read as their canonical sibling.
const DXGI_ALIASES: &[(DxgiFormat, DxgiFormat)] = &[
    (D::R8G8B8A8_UNorm_sRGB, D::R8G8B8A8_UNorm),
    (D::BC1_UNorm_sRGB, D::BC1_UNorm),
    (D::BC2_UNorm_sRGB, D::BC2_UNorm),
    (D::BC3_UNorm_sRGB, D::BC3_UNorm),
    (D::BC4_SNorm, D::BC4_UNorm),
    (D::BC5_SNorm, D::BC5_UNorm),
    (D::B8G8R8X8_UNorm, D::B8G8R8A8_UNorm),
    (D::B8G8R8A8_UNorm_sRGB, D::B8G8R8A8_UNorm),
    (D::BC6H_SF16, D::BC6H_UF16),
    (D::BC7_UNorm_sRGB, D::BC7_UNorm),
];

/// Texel format of a DXGI code.
pub fn format_from_dxgi(code: u32) -> Option<PixelFormat> {
    let code = DXGI_ALIASES
        .iter()
        .find(|&&(alias, _)| alias as u32 == code)
        .map_or(code, |&(_, canonical)| canonical as u32);
    DXGI_FORMATS
        .iter()
        .find(|&&(d, _)| d as u32 == code)
        .map(|&(_, f)| f)
}

/// DXGI code written for a texel format.
pub fn dxgi_from_format(format: PixelFormat) -> Option<u32> {
    DXGI_FORMATS
        .iter()
        .find(|(_, f)| match (f, format) {
            (
                PixelFormat::Compressed { compression: a, .. },
                PixelFormat::Compressed { compression: b, .. },
            ) => *a == b,
            _ => *f == format,
        })
        .map(|&(d, _)| d as u32)
}

/// Checks that `desc` has a DX10 encoding.
pub fn check_representable(desc: &ImageDescriptor) -> IoResult<()> {
    if desc.kind() == ImageKind::Image3D && desc.is_array() {
        return Err(IoError::Unsupported(format!(
            "dds: 3d textures cannot be arrays (array count {})",
            desc.array_count()
        )));
    }
    if dxgi_from_format(desc.format()).is_none() {
        return Err(IoError::Unsupported(format!(
            "dds: no DXGI format for {}",
            desc.format()
        )));
    }
    Ok(())
}

// === Header parsing ===

fn read_pixel_format(cur: &mut Cursor<&[u8]>) -> std::io::Result<LegacyPixelFormat> {
    Ok(LegacyPixelFormat {
        size: cur.read_u32::<LittleEndian>()?,
        flags: cur.read_u32::<LittleEndian>()?,
        fourcc: cur.read_u32::<LittleEndian>()?,
        rgb_bit_count: cur.read_u32::<LittleEndian>()?,
        r_mask: cur.read_u32::<LittleEndian>()?,
        g_mask: cur.read_u32::<LittleEndian>()?,
        b_mask: cur.read_u32::<LittleEndian>()?,
        a_mask: cur.read_u32::<LittleEndian>()?,
    })
}

fn read_legacy(cur: &mut Cursor<&[u8]>) -> std::io::Result<LegacyHeader> {
    let size = cur.read_u32::<LittleEndian>()?;
    let flags = cur.read_u32::<LittleEndian>()?;
    let height = cur.read_u32::<LittleEndian>()?;
    let width = cur.read_u32::<LittleEndian>()?;
    let pitch_or_linear_size = cur.read_u32::<LittleEndian>()?;
    let depth = cur.read_u32::<LittleEndian>()?;
    let mip_map_count = cur.read_u32::<LittleEndian>()?;
    let mut reserved1 = [0u32; 11];
    cur.read_u32_into::<LittleEndian>(&mut reserved1)?;
    let pixel_format = read_pixel_format(cur)?;
    Ok(LegacyHeader {
        size,
        flags,
        height,
        width,
        pitch_or_linear_size,
        depth,
        mip_map_count,
        reserved1,
        pixel_format,
        caps: cur.read_u32::<LittleEndian>()?,
        caps2: cur.read_u32::<LittleEndian>()?,
        caps3: cur.read_u32::<LittleEndian>()?,
        caps4: cur.read_u32::<LittleEndian>()?,
        reserved2: cur.read_u32::<LittleEndian>()?,
    })
}

fn read_extended(cur: &mut Cursor<&[u8]>) -> std::io::Result<ExtendedHeader> {
    Ok(ExtendedHeader {
        dxgi_format: cur.read_u32::<LittleEndian>()?,
        resource_dimension: cur.read_u32::<LittleEndian>()?,
        misc_flag: cur.read_u32::<LittleEndian>()?,
        array_size: cur.read_u32::<LittleEndian>()?,
        misc_flags2: cur.read_u32::<LittleEndian>()?,
    })
}

/// Parses magic, fixed header and, when flagged, the DX10 block.
///
/// The DX10 block is selected purely by the FourCC sentinel.
pub fn read_header(bytes: &[u8]) -> IoResult<Header> {
    if bytes.len() < 4 {
        return Err(IoError::truncated(Stage::ContainerParse, 4, bytes.len()));
    }
    let mut cur = Cursor::new(bytes);
    let magic = cur.read_u32::<LittleEndian>()?;
    if magic != MAGIC {
        return Err(IoError::BadMagic(magic));
    }
    if bytes.len() < LEGACY_LEN {
        return Err(IoError::truncated(Stage::ContainerParse, LEGACY_LEN, bytes.len()));
    }

    let legacy = read_legacy(&mut cur)?;
    if legacy.size != HEADER_SIZE {
        return Err(IoError::Decode {
            stage: Stage::ContainerParse,
            message: format!("header size {}, expected {HEADER_SIZE}", legacy.size),
        });
    }
    if legacy.pixel_format.size != PIXEL_FORMAT_SIZE {
        return Err(IoError::Decode {
            stage: Stage::ContainerParse,
            message: format!(
                "pixel format size {}, expected {PIXEL_FORMAT_SIZE}",
                legacy.pixel_format.size
            ),
        });
    }

    let pf = &legacy.pixel_format;
    // The sentinel alone decides; some writers leave DDPF_FOURCC unset.
    if pf.fourcc == FOURCC_DX10 {
        if bytes.len() < EXTENDED_LEN {
            return Err(IoError::truncated(Stage::ExtendedHeader, EXTENDED_LEN, bytes.len()));
        }
        let ext = read_extended(&mut cur)?;
        Ok(Header::Extended(legacy, ext))
    } else {
        Ok(Header::Legacy(legacy))
    }
}

// === Format resolution ===

fn extended_format(ext: &ExtendedHeader) -> IoResult<PixelFormat> {
    let format = format_from_dxgi(ext.dxgi_format).ok_or_else(|| {
        IoError::UnsupportedFormat(format!("dds: DXGI format {}", ext.dxgi_format))
    })?;
    Ok(match format {
        PixelFormat::Compressed {
            compression: Compression::Bc1,
            ..
        } => PixelFormat::Compressed {
            compression: Compression::Bc1,
            layout: match ext.misc_flags2 & ALPHA_MODE_MASK {
                0 | ALPHA_MODE_OPAQUE => ElementLayout::Rgb,
                _ => ElementLayout::Rgba,
            },
        },
        other => other,
    })
}

/// D3DFMT numbers stored in the FourCC field.
fn d3dfmt_format(code: u32) -> Option<PixelFormat> {
    use ElementLayout::*;
    use PixelDataType::*;
    let (layout, ty) = match code {
        FourCC::A16B16G16R16 => (Rgba, UNorm16),
        FourCC::Q16W16V16U16 => (Rgba, SNorm16),
        FourCC::R16F => (R, F16),
        FourCC::G16R16F => (Rg, F16),
        FourCC::A16B16G16R16F => (Rgba, F16),
        FourCC::R32F => (R, F32),
        FourCC::G32R32F => (Rg, F32),
        FourCC::A32B32G32R32F => (Rgba, F32),
        _ => return None,
    };
    Some(PixelFormat::uncompressed(layout, ty))
}

fn legacy_format(pf: &LegacyPixelFormat) -> IoResult<PixelFormat> {
    use ElementLayout::*;
    use PixelDataType::*;
    let unsupported = || {
        IoError::UnsupportedFormat(format!(
            "dds: legacy pixel format flags 0x{:x}, fourcc 0x{:08x}, {} bpp, \
             masks {:08x}/{:08x}/{:08x}/{:08x}",
            pf.flags, pf.fourcc, pf.rgb_bit_count, pf.r_mask, pf.g_mask, pf.b_mask, pf.a_mask
        ))
    };

    if pf.flags & pf::FOURCC != 0 {
        let bc1_layout = if pf.flags & pf::ALPHAPIXELS != 0 { Rgba } else { Rgb };
        let compression = match &pf.fourcc.to_le_bytes() {
            b"DXT1" => {
                return Ok(PixelFormat::Compressed {
                    compression: Compression::Bc1,
                    layout: bc1_layout,
                });
            }
            b"DXT2" | b"DXT3" => Compression::Bc2,
            b"DXT4" | b"DXT5" => Compression::Bc3,
            b"ATI1" | b"BC4U" | b"BC4S" => Compression::Bc4,
            b"ATI2" | b"BC5U" | b"BC5S" => Compression::Bc5,
            _ => return d3dfmt_format(pf.fourcc).ok_or_else(unsupported),
        };
        return Ok(PixelFormat::compressed(compression));
    }

    let masks = (pf.r_mask, pf.g_mask, pf.b_mask, pf.a_mask);
    let has_alpha = pf.flags & pf::ALPHAPIXELS != 0;
    let (layout, ty) = if pf.flags & pf::RGB != 0 {
        match (pf.rgb_bit_count, masks) {
            // X8R8G8B8 keeps its padding byte in the alpha slot.
            (32, (0xff_0000, 0xff00, 0xff, _)) => (Bgra, UNorm8),
            (32, (0xff, 0xff00, 0xff_0000, _)) => (Rgba, UNorm8),
            (32, (0xffff, 0xffff_0000, 0, 0)) => (Rg, UNorm16),
            (24, (0xff_0000, 0xff00, 0xff, 0)) => (Bgr, UNorm8),
            (24, (0xff, 0xff00, 0xff_0000, 0)) => (Rgb, UNorm8),
            _ => return Err(unsupported()),
        }
    } else if pf.flags & pf::LUMINANCE != 0 {
        match (pf.rgb_bit_count, masks) {
            (8, (0xff, 0, 0, 0)) => (R, UNorm8),
            (16, (0xffff, 0, 0, 0)) => (R, UNorm16),
            (16, (0xff, 0, 0, 0xff00)) if has_alpha => (Rg, UNorm8),
            _ => return Err(unsupported()),
        }
    } else if pf.flags & pf::ALPHA != 0 && pf.rgb_bit_count == 8 && pf.a_mask == 0xff {
        (R, UNorm8)
    } else {
        return Err(unsupported());
    };
    Ok(PixelFormat::uncompressed(layout, ty))
}

fn mip_count_of(legacy: &LegacyHeader) -> u32 {
    let count = legacy.mip_map_count.max(1);
    if count > 1 && legacy.flags & flags::MIPMAPCOUNT == 0 {
        warn!(
            mip_count = count,
            "dds header has mip count without DDSD_MIPMAPCOUNT flag"
        );
    }
    count
}

/// Builds the descriptor a header describes.
pub fn descriptor_from_header(header: &Header) -> IoResult<ImageDescriptor> {
    let legacy = header.legacy();
    let mip_count = mip_count_of(legacy);

    let (kind, array_count, format) = match header {
        Header::Extended(_, ext) => {
            let format = extended_format(ext)?;
            let kind = match ext.resource_dimension {
                DIMENSION_1D => ImageKind::Image1D,
                DIMENSION_2D if ext.misc_flag & MISC_TEXTURECUBE != 0 => ImageKind::Cubemap,
                DIMENSION_2D => ImageKind::Image2D,
                DIMENSION_3D => ImageKind::Image3D,
                other => {
                    return Err(IoError::Decode {
                        stage: Stage::ExtendedHeader,
                        message: format!("resource dimension {other}"),
                    });
                }
            };
            let array_count = if ext.array_size == 0 {
                warn!("dds DX10 array size is 0, reading as 1");
                1
            } else {
                ext.array_size
            };
            if kind == ImageKind::Image3D && array_count > 1 {
                return Err(IoError::Unsupported(format!(
                    "dds: 3d texture arrays (array size {array_count})"
                )));
            }
            (kind, array_count, format)
        }
        Header::Legacy(legacy) => {
            let format = legacy_format(&legacy.pixel_format)?;
            let kind = if legacy.caps2 & caps::CUBEMAP != 0 {
                if legacy.caps2 & caps::ALLFACES != caps::ALLFACES {
                    return Err(IoError::Unsupported(format!(
                        "dds: partial cubemap (caps2 0x{:x})",
                        legacy.caps2
                    )));
                }
                ImageKind::Cubemap
            } else if legacy.caps2 & caps::VOLUME != 0 || legacy.depth > 1 {
                ImageKind::Image3D
            } else {
                ImageKind::Image2D
            };
            (kind, 1, format)
        }
    };

    let desc = ImageDescriptor::new(
        kind,
        legacy.width,
        legacy.height,
        legacy.depth,
        array_count,
        mip_count,
        format,
    )?;
    if desc.mip_count() < mip_count {
        debug!(
            requested = mip_count,
            clamped = desc.mip_count(),
            "dds mip count clamped"
        );
    }

    if legacy.flags & flags::PITCH != 0 {
        if let Some(elem) = desc.element_size() {
            let expected = desc.width() as usize * elem;
            if legacy.pitch_or_linear_size as usize != expected {
                warn!(
                    pitch = legacy.pitch_or_linear_size,
                    expected, "dds pitch does not match width, ignoring"
                );
            }
        }
    }
    Ok(desc)
}

// === Payload ===

/// Buffer ranges in the order the container stores them.
fn payload_order(desc: &ImageDescriptor) -> IoResult<Vec<Range<usize>>> {
    let mut ranges = Vec::new();
    if desc.kind() == ImageKind::Image3D && desc.mip_count() > 1 {
        for mip in 0..desc.mip_count() {
            let depth = desc.mip_depth(mip) as usize;
            let slice = desc.mip_size(mip) / depth;
            for layer in 0..desc.layer_count() {
                let level = desc.level_range(layer, mip)?;
                for z in 0..depth {
                    let start = level.start + z * slice;
                    ranges.push(start..start + slice);
                }
            }
        }
    } else {
        for layer in 0..desc.layer_count() {
            for mip in 0..desc.mip_count() {
                ranges.push(desc.level_range(layer, mip)?);
            }
        }
    }
    Ok(ranges)
}

/// Reads a DDS image from memory.
///
/// Bytes past the last level are ignored.
pub fn read_from_memory(bytes: &[u8]) -> IoResult<Image> {
    let header = read_header(bytes)?;
    let desc = descriptor_from_header(&header)?;
    debug!(
        kind = %desc.kind(),
        width = desc.width(),
        height = desc.height(),
        depth = desc.depth(),
        array = desc.array_count(),
        mips = desc.mip_count(),
        format = %desc.format(),
        "dds read"
    );

    let payload = &bytes[header.byte_len()..];
    let needed = desc.total_size();
    if payload.len() < needed {
        return Err(IoError::truncated(
            Stage::PayloadCopy,
            header.byte_len() + needed,
            bytes.len(),
        ));
    }

    let order = payload_order(&desc)?;
    let mut image = Image::new(desc)?;
    let data = image.data_mut();
    let mut offset = 0;
    for range in order {
        let len = range.len();
        trace!(offset, len, "dds payload copy");
        data[range].copy_from_slice(&payload[offset..offset + len]);
        offset += len;
    }
    Ok(image)
}

fn write_header(
    out: &mut Vec<u8>,
    desc: &ImageDescriptor,
    options: &DdsWriterOptions,
) -> IoResult<()> {
    let dxgi = dxgi_from_format(desc.format()).ok_or_else(|| {
        IoError::Unsupported(format!("dds: no DXGI format for {}", desc.format()))
    })?;

    let mut hflags = flags::CAPS | flags::HEIGHT | flags::WIDTH | flags::PIXELFORMAT;
    let mut caps1 = caps::TEXTURE;
    let mut caps2 = 0;
    if desc.mip_count() > 1 {
        hflags |= flags::MIPMAPCOUNT;
        caps1 |= caps::COMPLEX | caps::MIPMAP;
    }
    match desc.kind() {
        ImageKind::Cubemap => {
            caps1 |= caps::COMPLEX;
            caps2 |= caps::CUBEMAP | caps::ALLFACES;
        }
        ImageKind::Image3D => {
            hflags |= flags::DEPTH;
            caps1 |= caps::COMPLEX;
            caps2 |= caps::VOLUME;
        }
        _ => {}
    }
    let mut pitch = 0;
    if options.write_pitch {
        match desc.element_size() {
            Some(elem) => {
                hflags |= flags::PITCH;
                pitch = desc.width() as usize * elem;
            }
            None => {
                hflags |= flags::LINEARSIZE;
                pitch = desc.mip_size(0) / desc.depth() as usize;
            }
        }
    }
    let pitch = u32::try_from(pitch)
        .map_err(|_| IoError::Unsupported(format!("dds: pitch {pitch} exceeds 32 bits")))?;

    let (dimension, misc_flag) = match desc.kind() {
        ImageKind::Image1D => (DIMENSION_1D, 0),
        ImageKind::Image2D => (DIMENSION_2D, 0),
        ImageKind::Cubemap => (DIMENSION_2D, MISC_TEXTURECUBE),
        ImageKind::Image3D => (DIMENSION_3D, 0),
    };
    let alpha_mode = if desc.element_layout().has_alpha() {
        ALPHA_MODE_STRAIGHT
    } else {
        ALPHA_MODE_OPAQUE
    };

    let words = [
        MAGIC,
        HEADER_SIZE,
        hflags,
        desc.height(),
        desc.width(),
        pitch,
        desc.depth(),
        desc.mip_count(),
    ];
    for w in words {
        out.write_u32::<LittleEndian>(w)?;
    }
    for _ in 0..11 {
        out.write_u32::<LittleEndian>(0)?;
    }
    let pixel_format = [PIXEL_FORMAT_SIZE, pf::FOURCC, FOURCC_DX10, 0, 0, 0, 0, 0];
    let tail = [caps1, caps2, 0, 0, 0];
    let extended = [dxgi, dimension, misc_flag, desc.array_count(), alpha_mode];
    for w in pixel_format.into_iter().chain(tail).chain(extended) {
        out.write_u32::<LittleEndian>(w)?;
    }
    Ok(())
}

/// Serializes an image as DDS with a DX10 header.
///
/// Validation happens before any output is produced.
pub fn write_to_memory(image: &Image, options: &DdsWriterOptions) -> IoResult<Vec<u8>> {
    let desc = image.descriptor();
    check_representable(desc)?;
    if !image.is_allocated() {
        return Err(tex_core::Error::NotAllocated.into());
    }

    let order = payload_order(desc)?;
    let mut out = Vec::new();
    out.try_reserve_exact(EXTENDED_LEN + desc.total_size())
        .map_err(|_| IoError::AllocationFailed {
            requested: EXTENDED_LEN + desc.total_size(),
        })?;
    write_header(&mut out, desc, options)?;

    let data = image.data();
    for range in order {
        trace!(start = range.start, len = range.len(), "dds payload write");
        out.extend_from_slice(&data[range]);
    }
    Ok(out)
}
