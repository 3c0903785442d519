//! Per-format capability table and write validation.
//!
//! Every writer checks the descriptor against its format's
//! [`FormatCaps`] before any byte is produced.
//!
//! # Example
//!
//! ```rust
//! use tex_core::{ElementLayout, ImageDescriptor, PixelDataType, PixelFormat};
//! use tex_io::{validate_format, Format};
//!
//! let desc = ImageDescriptor::new_2d(
//!     8, 8,
//!     PixelFormat::uncompressed(ElementLayout::Rgba, PixelDataType::F32),
//! ).unwrap();
//!
//! assert!(validate_format(&desc, Format::Exr).is_ok());
//! assert!(validate_format(&desc, Format::Png).is_err());
//! ```

use crate::detect::Format;
use crate::{dds, IoError, IoResult};
use tex_core::{ElementLayout, ImageDescriptor, ImageKind, PixelDataType};

/// What a format can store.
#[derive(Debug, Clone, Copy)]
pub struct FormatCaps {
    /// A decoder exists.
    pub readable: bool,
    /// An encoder exists.
    pub writable: bool,
    /// Allowed texture kinds.
    pub kinds: &'static [ImageKind],
    /// Array textures allowed.
    pub arrays: bool,
    /// More than one mip level allowed.
    pub mips: bool,
    /// Block compression allowed.
    pub compression: bool,
    /// Allowed pixel types; empty means any.
    pub pixel_types: &'static [PixelDataType],
    /// Allowed element layouts; empty means any.
    pub layouts: &'static [ElementLayout],
    /// Largest width or height.
    pub max_extent: u32,
}

const ALL_KINDS: &[ImageKind] = &[
    ImageKind::Image1D,
    ImageKind::Image2D,
    ImageKind::Image3D,
    ImageKind::Cubemap,
];
const FLAT: &[ImageKind] = &[ImageKind::Image2D];
const ANY_LAYOUT: &[ElementLayout] = &[
    ElementLayout::R,
    ElementLayout::Rg,
    ElementLayout::Rgb,
    ElementLayout::Rgba,
];

const fn flat(
    writable: bool,
    pixel_types: &'static [PixelDataType],
    layouts: &'static [ElementLayout],
    max_extent: u32,
) -> FormatCaps {
    FormatCaps {
        readable: true,
        writable,
        kinds: FLAT,
        arrays: false,
        mips: false,
        compression: false,
        pixel_types,
        layouts,
        max_extent,
    }
}

static DDS: FormatCaps = FormatCaps {
    readable: true,
    writable: true,
    kinds: ALL_KINDS,
    arrays: true,
    mips: true,
    compression: true,
    pixel_types: &[],
    layouts: &[],
    max_extent: u32::MAX,
};
static PNG: FormatCaps = flat(
    true,
    &[PixelDataType::UNorm8, PixelDataType::UNorm16],
    ANY_LAYOUT,
    u32::MAX,
);
static JPEG: FormatCaps = flat(
    true,
    &[PixelDataType::UNorm8],
    &[ElementLayout::R, ElementLayout::Rgb],
    65535,
);
static BMP_TGA: FormatCaps = flat(
    true,
    &[PixelDataType::UNorm8],
    &[ElementLayout::Rgb, ElementLayout::Rgba],
    65535,
);
static READ_ONLY: FormatCaps = flat(false, &[], &[], u32::MAX);
static HDR: FormatCaps = flat(true, &[PixelDataType::F32], &[ElementLayout::Rgb], u32::MAX);
static EXR: FormatCaps = flat(
    true,
    &[PixelDataType::F16, PixelDataType::F32],
    ANY_LAYOUT,
    u32::MAX,
);

impl FormatCaps {
    /// Static capability entry of `format`.
    pub fn of(format: Format) -> &'static FormatCaps {
        match format {
            Format::Dds => &DDS,
            Format::Png => &PNG,
            Format::Jpeg => &JPEG,
            Format::Bmp | Format::Tga => &BMP_TGA,
            Format::Gif | Format::Psd => &READ_ONLY,
            Format::Hdr => &HDR,
            Format::Exr => &EXR,
        }
    }
}

/// Checks that `desc` can be written as `format`.
///
/// # Errors
///
/// [`IoError::UnsupportedFormat`] if the format's codec is not compiled
/// in, [`IoError::Unsupported`] naming the first violated capability.
pub fn validate_format(desc: &ImageDescriptor, format: Format) -> IoResult<()> {
    if !format.is_enabled() {
        return Err(IoError::UnsupportedFormat(format!(
            "{format} support is not enabled"
        )));
    }
    let caps = FormatCaps::of(format);
    let reject = |reason: String| Err(IoError::Unsupported(format!("{format}: {reason}")));

    if !caps.writable {
        return reject("format is read-only".into());
    }
    if !caps.kinds.contains(&desc.kind()) {
        return reject(format!("{} textures not supported", desc.kind()));
    }
    if desc.is_array() && !caps.arrays {
        return reject(format!("array textures not supported (array count {})", desc.array_count()));
    }
    if desc.mip_count() > 1 && !caps.mips {
        return reject(format!("mipmaps not supported ({} levels)", desc.mip_count()));
    }
    if desc.width().max(desc.height()) > caps.max_extent {
        return reject(format!("extent exceeds {}", caps.max_extent));
    }

    match desc.pixel_type() {
        None if !caps.compression => {
            return reject(format!("{} compression not supported", desc.compression()));
        }
        Some(ty) if !caps.pixel_types.is_empty() && !caps.pixel_types.contains(&ty) => {
            return reject(format!("pixel type {ty} not supported"));
        }
        _ => {}
    }
    let layout = desc.element_layout();
    if desc.pixel_type().is_some() && !caps.layouts.is_empty() && !caps.layouts.contains(&layout) {
        return reject(format!("element layout {layout} not supported"));
    }

    if format == Format::Dds {
        dds::check_representable(desc)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tex_core::{Compression, PixelFormat};

    fn desc(kind: ImageKind, array: u32, mips: u32, format: PixelFormat) -> ImageDescriptor {
        ImageDescriptor::new(kind, 16, 16, 4, array, mips, format).unwrap()
    }

    fn fmt(layout: ElementLayout, ty: PixelDataType) -> PixelFormat {
        PixelFormat::uncompressed(layout, ty)
    }

    #[test]
    fn test_png_rules() {
        let ok = desc(ImageKind::Image2D, 1, 1, fmt(ElementLayout::Rg, PixelDataType::UNorm16));
        assert!(validate_format(&ok, Format::Png).is_ok());

        let float = desc(ImageKind::Image2D, 1, 1, fmt(ElementLayout::Rgba, PixelDataType::F32));
        assert!(matches!(validate_format(&float, Format::Png), Err(IoError::Unsupported(_))));

        let mips = desc(ImageKind::Image2D, 1, 3, fmt(ElementLayout::Rgba, PixelDataType::UNorm8));
        assert!(validate_format(&mips, Format::Png).is_err());

        let bc = desc(ImageKind::Image2D, 1, 1, PixelFormat::compressed(Compression::Bc1));
        assert!(validate_format(&bc, Format::Png).is_err());
    }

    #[test]
    fn test_read_only() {
        let d = desc(ImageKind::Image2D, 1, 1, fmt(ElementLayout::Rgba, PixelDataType::UNorm8));
        for format in [Format::Gif, Format::Psd] {
            let err = validate_format(&d, format).unwrap_err();
            assert!(err.to_string().contains("read-only"));
        }
    }

    #[test]
    fn test_jpeg_rejects_alpha() {
        let d = desc(ImageKind::Image2D, 1, 1, fmt(ElementLayout::Rgba, PixelDataType::UNorm8));
        assert!(validate_format(&d, Format::Jpeg).is_err());
    }

    #[test]
    fn test_dds_rejects_volume_arrays() {
        let d = desc(ImageKind::Image3D, 2, 1, fmt(ElementLayout::Rgba, PixelDataType::F32));
        assert!(matches!(validate_format(&d, Format::Dds), Err(IoError::Unsupported(_))));
    }

    #[test]
    fn test_dds_accepts_cube_arrays() {
        let d = desc(ImageKind::Cubemap, 3, 5, PixelFormat::compressed(Compression::Bc7));
        assert!(validate_format(&d, Format::Dds).is_ok());
    }

    #[test]
    fn test_dds_rejects_unmapped_formats() {
        let d = desc(ImageKind::Image2D, 1, 1, fmt(ElementLayout::Rgb, PixelDataType::UNorm8));
        assert!(validate_format(&d, Format::Dds).is_err());
    }
}
