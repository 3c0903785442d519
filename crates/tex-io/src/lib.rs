//! # tex-io
//!
//! Texture I/O for tex-rs.
//!
//! This crate reads and writes [`tex_core::Image`] values:
//!
//! - **DDS** - Container codec for every kind, array, mip chain and block
//!   format a descriptor can express
//! - **PNG** - Lossless, 8/16-bit
//! - **JPEG** - Lossy, 8-bit
//! - **BMP / TGA / GIF** - Legacy bitmaps (GIF read-only)
//! - **PSD** - Photoshop composite (read-only)
//! - **HDR** - Radiance RGBE
//! - **EXR** - OpenEXR, half or float
//!
//! # Architecture
//!
//! - [`read`] / [`write`] - Path-based entry points, format from extension
//! - [`read_from_memory`] / [`write_to_memory`] - Byte-based entry points
//! - [`validate_format`] - Capability check run before any bytes are written
//! - [`dds`] - Hand-written container codec
//! - Delegated codecs wrap third-party crates and exchange a [`RawImage2D`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tex_io::{read, write};
//!
//! let image = read("albedo.dds")?;
//! write("albedo.png", &image)?;
//! ```
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Types | Shape |
//! |--------|------|-------|-------|-------|
//! | DDS | Yes | Yes | all, BC1-BC7 | 1D/2D/3D/cube, arrays, mips |
//! | PNG | Yes | Yes | unorm8, unorm16 | 2D |
//! | JPEG | Yes | Yes | unorm8 | 2D, R or RGB |
//! | BMP/TGA | Yes | Yes | unorm8 | 2D, RGB or RGBA |
//! | GIF/PSD | Yes | No | unorm8 | 2D |
//! | HDR | Yes | Yes | f32 | 2D, RGB |
//! | EXR | Yes | Yes | f16, f32 | 2D |
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `jpeg` - JPEG support (default)
//! - `bitmap` - BMP, TGA and GIF support (default)
//! - `psd` - PSD support (default)
//! - `hdr` - Radiance HDR support (default)
//! - `exr` - OpenEXR support (default)
//!
//! A format whose feature is off reports [`IoError::UnsupportedFormat`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod caps;
pub mod dds;
pub mod detect;
pub mod raw;

#[cfg(feature = "exr")]
pub mod exr;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

#[cfg(feature = "bitmap")]
pub mod bitmap;

#[cfg(feature = "psd")]
pub mod psd;

#[cfg(feature = "hdr")]
pub mod hdr;

pub use caps::{validate_format, FormatCaps};
pub use dds::DdsWriterOptions;
pub use detect::Format;
pub use error::{IoError, IoResult, Stage};
pub use raw::RawImage2D;

#[cfg(feature = "jpeg")]
pub use jpeg::JpegWriterOptions;
#[cfg(feature = "png")]
pub use png::PngWriterOptions;

use std::path::Path;
use tex_core::Image;
use tracing::debug;

/// Options for [`read_with_options`].
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Format to decode as. Inferred from the extension when `None`.
    pub format: Option<Format>,
}

/// Options for [`write_with_options`] and [`write_to_memory`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Format to encode as. Inferred from the extension when `None`.
    pub format: Option<Format>,
    /// JPEG encoder settings.
    #[cfg(feature = "jpeg")]
    pub jpeg: JpegWriterOptions,
    /// PNG encoder settings.
    #[cfg(feature = "png")]
    pub png: PngWriterOptions,
    /// DDS writer settings.
    pub dds: DdsWriterOptions,
}

fn format_for_path(path: &Path, explicit: Option<Format>) -> IoResult<Format> {
    explicit
        .or_else(|| Format::from_extension(path))
        .ok_or_else(|| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string();
            IoError::UnsupportedFormat(ext).with_context(path, Stage::FormatValidation)
        })
}

fn attach(path: &Path) -> impl FnOnce(IoError) -> IoError + '_ {
    move |err| {
        let stage = err.stage();
        err.with_context(path, stage)
    }
}

/// Reads an image from a file, detecting the format by extension.
///
/// # Example
///
/// ```rust,ignore
/// use tex_io::read;
///
/// let image = read("skybox.dds")?;
/// println!("{}", image.descriptor());
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The extension is not recognised or its codec is disabled
/// - The file cannot be read
/// - The data is malformed
///
/// Every error carries the path and the failed [`Stage`].
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    read_with_options(path, &ReadOptions::default())
}

/// Reads an image from a file with explicit options.
pub fn read_with_options<P: AsRef<Path>>(path: P, options: &ReadOptions) -> IoResult<Image> {
    let path = path.as_ref();
    let format = format_for_path(path, options.format)?;
    debug!(%format, path = %path.display(), "read");

    let bytes =
        std::fs::read(path).map_err(|e| IoError::Io(e).with_context(path, Stage::FileAccess))?;
    decode_as(&bytes, format).map_err(attach(path))
}

/// Reads an image from memory.
///
/// Without an explicit format the leading bytes are sniffed; TGA has no
/// signature and always needs `Some(Format::Tga)`.
pub fn read_from_memory(bytes: &[u8], format: Option<Format>) -> IoResult<Image> {
    let format = format
        .or_else(|| Format::from_bytes(bytes))
        .ok_or_else(|| IoError::UnsupportedFormat("unrecognised image data".into()))?;
    debug!(%format, len = bytes.len(), "read from memory");
    decode_as(bytes, format)
}

fn decode_as(bytes: &[u8], format: Format) -> IoResult<Image> {
    let image = match format {
        Format::Dds => dds::read_from_memory(bytes),

        #[cfg(feature = "png")]
        Format::Png => png::read_from_memory(bytes),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read_from_memory(bytes),

        #[cfg(feature = "bitmap")]
        Format::Bmp | Format::Tga | Format::Gif => bitmap::read_from_memory(bytes, format),

        #[cfg(feature = "psd")]
        Format::Psd => psd::read_from_memory(bytes),

        #[cfg(feature = "hdr")]
        Format::Hdr => hdr::read_from_memory(bytes),

        #[cfg(feature = "exr")]
        Format::Exr => exr::read_from_memory(bytes),

        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{other} support is not enabled"
        ))),
    }?;
    debug!(%format, desc = %image.descriptor(), "decoded");
    Ok(image)
}

/// Writes an image to a file, detecting the format by extension.
///
/// # Example
///
/// ```rust,ignore
/// use tex_io::{read, write};
///
/// let image = read("input.exr")?;
/// write("output.dds", &image)?;
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The extension is not recognised or its codec is disabled
/// - The descriptor is not representable in the format
/// - Encoding or the file write fails
///
/// Nothing is created on disk unless encoding succeeded.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    write_with_options(path, image, &WriteOptions::default())
}

/// Writes an image to a file with explicit options.
pub fn write_with_options<P: AsRef<Path>>(
    path: P,
    image: &Image,
    options: &WriteOptions,
) -> IoResult<()> {
    let path = path.as_ref();
    let format = format_for_path(path, options.format)?;
    debug!(%format, path = %path.display(), desc = %image.descriptor(), "write");

    let bytes = write_to_memory(image, format, options).map_err(attach(path))?;
    std::fs::write(path, bytes).map_err(|e| IoError::Io(e).with_context(path, Stage::FileAccess))
}

/// Serializes an image to memory in the given format.
///
/// The descriptor is checked with [`validate_format`] first.
pub fn write_to_memory(image: &Image, format: Format, options: &WriteOptions) -> IoResult<Vec<u8>> {
    validate_format(image.descriptor(), format)?;

    match format {
        Format::Dds => dds::write_to_memory(image, &options.dds),

        #[cfg(feature = "png")]
        Format::Png => png::write_to_memory(image, &options.png),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::write_to_memory(image, &options.jpeg),

        #[cfg(feature = "bitmap")]
        Format::Bmp | Format::Tga => bitmap::write_to_memory(image, format),

        #[cfg(feature = "hdr")]
        Format::Hdr => hdr::write_to_memory(image),

        #[cfg(feature = "exr")]
        Format::Exr => exr::write_to_memory(image),

        other => Err(IoError::Unsupported(format!("{other}: format is read-only"))),
    }
}

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        read, read_from_memory, read_with_options, validate_format, write, write_to_memory,
        write_with_options, Format, IoError, IoResult, ReadOptions, Stage, WriteOptions,
    };
    pub use tex_core::prelude::*;
}
