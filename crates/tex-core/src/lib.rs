//! # tex-core
//!
//! Core types for in-memory textures.
//!
//! This crate provides the data model shared by every tex-rs crate:
//!
//! - [`PixelDataType`] - Scalar element kinds (integers, normalized integers, floats)
//! - [`convert_sample`], [`convert_elements`] - Exact conversion between any two kinds
//! - [`PixelFormat`] - Element layout plus pixel type, or a block compression kind
//! - [`ImageDescriptor`] - Texture metadata and per-mip byte layout
//! - [`Image`] - Descriptor plus owned pixel buffer with raw level access
//!
//! ## Texture Model
//!
//! A texture is 1D, 2D, 3D or a cubemap, optionally an array, with a mip
//! chain. All pixel data lives in one buffer: array layers outer, mip
//! levels inner, no padding. Cubemaps contribute six layers per cube.
//!
//! ```
//! use tex_core::prelude::*;
//!
//! let desc = ImageDescriptor::new(
//!     ImageKind::Image2D, 64, 64, 1, 1, 7,
//!     PixelFormat::uncompressed(ElementLayout::Rgba, PixelDataType::UNorm8),
//! ).unwrap();
//! assert_eq!(desc.layer_size(), 21844);
//! ```
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. The codec crate builds on it:
//!
//! ```text
//! tex-core (this crate)
//!    ^
//!    |
//!    +-- tex-io (DDS container, delegated bitmap/HDR codecs, facade)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod convert;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod image;

// Re-exports for convenience
pub use convert::{
    convert_buffer, convert_elements, convert_sample, read_sample, write_sample, Sample,
};
pub use descriptor::{
    compute_layout, level_size, max_mip_count, mip_extent, ImageDescriptor, ImageKind, MipLayout,
    MAX_MIP_COUNT,
};
pub use error::{Error, Result};
pub use format::*;
pub use image::Image;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use tex_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::convert::{convert_buffer, convert_sample, Sample};
    pub use crate::descriptor::{ImageDescriptor, ImageKind};
    pub use crate::error::{Error, Result};
    pub use crate::format::{Channel, Compression, ElementLayout, PixelDataType, PixelFormat};
    pub use crate::image::Image;
}
