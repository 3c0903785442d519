//! Error types for tex-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers failures detected while building image
//! descriptors, allocating pixel storage and accessing raw levels:
//! - Descriptor validation (zero mip/array counts, bad format pairings)
//! - Allocation of the pixel buffer
//! - Layer/mip bounds checks and raw-level size checks
//!
//! # Usage
//!
//! ```rust
//! use tex_core::{Error, Result};
//!
//! fn check_mips(mip_count: u32) -> Result<()> {
//!     if mip_count == 0 {
//!         return Err(Error::invalid_descriptor("mip count must be at least 1"));
//!     }
//!     Ok(())
//! }
//! assert!(check_mips(0).is_err());
//! ```

use crate::format::Compression;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the texture data model.
///
/// # Categories
///
/// - **Descriptor errors**: [`InvalidDescriptor`](Error::InvalidDescriptor)
/// - **Allocation errors**: [`AllocationFailed`](Error::AllocationFailed)
/// - **Bounds errors**: [`LayerOutOfRange`](Error::LayerOutOfRange),
///   [`MipOutOfRange`](Error::MipOutOfRange)
/// - **Raw access errors**: [`SizeMismatch`](Error::SizeMismatch),
///   [`CompressionMismatch`](Error::CompressionMismatch)
#[derive(Debug, Error)]
pub enum Error {
    /// Descriptor fields are inconsistent or out of range.
    ///
    /// Returned for zero mip or array counts, a pixel type on a block
    /// compressed format, a layout the block format cannot decode to, or a
    /// size that overflows.
    #[error("invalid descriptor: {reason}")]
    InvalidDescriptor {
        /// What is wrong with the descriptor
        reason: String,
    },

    /// The pixel buffer could not be allocated.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// Array layer index is past the last layer (faces included).
    #[error("layer {layer} out of range ({count} layers)")]
    LayerOutOfRange {
        /// Requested layer
        layer: u32,
        /// Number of layers
        count: u32,
    },

    /// Mip level index is past the last level.
    #[error("mip {mip} out of range ({count} levels)")]
    MipOutOfRange {
        /// Requested mip
        mip: u32,
        /// Number of mip levels
        count: u32,
    },

    /// A raw level buffer has the wrong length.
    #[error("raw level size mismatch: expected {expected} bytes, got {got}")]
    SizeMismatch {
        /// Expected byte count
        expected: usize,
        /// Provided byte count
        got: usize,
    },

    /// Block compression of the source and the image differ.
    ///
    /// There is no implicit transcoding between block formats.
    #[error("compression mismatch: image is {expected}, data is {got}")]
    CompressionMismatch {
        /// Image compression
        expected: Compression,
        /// Source compression
        got: Compression,
    },

    /// The pixel buffer is stale: a size-affecting descriptor field changed
    /// and [`crate::Image::alloc`] has not been called since.
    #[error("pixel buffer not allocated for the current descriptor")]
    NotAllocated,
}

impl Error {
    /// Creates an [`Error::InvalidDescriptor`] error.
    #[inline]
    pub fn invalid_descriptor(reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(expected: usize, got: usize) -> Self {
        Self::SizeMismatch { expected, got }
    }

    /// Returns `true` if this is a descriptor validation error.
    #[inline]
    pub fn is_descriptor_error(&self) -> bool {
        matches!(self, Self::InvalidDescriptor { .. })
    }

    /// Returns `true` if this is a layer or mip bounds error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::LayerOutOfRange { .. } | Self::MipOutOfRange { .. })
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_descriptor() {
        let err = Error::invalid_descriptor("mip count must be at least 1");
        assert!(err.to_string().contains("mip count"));
        assert!(err.is_descriptor_error());
        assert!(!err.is_bounds_error());
    }

    #[test]
    fn test_allocation_failed() {
        let err = Error::allocation_failed(1 << 40, "out of memory");
        assert!(err.to_string().contains("out of memory"));
        assert!(err.is_allocation_error());
    }

    #[test]
    fn test_bounds() {
        let err = Error::MipOutOfRange { mip: 9, count: 3 };
        assert!(err.is_bounds_error());
        assert_eq!(err.to_string(), "mip 9 out of range (3 levels)");
    }

    #[test]
    fn test_compression_mismatch_message() {
        let err = Error::CompressionMismatch {
            expected: Compression::Bc1,
            got: Compression::Bc3,
        };
        assert_eq!(err.to_string(), "compression mismatch: image is bc1, data is bc3");
    }
}
