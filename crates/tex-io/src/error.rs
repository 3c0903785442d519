//! Error types for I/O operations.
//!
//! Every failure carries enough to tell which step broke: container
//! parsing errors name the [`Stage`], collaborator failures are wrapped
//! rather than flattened, and the facade attaches the original path.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Processing step in which an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Magic and fixed header of the container.
    ContainerParse,
    /// Extended (DX10) header block.
    ExtendedHeader,
    /// Copying level payloads in or out of the container.
    PayloadCopy,
    /// Capability check against the target format.
    FormatValidation,
    /// Delegated decoder.
    Decode,
    /// Delegated encoder.
    Encode,
    /// Opening, reading or writing the file.
    FileAccess,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ContainerParse => "container parse",
            Self::ExtendedHeader => "extended header",
            Self::PayloadCopy => "payload copy",
            Self::FormatValidation => "format validation",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::FileAccess => "file access",
        })
    }
}

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// Container magic does not match.
    #[error("bad magic 0x{0:08x}")]
    BadMagic(u32),

    /// Input ends before the header or payload does.
    #[error("truncated input during {stage}: need {needed} bytes, have {available}")]
    Truncated {
        /// Where the shortfall was found.
        stage: Stage,
        /// Bytes required.
        needed: usize,
        /// Bytes present.
        available: usize,
    },

    /// Extension or format tag not recognized, or its feature is disabled.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Descriptor not representable in the target format.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Header fields describe an impossible image.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Pixel buffer allocation failed.
    #[error("failed to allocate {requested} bytes")]
    AllocationFailed {
        /// Bytes requested.
        requested: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error from the texture data model.
    #[error(transparent)]
    Core(tex_core::Error),

    /// Delegated decoder failure.
    #[error("{stage} error: {message}")]
    Decode {
        /// Stage, usually [`Stage::Decode`].
        stage: Stage,
        /// Decoder message.
        message: String,
    },

    /// Delegated encoder failure.
    #[error("{stage} error: {message}")]
    Encode {
        /// Stage, usually [`Stage::Encode`].
        stage: Stage,
        /// Encoder message.
        message: String,
    },

    /// Failure annotated with the file path and stage.
    #[error("{}: {stage} failed: {source}", path.display())]
    Context {
        /// Original path.
        path: PathBuf,
        /// Stage at which it failed.
        stage: Stage,
        /// Underlying error.
        #[source]
        source: Box<IoError>,
    },
}

impl From<tex_core::Error> for IoError {
    fn from(err: tex_core::Error) -> Self {
        match err {
            tex_core::Error::InvalidDescriptor { reason } => Self::InvalidDescriptor(reason),
            tex_core::Error::AllocationFailed { requested, .. } => {
                Self::AllocationFailed { requested }
            }
            other => Self::Core(other),
        }
    }
}

impl IoError {
    /// Creates a [`IoError::Decode`] error at [`Stage::Decode`].
    pub fn decode(message: impl fmt::Display) -> Self {
        Self::Decode {
            stage: Stage::Decode,
            message: message.to_string(),
        }
    }

    /// Creates a [`IoError::Encode`] error at [`Stage::Encode`].
    pub fn encode(message: impl fmt::Display) -> Self {
        Self::Encode {
            stage: Stage::Encode,
            message: message.to_string(),
        }
    }

    /// Creates a [`IoError::Truncated`] error.
    pub fn truncated(stage: Stage, needed: usize, available: usize) -> Self {
        Self::Truncated {
            stage,
            needed,
            available,
        }
    }

    /// Attaches a path and stage.
    pub fn with_context(self, path: impl Into<PathBuf>, stage: Stage) -> Self {
        Self::Context {
            path: path.into(),
            stage,
            source: Box::new(self),
        }
    }

    /// Stage inferred from the error itself, used when attaching context.
    pub fn stage(&self) -> Stage {
        match self {
            Self::BadMagic(_) | Self::InvalidDescriptor(_) | Self::AllocationFailed { .. } => {
                Stage::ContainerParse
            }
            Self::Truncated { stage, .. }
            | Self::Decode { stage, .. }
            | Self::Encode { stage, .. }
            | Self::Context { stage, .. } => *stage,
            Self::UnsupportedFormat(_) | Self::Unsupported(_) => Stage::FormatValidation,
            Self::Io(_) => Stage::FileAccess,
            Self::Core(_) => Stage::PayloadCopy,
        }
    }

    /// Innermost error under any [`IoError::Context`] wrappers.
    pub fn root(&self) -> &IoError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::ContainerParse.to_string(), "container parse");
        assert_eq!(Stage::ExtendedHeader.to_string(), "extended header");
        assert_eq!(Stage::FormatValidation.to_string(), "format validation");
    }

    #[test]
    fn test_truncated_message() {
        let err = IoError::truncated(Stage::PayloadCopy, 100, 40);
        assert_eq!(
            err.to_string(),
            "truncated input during payload copy: need 100 bytes, have 40"
        );
    }

    #[test]
    fn test_context_names_path_and_stage() {
        let err = IoError::BadMagic(0x1234).with_context("/tmp/a.dds", Stage::ContainerParse);
        let msg = err.to_string();
        assert!(msg.contains("/tmp/a.dds"));
        assert!(msg.contains("container parse"));
        assert!(matches!(err.root(), IoError::BadMagic(0x1234)));
    }

    #[test]
    fn test_core_error_mapping() {
        let err: IoError =
            tex_core::Error::invalid_descriptor("mip count must be at least 1").into();
        assert!(matches!(err, IoError::InvalidDescriptor(_)));

        let err: IoError = tex_core::Error::NotAllocated.into();
        assert!(matches!(err, IoError::Core(tex_core::Error::NotAllocated)));
    }
}
