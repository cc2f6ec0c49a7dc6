//! Error types for BYAML decoding, encoding and XML conversion.

use std::fmt;

use thiserror::Error;

/// Which pool an out-of-range index pointed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// Object key names.
    Names,
    /// String values.
    Strings,
    /// Path data blobs.
    Paths,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PoolKind::Names => "name table",
            PoolKind::Strings => "string table",
            PoolKind::Paths => "path table",
        })
    }
}

/// Errors that can occur when working with BYAML data.
#[derive(Debug, Error)]
pub enum Error {
    /// Reader error, usually an offset or length past the end of the data.
    #[error("{0}")]
    Common(#[from] byaml_common::Error),

    /// Invalid magic bytes (not a BYAML file).
    #[error("invalid BYAML magic: expected 'BY' or 'YB', got {actual:?}")]
    InvalidMagic { actual: Vec<u8> },

    /// Structurally invalid input: unknown node type, bad root, unparsable XML leaf.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Pool index past the end of its pool.
    #[error("{kind} index {index} out of range ({len} entries)")]
    OutOfRange {
        kind: PoolKind,
        index: u32,
        len: usize,
    },

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization error.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedInput(message.into())
    }

    /// Whether this error is a reference past the bounds of a pool or of the data.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Error::OutOfRange { .. }
                | Error::Common(byaml_common::Error::UnexpectedEof { .. })
                | Error::Common(byaml_common::Error::MissingNullTerminator { .. })
        )
    }

    /// Whether this error is malformed input.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedInput(_) | Error::InvalidMagic { .. })
    }
}

/// Result type for BYAML operations.
pub type Result<T> = std::result::Result<T, Error>;
