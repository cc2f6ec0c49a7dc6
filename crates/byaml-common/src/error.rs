//! Error types for byaml-common.

use thiserror::Error;

/// Common error type for binary reading and writing.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at offset {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Missing null terminator in string.
    #[error("string at offset {offset:#x} is missing its null terminator")]
    MissingNullTerminator { offset: usize },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
