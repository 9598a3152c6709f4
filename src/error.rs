//! # Error Types
//!
//! Error handling for the attribute codec.
//!
//! Every decode failure is fatal for the enclosing frame: the codec never hands back a
//! partially decoded container, and callers are expected to treat the whole message as
//! corrupt. Encoding validates lengths before a single byte reaches the sink.
//!
//! ## Error Categories
//! - **Framing Errors**: malformed or oversized length prefixes, overruns, truncation
//! - **Encoding Errors**: lengths the prefix cannot represent, writers that lie about their size
//! - **Schema Errors**: rejections raised by caller-supplied field decoders
//! - **Configuration Errors**: unreadable or invalid configuration files
//!
//! ## Example Usage
//! ```rust
//! use attributes_codec::error::{CodecError, Result};
//! use tracing::{error, info};
//!
//! fn check_key(key: u8) -> Result<u8> {
//!     if key == 0xFF {
//!         return Err(CodecError::Field(format!("reserved key {key:#04x}")));
//!     }
//!     Ok(key)
//! }
//!
//! match check_key(0x01) {
//!     Ok(key) => info!(key, "key accepted"),
//!     Err(e) => error!(error = %e, "key rejected"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Length prefix errors
    pub const ERR_LENGTH_PREFIX_EOF: &str = "input ended inside the length prefix";
    pub const ERR_VARINT_TOO_LONG: &str = "varint length prefix exceeds 10 bytes";
    pub const ERR_VARINT_OVERFLOW: &str = "varint length prefix overflows u64";
    pub const ERR_LENGTH_EXCEEDS_USIZE: &str = "declared length does not fit in memory";

    /// Configuration errors
    pub const ERR_CONFIG_OPEN: &str = "Failed to open config file";
    pub const ERR_CONFIG_PARSE: &str = "Failed to parse TOML";
}

/// Primary error type for all codec operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    /// The length prefix itself could not be parsed from the input.
    #[error("Malformed length prefix: {0}")]
    MalformedLength(String),

    /// Declared frame length exceeds the caller-supplied maximum.
    #[error("Frame too large: declared {declared} bytes, limit is {max}")]
    FrameTooLarge { declared: u64, max: u32 },

    /// A recognized field consumed more bytes than remained in its frame.
    #[error("Frame overrun: field consumed {consumed} bytes with only {remaining} remaining")]
    FrameOverrun { consumed: usize, remaining: usize },

    /// The physical input holds fewer bytes than the frame requires.
    #[error("Truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    /// Payload length is not representable by the configured length prefix.
    #[error("Length {length} exceeds the prefix maximum of {max}")]
    LengthOverflow { length: usize, max: u64 },

    /// A writer emitted a different number of bytes than it reported.
    #[error("Writer declared {declared} bytes but wrote {written}")]
    SizeMismatch { declared: usize, written: usize },

    /// Bytes were left over after a top-level frame.
    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),

    /// A caller-supplied field decoder rejected its value.
    #[error("Field error: {0}")]
    Field(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CodecError::FrameTooLarge {
            declared: 20,
            max: 10,
        };
        assert_eq!(
            err.to_string(),
            "Frame too large: declared 20 bytes, limit is 10"
        );

        let err = CodecError::TruncatedInput {
            needed: 5,
            available: 2,
        };
        assert_eq!(err.to_string(), "Truncated input: needed 5 bytes, 2 available");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_error_serializes_without_io() {
        let err = CodecError::FrameOverrun {
            consumed: 9,
            remaining: 4,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: CodecError = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            CodecError::FrameOverrun {
                consumed: 9,
                remaining: 4
            }
        ));
    }
}
