//! # Bounded Frames
//!
//! A frame is a length prefix followed by exactly that many payload bytes.
//!
//! ## Wire Format
//! ```text
//! [Length(prefix width)] [Payload(N)]
//! ```
//!
//! Decoding hands the payload to an inner decoder through a [`FrameReader`], which tracks the
//! bytes still owed to the frame. Consuming *fewer* bytes than declared is expected (the
//! attribute decoder keeps the rest as its remainder); consuming *more* is a
//! [`CodecError::FrameOverrun`].
//!
//! Encoding sizes the payload through [`SizedWrite`] first, so the prefix is written straight
//! into the sink ahead of the payload with no intermediate buffer.

use crate::core::cursor::Cursor;
use crate::core::sized::{SizedWrite, Varint};
use crate::error::{constants, CodecError, Result};
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, trace};

/// Width of the length prefix in front of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthWidth {
    U8,
    U16,
    #[default]
    U32,
    U64,
    /// Unsigned LEB128, one to ten bytes
    Varint,
}

impl LengthWidth {
    /// Largest payload length this width can represent
    pub fn max_length(self) -> u64 {
        match self {
            LengthWidth::U8 => u64::from(u8::MAX),
            LengthWidth::U16 => u64::from(u16::MAX),
            LengthWidth::U32 => u64::from(u32::MAX),
            LengthWidth::U64 | LengthWidth::Varint => u64::MAX,
        }
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            LengthWidth::U8 => "u8",
            LengthWidth::U16 => "u16",
            LengthWidth::U32 => "u32",
            LengthWidth::U64 => "u64",
            LengthWidth::Varint => "varint",
        }
    }
}

impl FromStr for LengthWidth {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "u8" => Ok(LengthWidth::U8),
            "u16" => Ok(LengthWidth::U16),
            "u32" => Ok(LengthWidth::U32),
            "u64" => Ok(LengthWidth::U64),
            "varint" => Ok(LengthWidth::Varint),
            other => Err(CodecError::ConfigError(format!(
                "Unknown length width: '{other}' (expected u8, u16, u32, u64 or varint)"
            ))),
        }
    }
}

/// Byte order of fixed-width length prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl FromStr for ByteOrder {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "big" | "be" => Ok(ByteOrder::Big),
            "little" | "le" => Ok(ByteOrder::Little),
            other => Err(CodecError::ConfigError(format!(
                "Unknown byte order: '{other}' (expected big or little)"
            ))),
        }
    }
}

/// Length prefix policy, held constant across one embedding protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LengthPrefix {
    pub width: LengthWidth,
    pub order: ByteOrder,
}

impl LengthPrefix {
    pub const fn new(width: LengthWidth, order: ByteOrder) -> Self {
        Self { width, order }
    }

    /// Unsigned LEB128 prefix
    pub const fn varint() -> Self {
        Self::new(LengthWidth::Varint, ByteOrder::Big)
    }

    /// Number of bytes the prefix occupies for a payload of `len` bytes
    pub fn encoded_len(&self, len: usize) -> usize {
        match self.width {
            LengthWidth::U8 => 1,
            LengthWidth::U16 => 2,
            LengthWidth::U32 => 4,
            LengthWidth::U64 => 8,
            LengthWidth::Varint => Varint(len as u64).size(),
        }
    }

    /// Reject lengths the prefix cannot represent
    pub fn check(&self, len: usize) -> Result<()> {
        let max = self.width.max_length();
        if len as u64 > max {
            return Err(CodecError::LengthOverflow { length: len, max });
        }
        Ok(())
    }

    /// Parse a length prefix from the cursor.
    ///
    /// Any failure, including running out of input, is a [`CodecError::MalformedLength`].
    pub fn read(&self, cursor: &mut Cursor) -> Result<u64> {
        let value = match (self.width, self.order) {
            (LengthWidth::U8, _) => cursor.read_u8().map(u64::from),
            (LengthWidth::U16, ByteOrder::Big) => cursor.read_u16().map(u64::from),
            (LengthWidth::U16, ByteOrder::Little) => cursor.read_u16_le().map(u64::from),
            (LengthWidth::U32, ByteOrder::Big) => cursor.read_u32().map(u64::from),
            (LengthWidth::U32, ByteOrder::Little) => cursor.read_u32_le().map(u64::from),
            (LengthWidth::U64, ByteOrder::Big) => cursor.read_u64(),
            (LengthWidth::U64, ByteOrder::Little) => cursor.read_u64_le(),
            (LengthWidth::Varint, _) => cursor.read_varint(),
        };

        value.map_err(|err| match err {
            CodecError::TruncatedInput { .. } => {
                CodecError::MalformedLength(constants::ERR_LENGTH_PREFIX_EOF.to_string())
            }
            other => other,
        })
    }

    /// Write `len` as a prefix. The caller has already run [`LengthPrefix::check`].
    pub fn write(&self, len: usize, sink: &mut BytesMut) {
        match (self.width, self.order) {
            (LengthWidth::U8, _) => sink.put_u8(len as u8),
            (LengthWidth::U16, ByteOrder::Big) => sink.put_u16(len as u16),
            (LengthWidth::U16, ByteOrder::Little) => sink.put_u16_le(len as u16),
            (LengthWidth::U32, ByteOrder::Big) => sink.put_u32(len as u32),
            (LengthWidth::U32, ByteOrder::Little) => sink.put_u32_le(len as u32),
            (LengthWidth::U64, ByteOrder::Big) => sink.put_u64(len as u64),
            (LengthWidth::U64, ByteOrder::Little) => sink.put_u64_le(len as u64),
            (LengthWidth::Varint, _) => Varint(len as u64).write_into(sink),
        }
    }
}

/// How a decoder treats the declared frame length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// Any representable length is accepted
    #[default]
    Unrestricted,
    /// Lengths above the limit are rejected before the payload is touched
    Limited(u32),
}

impl FrameMode {
    pub fn from_limit(limit: Option<u32>) -> Self {
        limit.map_or(FrameMode::Unrestricted, FrameMode::Limited)
    }

    fn admit(self, declared: u64) -> Result<()> {
        match self {
            FrameMode::Limited(max) if declared > u64::from(max) => {
                debug!(declared, max, "rejecting oversized frame");
                Err(CodecError::FrameTooLarge { declared, max })
            }
            _ => Ok(()),
        }
    }
}

/// Inner view of an open frame: the shared cursor plus the bytes still owed to the frame
#[derive(Debug)]
pub struct FrameReader<'c> {
    cursor: &'c mut Cursor,
    len: usize,
    remaining: usize,
}

impl<'c> FrameReader<'c> {
    /// Declared payload length
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes of the frame not yet accounted for
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Peek the next byte of the frame without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        self.cursor.peek_u8()
    }

    /// Run a step over the rest of the frame and charge what it consumed.
    ///
    /// The step sees input ending at the frame boundary. If the frame is physically complete,
    /// reading past that boundary is a [`CodecError::FrameOverrun`]; if the input itself ends
    /// inside the frame it stays a [`CodecError::TruncatedInput`].
    pub fn consume<T>(&mut self, step: impl FnOnce(&mut Cursor) -> Result<T>) -> Result<T> {
        let start = self.cursor.position();
        let mut bounded = self.cursor.clipped(self.remaining);
        match step(&mut bounded) {
            Ok(value) => {
                let consumed = bounded.position() - start;
                self.cursor.advance(consumed)?;
                self.remaining -= consumed;
                Ok(value)
            }
            Err(CodecError::TruncatedInput { needed, .. })
                if self.cursor.remaining() >= self.remaining =>
            {
                Err(CodecError::FrameOverrun {
                    consumed: bounded.position() - start + needed,
                    remaining: self.remaining,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Take every byte still owed to the frame, verbatim
    pub fn take_rest(&mut self) -> Result<Bytes> {
        let rest = self.cursor.read_bytes(self.remaining)?;
        self.remaining = 0;
        Ok(rest)
    }
}

/// Open a frame at the cursor and run `inner` over its payload.
///
/// On success the cursor sits exactly at the end of the frame. Bytes the inner decoder left
/// unread are skipped, still subject to the physical-length check.
pub fn decode_frame<T>(
    cursor: &mut Cursor,
    prefix: LengthPrefix,
    mode: FrameMode,
    inner: impl FnOnce(&mut FrameReader<'_>) -> Result<T>,
) -> Result<T> {
    let declared = prefix.read(cursor)?;
    mode.admit(declared)?;
    let len = usize::try_from(declared).map_err(|_| {
        CodecError::MalformedLength(constants::ERR_LENGTH_EXCEEDS_USIZE.to_string())
    })?;
    trace!(len, offset = cursor.position(), "opened frame");

    let mut frame = FrameReader {
        cursor,
        len,
        remaining: len,
    };
    let value = inner(&mut frame)?;
    if frame.remaining > 0 {
        frame.cursor.advance(frame.remaining)?;
    }
    Ok(value)
}

/// Write `payload` as a length-prefixed frame.
///
/// The length is validated against the prefix before anything is written. If the writer
/// emits a different number of bytes than it declared, the sink is restored to its original
/// length and [`CodecError::SizeMismatch`] is returned.
pub fn encode_frame<W: SizedWrite + ?Sized>(
    sink: &mut BytesMut,
    prefix: LengthPrefix,
    payload: &W,
) -> Result<()> {
    let len = payload.size();
    prefix.check(len)?;

    let start = sink.len();
    sink.reserve(prefix.encoded_len(len) + len);
    prefix.write(len, sink);
    let body_start = sink.len();
    payload.write_into(sink);

    let written = sink.len() - body_start;
    if written != len {
        sink.truncate(start);
        return Err(CodecError::SizeMismatch {
            declared: len,
            written,
        });
    }
    Ok(())
}

/// Total encoded size of a frame around a payload of `len` bytes
pub fn framed_size(prefix: LengthPrefix, len: usize) -> Result<usize> {
    prefix.check(len)?;
    Ok(prefix.encoded_len(len) + len)
}
