//! # Cursor
//!
//! Index-based reader over an in-memory byte buffer.
//!
//! The decoder needs to look at the next key without consuming it, so reads go through an
//! explicit offset rather than a destructive stream. The buffer is a [`Bytes`] handle, which
//! makes [`Cursor::read_bytes`] a zero-copy slice of the original input.

use crate::error::{CodecError, Result};
use bincode::Options;
use bytes::Bytes;

/// Peekable reader over a shared byte buffer
#[derive(Debug, Clone)]
pub struct Cursor {
    buf: Bytes,
    pos: usize,
}

impl Cursor {
    /// Create a cursor positioned at the start of `buf`
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            pos: 0,
        }
    }

    /// Create a cursor over a copy of a borrowed slice
    pub fn from_slice(buf: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(buf))
    }

    /// Current read offset from the start of the buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes physically left to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it
    #[inline]
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Fail with [`CodecError::TruncatedInput`] unless `n` bytes are available
    #[inline]
    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(CodecError::TruncatedInput {
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_be_bytes)
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Read `n` bytes as a zero-copy slice of the underlying buffer
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.ensure(n)?;
        let out = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    /// Skip `n` bytes
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read an unsigned LEB128 integer.
    ///
    /// Truncation inside the varint reports [`CodecError::TruncatedInput`]; encodings longer
    /// than ten bytes or overflowing `u64` report [`CodecError::MalformedLength`].
    pub fn read_varint(&mut self) -> Result<u64> {
        use crate::error::constants::{ERR_VARINT_OVERFLOW, ERR_VARINT_TOO_LONG};

        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            let low = u64::from(byte & 0x7F);
            // The tenth byte may only carry the single top bit of a u64
            if i == MAX_VARINT_LEN - 1 && low > 1 {
                return Err(CodecError::MalformedLength(ERR_VARINT_OVERFLOW.to_string()));
            }
            value |= low << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::MalformedLength(ERR_VARINT_TOO_LONG.to_string()))
    }

    /// Decode a serde value with bincode, advancing past exactly the bytes it used.
    ///
    /// Declared collection lengths are bounded by the unread input, so a corrupt length
    /// fails instead of allocating. Running out of input is a [`CodecError::TruncatedInput`]
    /// whose `needed` is a lower bound.
    pub fn read_bincode<T: serde::de::DeserializeOwned>(&mut self) -> Result<T> {
        let mut rest: &[u8] = &self.buf[self.pos..];
        let before = rest.len();
        let value = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(before as u64)
            .deserialize_from(&mut rest)
            .map_err(|err| match *err {
                bincode::ErrorKind::SizeLimit => CodecError::TruncatedInput {
                    needed: before + 1,
                    available: before,
                },
                bincode::ErrorKind::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                    CodecError::TruncatedInput {
                        needed: before + 1,
                        available: before,
                    }
                }
                _ => CodecError::from(err),
            })?;
        self.pos += before - rest.len();
        Ok(value)
    }

    /// Everything not yet read, without consuming it
    pub fn unread(&self) -> Bytes {
        self.buf.slice(self.pos..)
    }

    /// A cursor at the same position whose input ends `len` bytes from here, or at the end of
    /// this input if that comes first
    pub fn clipped(&self, len: usize) -> Cursor {
        let end = self.pos + len.min(self.remaining());
        Cursor {
            buf: self.buf.slice(..end),
            pos: self.pos,
        }
    }
}

/// Longest LEB128 encoding of a `u64`
pub const MAX_VARINT_LEN: usize = 10;
