//! # Sized Writers
//!
//! Serializers that report their output length before writing.
//!
//! Knowing the size up front lets a frame write its length prefix directly ahead of the
//! payload, and lets [`encoded_size`](crate::core::encoder::encoded_size) answer without
//! producing any bytes. Every implementation must emit exactly [`SizedWrite::size`] bytes
//! from [`SizedWrite::write_into`]; [`encode_frame`] checks this and rejects liars.

use crate::core::frame::{encode_frame, LengthPrefix};
use crate::error::Result;
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

/// A serializer that can report its output length before writing
pub trait SizedWrite {
    /// Number of bytes [`SizedWrite::write_into`] will emit
    fn size(&self) -> usize;

    /// Append the encoded bytes to `sink`
    fn write_into(&self, sink: &mut BytesMut);

    /// Encode into a fresh buffer of exactly the right capacity
    fn to_bytes(&self) -> Bytes {
        let mut sink = BytesMut::with_capacity(self.size());
        self.write_into(&mut sink);
        sink.freeze()
    }
}

impl SizedWrite for u8 {
    fn size(&self) -> usize {
        1
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_u8(*self);
    }
}

impl SizedWrite for u16 {
    fn size(&self) -> usize {
        2
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_u16(*self);
    }
}

impl SizedWrite for u32 {
    fn size(&self) -> usize {
        4
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_u32(*self);
    }
}

impl SizedWrite for u64 {
    fn size(&self) -> usize {
        8
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_u64(*self);
    }
}

impl SizedWrite for [u8] {
    fn size(&self) -> usize {
        self.len()
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_slice(self);
    }
}

impl<const N: usize> SizedWrite for [u8; N] {
    fn size(&self) -> usize {
        N
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_slice(self);
    }
}

impl SizedWrite for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_slice(self);
    }
}

impl SizedWrite for Bytes {
    fn size(&self) -> usize {
        self.len()
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_slice(self);
    }
}

impl<W: SizedWrite + ?Sized> SizedWrite for &W {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn write_into(&self, sink: &mut BytesMut) {
        (**self).write_into(sink);
    }
}

impl<W: SizedWrite + ?Sized> SizedWrite for Box<W> {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn write_into(&self, sink: &mut BytesMut) {
        (**self).write_into(sink);
    }
}

/// Unsigned LEB128 integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Varint(pub u64);

impl SizedWrite for Varint {
    fn size(&self) -> usize {
        let bits = 64 - (self.0 | 1).leading_zeros() as usize;
        bits.div_ceil(7)
    }

    fn write_into(&self, sink: &mut BytesMut) {
        let mut value = self.0;
        while value >= 0x80 {
            sink.put_u8((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        sink.put_u8(value as u8);
    }
}

/// A nested writer behind its own length prefix.
///
/// The length is validated when the frame is built, so sizing and writing cannot fail later.
#[derive(Debug, Clone)]
pub struct Framed<W> {
    prefix: LengthPrefix,
    inner: W,
    inner_size: usize,
}

impl<W: SizedWrite> Framed<W> {
    pub fn new(prefix: LengthPrefix, inner: W) -> Result<Self> {
        let inner_size = inner.size();
        prefix.check(inner_size)?;
        Ok(Self {
            prefix,
            inner,
            inner_size,
        })
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: SizedWrite> SizedWrite for Framed<W> {
    fn size(&self) -> usize {
        self.prefix.encoded_len(self.inner_size) + self.inner_size
    }

    fn write_into(&self, sink: &mut BytesMut) {
        self.prefix.write(self.inner_size, sink);
        self.inner.write_into(sink);
    }
}

/// A serde value encoded with bincode.
///
/// Serialized eagerly on construction so that sizing never has to report an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BincodeField {
    encoded: Bytes,
}

impl BincodeField {
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let encoded = bincode::serialize(value)?;
        Ok(Self {
            encoded: Bytes::from(encoded),
        })
    }
}

impl SizedWrite for BincodeField {
    fn size(&self) -> usize {
        self.encoded.len()
    }

    fn write_into(&self, sink: &mut BytesMut) {
        sink.put_slice(&self.encoded);
    }
}

/// Encode `writer` as a length-prefixed frame into a fresh buffer
pub fn to_framed_bytes<W: SizedWrite + ?Sized>(prefix: LengthPrefix, writer: &W) -> Result<Bytes> {
    let mut sink = BytesMut::new();
    encode_frame(&mut sink, prefix, writer)?;
    Ok(sink.freeze())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::cursor::Cursor;
    use crate::core::frame::{ByteOrder, LengthWidth};

    fn assert_size_agrees<W: SizedWrite + ?Sized>(writer: &W) {
        let mut sink = BytesMut::new();
        writer.write_into(&mut sink);
        assert_eq!(sink.len(), writer.size());
    }

    #[test]
    fn test_primitive_sizes_agree() {
        assert_size_agrees(&0xABu8);
        assert_size_agrees(&0xABCDu16);
        assert_size_agrees(&0xDEAD_BEEFu32);
        assert_size_agrees(&u64::MAX);
        assert_size_agrees(&[1u8, 2, 3][..]);
        assert_size_agrees(&vec![9u8; 17]);
        assert_size_agrees(&Bytes::from_static(b"attr"));
        assert_size_agrees(&[1u8, 2, 3, 4]);
    }

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(&0x0102u16.to_bytes()[..], &[0x01, 0x02]);
        assert_eq!(&0x0102_0304u32.to_bytes()[..], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_varint_sizes() {
        for (value, size) in [(0u64, 1), (127, 1), (128, 2), (16_383, 2), (16_384, 3), (u64::MAX, 10)] {
            let writer = Varint(value);
            assert_eq!(writer.size(), size, "value {value}");
            assert_size_agrees(&writer);

            let mut cursor = Cursor::new(writer.to_bytes());
            assert_eq!(cursor.read_varint().unwrap(), value);
        }
    }

    #[test]
    fn test_framed_writer() {
        let prefix = LengthPrefix::new(LengthWidth::U16, ByteOrder::Little);
        let framed = Framed::new(prefix, vec![0xAAu8, 0xBB, 0xCC]).unwrap();
        assert_eq!(framed.size(), 5);
        assert_eq!(&framed.to_bytes()[..], &[0x03, 0x00, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_framed_rejects_oversized_inner() {
        let prefix = LengthPrefix::new(LengthWidth::U8, ByteOrder::Big);
        assert!(Framed::new(prefix, vec![0u8; 300]).is_err());
    }

    #[test]
    fn test_bincode_field() {
        let field = BincodeField::new(&(42u32, "label")).unwrap();
        assert_size_agrees(&field);

        let mut cursor = Cursor::new(field.to_bytes());
        let (n, label): (u32, String) = cursor.read_bincode().unwrap();
        assert_eq!(n, 42);
        assert_eq!(label, "label");
    }

    #[test]
    fn test_to_framed_bytes() {
        let bytes = to_framed_bytes(LengthPrefix::default(), &[7u8, 8][..]).unwrap();
        assert_eq!(&bytes[..], &[0, 0, 0, 2, 7, 8]);
    }
}
