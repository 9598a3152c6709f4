//! # Attribute Encoder
//!
//! Deterministic serialization of an [`Attributes`] container.
//!
//! ## Payload Layout
//! ```text
//! [Key(1)] [Value(N)] ... [Key(1)] [Value(N)] [Remainder(M)]
//! ```
//!
//! Known fields are always written in ascending key order, whatever order the schema's
//! [`FieldPolicy`] lists them in. The decoder's recognition loop only moves forward and stops
//! at the first unknown key, so this ordering is what keeps a schema's encoder and decoder
//! symmetric. The sort is stable: duplicate keys stay in the order the policy emitted them
//! and are never merged.

use crate::core::attributes::Attributes;
use crate::core::frame::{encode_frame, framed_size, LengthPrefix};
use crate::core::sized::{Framed, SizedWrite};
use crate::error::Result;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

/// Writer for one field's value, borrowing from the head it describes
pub type FieldWriter<'h> = Box<dyn SizedWrite + 'h>;

/// Pair a key with its value writer
pub fn emit<'h, W: SizedWrite + 'h>(key: u8, writer: W) -> (u8, FieldWriter<'h>) {
    (key, Box::new(writer))
}

/// Schema policy listing the fields to emit for a head
pub trait FieldPolicy<H> {
    /// Every `(key, writer)` pair to emit, in any order
    fn fields<'h>(&self, head: &'h H) -> Vec<(u8, FieldWriter<'h>)>;
}

impl<H, F> FieldPolicy<H> for F
where
    F: Fn(&H) -> Vec<(u8, FieldWriter<'static>)>,
{
    fn fields<'h>(&self, head: &'h H) -> Vec<(u8, FieldWriter<'h>)> {
        self(head)
    }
}

/// Policy emitting no fields; only the remainder is written
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitNone;

impl<H> FieldPolicy<H> for EmitNone {
    fn fields<'h>(&self, _head: &'h H) -> Vec<(u8, FieldWriter<'h>)> {
        Vec::new()
    }
}

/// Sorted fields followed by the remainder, ready to be framed
pub struct AttributesPayload<'h> {
    fields: Vec<(u8, FieldWriter<'h>)>,
    remainder: &'h Bytes,
}

impl<'h> AttributesPayload<'h> {
    pub fn new<H, P>(policy: &P, attrs: &'h Attributes<H>) -> Self
    where
        P: FieldPolicy<H> + ?Sized,
    {
        let mut fields = policy.fields(attrs.head());
        fields.sort_by_key(|(key, _)| *key);

        if fields.windows(2).any(|pair| pair[0].0 == pair[1].0) {
            debug!("field policy emitted duplicate keys; writing them in emission order");
        }

        Self {
            fields,
            remainder: attrs.remainder(),
        }
    }

    /// Keys in the order they will be written
    pub fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.fields.iter().map(|(key, _)| *key)
    }
}

impl SizedWrite for AttributesPayload<'_> {
    fn size(&self) -> usize {
        let fields: usize = self.fields.iter().map(|(_, w)| 1 + w.size()).sum();
        fields + self.remainder.len()
    }

    fn write_into(&self, sink: &mut BytesMut) {
        for (key, writer) in &self.fields {
            sink.put_u8(*key);
            writer.write_into(sink);
        }
        sink.put_slice(self.remainder);
    }
}

/// Append one encoded attributes frame to `sink`.
///
/// # Errors
/// - [`LengthOverflow`](crate::error::CodecError::LengthOverflow) if the payload does not fit
///   the prefix; nothing is written
/// - [`SizeMismatch`](crate::error::CodecError::SizeMismatch) if a field writer misreports its
///   size; the sink is restored
pub fn encode_attributes<H, P>(
    sink: &mut BytesMut,
    policy: &P,
    attrs: &Attributes<H>,
    prefix: LengthPrefix,
) -> Result<()>
where
    P: FieldPolicy<H> + ?Sized,
{
    let payload = AttributesPayload::new(policy, attrs);
    encode_frame(sink, prefix, &payload)?;
    trace!(
        fields = payload.fields.len(),
        unknown_bytes = attrs.remainder().len(),
        "encoded attributes"
    );
    Ok(())
}

/// Encoded size of an attributes frame, computed without writing any bytes
pub fn encoded_size<H, P>(policy: &P, attrs: &Attributes<H>, prefix: LengthPrefix) -> Result<usize>
where
    P: FieldPolicy<H> + ?Sized,
{
    framed_size(prefix, AttributesPayload::new(policy, attrs).size())
}

/// An attributes frame as a [`SizedWrite`], for nesting inside larger messages
pub fn attributes_writer<'h, H, P>(
    policy: &P,
    attrs: &'h Attributes<H>,
    prefix: LengthPrefix,
) -> Result<Framed<AttributesPayload<'h>>>
where
    P: FieldPolicy<H> + ?Sized,
{
    Framed::new(prefix, AttributesPayload::new(policy, attrs))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::attributes::NoAttributes;
    use crate::core::frame::{ByteOrder, LengthWidth};
    use crate::error::CodecError;

    const U8_PREFIX: LengthPrefix = LengthPrefix::new(LengthWidth::U8, ByteOrder::Big);

    fn encode<H, P: FieldPolicy<H>>(policy: &P, attrs: &Attributes<H>) -> Vec<u8> {
        let mut sink = BytesMut::new();
        encode_attributes(&mut sink, policy, attrs, U8_PREFIX).unwrap();
        sink.to_vec()
    }

    fn scrambled(_: &NoAttributes) -> Vec<(u8, FieldWriter<'static>)> {
        vec![emit(3, 0x33u8), emit(1, 0x11u8), emit(2, 0x22u8)]
    }

    #[test]
    fn test_fields_sorted_ascending() {
        let attrs = Attributes::new(NoAttributes);
        assert_eq!(
            encode(&scrambled, &attrs),
            vec![0x06, 0x01, 0x11, 0x02, 0x22, 0x03, 0x33]
        );
    }

    #[test]
    fn test_remainder_follows_fields() {
        let attrs = Attributes::with_remainder(NoAttributes, vec![0x09, 0xFF]);
        assert_eq!(
            encode(&scrambled, &attrs),
            vec![0x08, 0x01, 0x11, 0x02, 0x22, 0x03, 0x33, 0x09, 0xFF]
        );
    }

    #[test]
    fn test_duplicate_keys_keep_emission_order() {
        let dupes = |_: &NoAttributes| -> Vec<(u8, FieldWriter<'static>)> {
            vec![emit(2, 0xB0u8), emit(1, 0xA0u8), emit(2, 0xB1u8)]
        };
        assert_eq!(
            encode(&dupes, &Attributes::new(NoAttributes)),
            vec![0x06, 0x01, 0xA0, 0x02, 0xB0, 0x02, 0xB1]
        );
    }

    #[test]
    fn test_borrowing_policy() {
        struct Labels;

        impl FieldPolicy<Vec<u8>> for Labels {
            fn fields<'h>(&self, head: &'h Vec<u8>) -> Vec<(u8, FieldWriter<'h>)> {
                vec![emit(0x01, &head[..])]
            }
        }

        let attrs = Attributes::new(vec![0xCA, 0xFE]);
        assert_eq!(encode(&Labels, &attrs), vec![0x03, 0x01, 0xCA, 0xFE]);
    }

    #[test]
    fn test_encoded_size_matches_output() {
        let attrs = Attributes::with_remainder(NoAttributes, vec![0u8; 10]);
        let size = encoded_size(&scrambled, &attrs, U8_PREFIX).unwrap();
        assert_eq!(size, encode(&scrambled, &attrs).len());
    }

    #[test]
    fn test_unrepresentable_length_writes_nothing() {
        let attrs = Attributes::with_remainder(NoAttributes, vec![0u8; 255]);
        let mut sink = BytesMut::new();
        let result = encode_attributes(&mut sink, &scrambled, &attrs, U8_PREFIX);
        assert!(matches!(result, Err(CodecError::LengthOverflow { .. })));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_emit_none_writes_remainder_only() {
        let attrs = Attributes::with_remainder(7u32, vec![0x01, 0x02]);
        assert_eq!(encode(&EmitNone, &attrs), vec![0x02, 0x01, 0x02]);
    }

    #[test]
    fn test_nested_writer() {
        let attrs = Attributes::new(NoAttributes);
        let writer = attributes_writer(&scrambled, &attrs, U8_PREFIX).unwrap();
        let outer = crate::core::sized::to_framed_bytes(U8_PREFIX, &writer).unwrap();
        assert_eq!(
            &outer[..],
            &[0x07, 0x06, 0x01, 0x11, 0x02, 0x22, 0x03, 0x33]
        );
    }
}
