//! # Attribute Decoder
//!
//! Greedy, peek-driven recognition of the leading fields of a frame.
//!
//! The loop peeks at each key and asks the schema's [`KeyHandler`] whether it understands it.
//! Recognized fields are decoded into the head. At the first key the handler does not
//! recognize the loop stops, and every byte still left in the frame, that key included,
//! becomes the remainder. Keys after it are never inspected, even ones the handler knows.
//!
//! Encoders emit known fields in ascending key order and append unknown ones after them, so
//! any consumer, old or new, can round-trip frames produced by any producer.

use crate::core::attributes::Attributes;
use crate::core::cursor::Cursor;
use crate::core::frame::{decode_frame, FrameMode, LengthPrefix};
use crate::error::Result;
use tracing::{debug, trace};

/// Decoder for one field's value. The key byte has already been consumed.
pub type FieldDecoder<'a, H> = Box<dyn FnOnce(&mut Cursor, H) -> Result<H> + 'a>;

/// Box a closure as a [`FieldDecoder`], letting the compiler infer its signature
pub fn decode_with<'a, H, F>(f: F) -> FieldDecoder<'a, H>
where
    F: FnOnce(&mut Cursor, H) -> Result<H> + 'a,
{
    Box::new(f)
}

/// Schema policy deciding which keys are recognized
pub trait KeyHandler<H> {
    /// Decoder for the field at `key`, or `None` if the key is not recognized.
    ///
    /// `head` holds everything decoded so far in this frame.
    fn field(&self, key: u8, head: &H) -> Option<FieldDecoder<'_, H>>;
}

impl<H, F> KeyHandler<H> for F
where
    F: Fn(u8, &H) -> Option<FieldDecoder<'static, H>>,
{
    fn field(&self, key: u8, head: &H) -> Option<FieldDecoder<'_, H>> {
        self(key, head)
    }
}

/// Policy recognizing no keys: every frame decodes to its raw remainder
#[derive(Debug, Clone, Copy, Default)]
pub struct RecognizeNone;

impl<H> KeyHandler<H> for RecognizeNone {
    fn field(&self, _key: u8, _head: &H) -> Option<FieldDecoder<'_, H>> {
        None
    }
}

/// Decode one attributes frame starting at the cursor.
///
/// # Errors
/// - [`MalformedLength`](crate::error::CodecError::MalformedLength) if the prefix is unreadable
/// - [`FrameTooLarge`](crate::error::CodecError::FrameTooLarge) if `mode` caps the length
/// - [`FrameOverrun`](crate::error::CodecError::FrameOverrun) if a field reads past the frame
/// - [`TruncatedInput`](crate::error::CodecError::TruncatedInput) if the input ends early
/// - anything the schema's field decoders return
pub fn decode_attributes<H, K>(
    cursor: &mut Cursor,
    handler: &K,
    prefix: LengthPrefix,
    mode: FrameMode,
    initial: H,
) -> Result<Attributes<H>>
where
    K: KeyHandler<H> + ?Sized,
{
    decode_frame(cursor, prefix, mode, |frame| {
        let mut head = initial;

        while frame.remaining() > 0 {
            let Some(key) = frame.peek_u8() else {
                // Input ran dry inside the frame; take_rest reports the truncation
                break;
            };
            let Some(decode_value) = handler.field(key, &head) else {
                trace!(key, remaining = frame.remaining(), "unrecognized attribute key");
                break;
            };

            head = frame.consume(|cursor| {
                cursor.advance(1)?;
                decode_value(cursor, head)
            })?;
            trace!(key, remaining = frame.remaining(), "decoded attribute");
        }

        let remainder = frame.take_rest()?;
        if !remainder.is_empty() {
            debug!(
                unknown_bytes = remainder.len(),
                frame_len = frame.len(),
                "frame carries unrecognized attributes"
            );
        }
        Ok(Attributes::with_remainder(head, remainder))
    })
}
