//! # Attribute Codec
//!
//! One object bundling a schema with the framing it is carried in.
//!
//! A schema is anything implementing [`KeyHandler`] for decoding and [`FieldPolicy`] for
//! encoding. [`FieldTable`](crate::core::table::FieldTable) covers both directions; [`Schema`]
//! pairs two separate policies, such as a pair of closures.
//!
//! ## Example
//! ```
//! use attributes_codec::{AttributeCodec, Attributes, NoAttributes, Schema};
//!
//! let codec = AttributeCodec::new(Schema::opaque());
//! let attrs = Attributes::with_remainder(NoAttributes, vec![0x01, 0x02]);
//!
//! let bytes = codec.encode(&attrs).unwrap();
//! assert_eq!(codec.decode::<NoAttributes>(bytes).unwrap(), attrs);
//! ```

use crate::config::FramingConfig;
use crate::core::attributes::Attributes;
use crate::core::cursor::Cursor;
use crate::core::decoder::{decode_attributes, FieldDecoder, KeyHandler, RecognizeNone};
use crate::core::encoder::{
    attributes_writer, encode_attributes, encoded_size, AttributesPayload, EmitNone, FieldPolicy,
    FieldWriter,
};
use crate::core::frame::{FrameMode, LengthPrefix};
use crate::core::sized::Framed;
use crate::error::{CodecError, Result};
use crate::utils::metrics::Metrics;
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use tracing::debug;

/// A decode policy and an encode policy used together
#[derive(Debug, Clone, Copy, Default)]
pub struct Schema<K, P> {
    handler: K,
    policy: P,
}

impl<K, P> Schema<K, P> {
    pub fn new(handler: K, policy: P) -> Self {
        Self { handler, policy }
    }

    pub fn handler(&self) -> &K {
        &self.handler
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl Schema<RecognizeNone, EmitNone> {
    /// Schema with no fields: every frame is carried as raw remainder
    pub fn opaque() -> Self {
        Self::new(RecognizeNone, EmitNone)
    }
}

impl<H, K: KeyHandler<H>, P> KeyHandler<H> for Schema<K, P> {
    fn field(&self, key: u8, head: &H) -> Option<FieldDecoder<'_, H>> {
        self.handler.field(key, head)
    }
}

impl<H, K, P: FieldPolicy<H>> FieldPolicy<H> for Schema<K, P> {
    fn fields<'h>(&self, head: &'h H) -> Vec<(u8, FieldWriter<'h>)> {
        self.policy.fields(head)
    }
}

/// Attribute codec with fixed framing
#[derive(Debug, Clone)]
pub struct AttributeCodec<S> {
    schema: S,
    prefix: LengthPrefix,
    mode: FrameMode,
    metrics: Option<Arc<Metrics>>,
}

impl<S> AttributeCodec<S> {
    /// Codec with the default framing: 4-byte big-endian prefix, 16 MB frame cap
    pub fn new(schema: S) -> Self {
        Self::from_config(schema, &FramingConfig::default())
    }

    pub fn from_config(schema: S, config: &FramingConfig) -> Self {
        Self {
            schema,
            prefix: config.prefix(),
            mode: config.mode(),
            metrics: None,
        }
    }

    pub fn with_prefix(mut self, prefix: LengthPrefix) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_mode(mut self, mode: FrameMode) -> Self {
        self.mode = mode;
        self
    }

    /// Record every encode and decode into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn prefix(&self) -> LengthPrefix {
        self.prefix
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// Decode a buffer holding exactly one frame, starting from the default head
    pub fn decode<H>(&self, input: impl Into<Bytes>) -> Result<Attributes<H>>
    where
        H: Default,
        S: KeyHandler<H>,
    {
        self.decode_with_head(input, H::default())
    }

    /// Like [`decode`](Self::decode), copying a borrowed buffer first
    pub fn decode_slice<H>(&self, input: &[u8]) -> Result<Attributes<H>>
    where
        H: Default,
        S: KeyHandler<H>,
    {
        self.decode_with_head(Bytes::copy_from_slice(input), H::default())
    }

    /// Decode a buffer holding exactly one frame.
    ///
    /// # Errors
    /// Any frame error, or [`TrailingBytes`](CodecError::TrailingBytes) if input remains after
    /// the frame.
    pub fn decode_with_head<H>(&self, input: impl Into<Bytes>, initial: H) -> Result<Attributes<H>>
    where
        S: KeyHandler<H>,
    {
        let mut cursor = Cursor::new(input);
        let result = decode_attributes(&mut cursor, &self.schema, self.prefix, self.mode, initial)
            .and_then(|attrs| match cursor.remaining() {
                0 => Ok(attrs),
                trailing => {
                    debug!(trailing, "bytes left after attributes frame");
                    Err(CodecError::TrailingBytes(trailing))
                }
            });
        self.observe_decode(result, cursor.position())
    }

    /// Decode one frame embedded in a larger message, leaving the cursor just past it
    pub fn decode_from<H>(&self, cursor: &mut Cursor, initial: H) -> Result<Attributes<H>>
    where
        S: KeyHandler<H>,
    {
        let start = cursor.position();
        let result = decode_attributes(cursor, &self.schema, self.prefix, self.mode, initial);
        self.observe_decode(result, cursor.position().saturating_sub(start))
    }

    /// Encode into a fresh buffer
    pub fn encode<H>(&self, attrs: &Attributes<H>) -> Result<Bytes>
    where
        S: FieldPolicy<H>,
    {
        let mut sink = BytesMut::new();
        self.encode_into(&mut sink, attrs)?;
        Ok(sink.freeze())
    }

    /// Append one frame to `sink`. On error the sink is left as it was.
    pub fn encode_into<H>(&self, sink: &mut BytesMut, attrs: &Attributes<H>) -> Result<()>
    where
        S: FieldPolicy<H>,
    {
        let start = sink.len();
        let result = encode_attributes(sink, &self.schema, attrs, self.prefix);

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(()) => metrics.frame_encoded((sink.len() - start) as u64),
                Err(_) => metrics.encode_error(),
            }
        }
        result
    }

    /// Size [`encode`](Self::encode) would produce, computed without writing
    pub fn encoded_size<H>(&self, attrs: &Attributes<H>) -> Result<usize>
    where
        S: FieldPolicy<H>,
    {
        encoded_size(&self.schema, attrs, self.prefix)
    }

    /// The frame as a sized writer, for nesting inside a larger message
    pub fn writer<'h, H>(&self, attrs: &'h Attributes<H>) -> Result<Framed<AttributesPayload<'h>>>
    where
        S: FieldPolicy<H>,
    {
        attributes_writer(&self.schema, attrs, self.prefix)
    }

    fn observe_decode<H>(
        &self,
        result: Result<Attributes<H>>,
        consumed: usize,
    ) -> Result<Attributes<H>> {
        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(attrs) => metrics.frame_decoded(consumed as u64, attrs.remainder().len() as u64),
                Err(e) => metrics.decode_error(e),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::attributes::NoAttributes;
    use crate::core::decoder::decode_with;
    use crate::core::encoder::emit;
    use crate::core::frame::{ByteOrder, LengthWidth};

    const U8_PREFIX: LengthPrefix = LengthPrefix::new(LengthWidth::U8, ByteOrder::Big);

    fn counter_handler(key: u8, _: &u32) -> Option<FieldDecoder<'static, u32>> {
        (key == 0x01).then(|| decode_with(|c, _| c.read_u32()))
    }

    fn counter_policy(head: &u32) -> Vec<(u8, FieldWriter<'static>)> {
        vec![emit(0x01, *head)]
    }

    fn counter_codec() -> AttributeCodec<impl KeyHandler<u32> + FieldPolicy<u32>> {
        AttributeCodec::new(Schema::new(counter_handler, counter_policy)).with_prefix(U8_PREFIX)
    }

    #[test]
    fn test_opaque_scenario() {
        let codec = AttributeCodec::new(Schema::opaque()).with_prefix(U8_PREFIX);
        let input = Bytes::from_static(&[0x05, 0x01, 0x02, 0x03, 0x04, 0x05]);

        let attrs = codec.decode::<NoAttributes>(input.clone()).unwrap();
        assert_eq!(attrs.head(), &NoAttributes);
        assert_eq!(&attrs.remainder()[..], &[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert!(!attrs.are_attributes_known());

        assert_eq!(codec.encode(&attrs).unwrap(), input);
    }

    #[test]
    fn test_round_trip() {
        let codec = counter_codec();
        let attrs = Attributes::new(0xDEAD_BEEFu32);
        let bytes = codec.encode(&attrs).unwrap();
        assert_eq!(&bytes[..], &[0x05, 0x01, 0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(codec.encoded_size(&attrs).unwrap(), bytes.len());
        assert_eq!(codec.decode::<u32>(bytes).unwrap(), attrs);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let codec = AttributeCodec::new(Schema::opaque()).with_prefix(U8_PREFIX);
        let result = codec.decode_slice::<NoAttributes>(&[0x01, 0xAA, 0xBB, 0xCC]);
        assert!(matches!(result, Err(CodecError::TrailingBytes(2))));
    }

    #[test]
    fn test_decode_from_leaves_cursor_after_frame() {
        let codec = counter_codec();
        let mut cursor = Cursor::from_slice(&[0x05, 0x01, 0, 0, 0, 9, 0x77]);
        let attrs = codec.decode_from(&mut cursor, 0u32).unwrap();
        assert_eq!(attrs.head(), &9);
        assert_eq!(cursor.read_u8().unwrap(), 0x77);
    }

    #[test]
    fn test_limited_mode_from_config() {
        let config = FramingConfig {
            length_width: LengthWidth::U8,
            max_frame_size: 2,
            ..FramingConfig::default()
        };
        let codec = AttributeCodec::from_config(Schema::opaque(), &config);
        let result = codec.decode_slice::<NoAttributes>(&[0x03, 0x01, 0x02, 0x03]);
        assert!(matches!(
            result,
            Err(CodecError::FrameTooLarge {
                declared: 3,
                max: 2
            })
        ));
    }

    #[test]
    fn test_metrics_recorded() {
        let metrics = Arc::new(Metrics::new());
        let codec = AttributeCodec::new(Schema::opaque())
            .with_prefix(U8_PREFIX)
            .with_metrics(Arc::clone(&metrics));

        let attrs = Attributes::with_remainder(NoAttributes, vec![0x09, 0x09]);
        let bytes = codec.encode(&attrs).unwrap();
        codec.decode::<NoAttributes>(bytes).unwrap();
        let _ = codec.decode_slice::<NoAttributes>(&[0x04, 0x01]);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_encoded, 1);
        assert_eq!(snapshot.bytes_encoded, 3);
        assert_eq!(snapshot.frames_decoded, 1);
        assert_eq!(snapshot.frames_with_unknown, 1);
        assert_eq!(snapshot.unknown_bytes, 2);
        assert_eq!(snapshot.decode_errors, 1);
        assert_eq!(snapshot.truncated_inputs, 1);
    }
}
