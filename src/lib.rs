//! # Attributes Codec
//!
//! Forward- and backward-compatible binary encoding for extensible attribute containers.
//!
//! An attribute container is a length-framed run of fields, each introduced by a one-byte
//! key. A decoder recognizes the leading fields it knows, stops at the first key it does not,
//! and keeps every remaining byte verbatim. Re-encoding writes the known fields in ascending
//! key order followed by those preserved bytes, so data written by a newer schema passes
//! through an older one byte for byte.
//!
//! ## Modules
//! - [`core`]: framing, decoding, encoding and schemas
//! - [`config`]: TOML and environment configuration
//! - [`error`]: the [`CodecError`] taxonomy
//! - [`utils`]: logging setup and metrics
//!
//! ## Example
//! ```
//! use attributes_codec::{AttributeCodec, Attributes, FieldTable, FieldWriter};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Fee {
//!     amount: Option<u32>,
//! }
//!
//! let mut table = FieldTable::<Fee>::new();
//! table
//!     .register_with_writer(
//!         0x01,
//!         "amount",
//!         |cursor, _| Ok(Fee { amount: Some(cursor.read_u32()?) }),
//!         |fee: &Fee| fee.amount.map(|amount| -> FieldWriter<'static> { Box::new(amount) }),
//!     )
//!     .unwrap();
//!
//! let codec = AttributeCodec::new(table);
//! let attrs = Attributes::new(Fee { amount: Some(250) });
//! let bytes = codec.encode(&attrs).unwrap();
//! assert_eq!(codec.decode::<Fee>(bytes).unwrap(), attrs);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::config::{CodecConfig, FramingConfig, LoggingConfig};
pub use crate::core::attributes::{Attributes, NoAttributes};
pub use crate::core::codec::{AttributeCodec, Schema};
pub use crate::core::cursor::Cursor;
pub use crate::core::decoder::{
    decode_attributes, decode_with, FieldDecoder, KeyHandler, RecognizeNone,
};
pub use crate::core::encoder::{
    emit, encode_attributes, encoded_size, EmitNone, FieldPolicy, FieldWriter,
};
pub use crate::core::frame::{ByteOrder, FrameMode, LengthPrefix, LengthWidth};
pub use crate::core::sized::{BincodeField, Framed, SizedWrite, Varint};
pub use crate::core::table::FieldTable;
pub use crate::error::{CodecError, Result};
