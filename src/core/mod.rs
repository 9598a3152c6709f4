//! # Core Codec Components
//!
//! Framing, field recognition and deterministic encoding of attribute containers.
//!
//! ## Components
//! - **Cursor**: Zero-copy reader over a shared byte buffer
//! - **Frame**: Length prefixes, frame size caps and bounded readers
//! - **Sized**: Writers that report their length before writing
//! - **Attributes**: The container of known fields plus preserved unknown bytes
//! - **Decoder / Encoder**: The two halves of the codec, driven by schema policies
//! - **Table**: Registration-based schema covering both directions
//! - **Codec**: Schema and framing bundled into one object
//!
//! ## Wire Format
//! ```text
//! [Length(prefix)] [Key(1)] [Value(N)] ... [Remainder(M)]
//! ```
//!
//! ## Security
//! - Frame lengths are checked against the configured cap before anything is read
//! - Field decoders see input that ends at their frame boundary
//! - Payloads are sliced out of the input, never copied

pub mod attributes;
pub mod codec;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod sized;
pub mod table;
