//! # Attribute Containers
//!
//! [`Attributes`] pairs the fields a schema recognized (the *head*) with the raw bytes of
//! every field it did not (the *remainder*). Keeping the remainder verbatim is what lets an
//! old decoder pass newer data through unchanged.
//!
//! Containers are plain immutable values. Equality, ordering and hashing are structural and
//! lexicographic on `(head, remainder)`.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Known attributes plus the opaque bytes of unknown ones
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Attributes<H> {
    head: H,
    remainder: Bytes,
}

impl<H> Attributes<H> {
    /// Fresh container with no unknown attributes
    pub fn new(head: H) -> Self {
        Self {
            head,
            remainder: Bytes::new(),
        }
    }

    /// Container carrying unparsed bytes, as produced by decoding
    pub fn with_remainder(head: H, remainder: impl Into<Bytes>) -> Self {
        Self {
            head,
            remainder: remainder.into(),
        }
    }

    pub fn head(&self) -> &H {
        &self.head
    }

    /// Raw bytes of every unrecognized field, in original order
    pub fn remainder(&self) -> &Bytes {
        &self.remainder
    }

    /// True when decoding recognized every field
    pub fn are_attributes_known(&self) -> bool {
        self.remainder.is_empty()
    }

    pub fn into_parts(self) -> (H, Bytes) {
        (self.head, self.remainder)
    }

    /// Replace the head, keeping the remainder untouched
    pub fn map_head<T>(self, f: impl FnOnce(H) -> T) -> Attributes<T> {
        Attributes {
            head: f(self.head),
            remainder: self.remainder,
        }
    }
}

impl<H> From<H> for Attributes<H> {
    fn from(head: H) -> Self {
        Self::new(head)
    }
}

impl<H: fmt::Display> fmt::Display for Attributes<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.are_attributes_known() {
            write!(f, "{}", self.head)
        } else {
            write!(
                f,
                "{}, unparsed: {} bytes",
                self.head,
                self.remainder.len()
            )
        }
    }
}

/// Head for schemas that define no attributes at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct NoAttributes;

impl fmt::Display for NoAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no attributes")
    }
}
