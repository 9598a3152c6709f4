//! # Field Tables
//!
//! Registration-based schema: each key maps to a value decoder and, optionally, a writer that
//! extracts the value back out of the head. One table describes both directions of a schema,
//! which keeps the keys a decoder recognizes and the keys an encoder emits in step.

use crate::core::cursor::Cursor;
use crate::core::decoder::{FieldDecoder, KeyHandler};
use crate::core::encoder::{FieldPolicy, FieldWriter};
use crate::error::{CodecError, Result};
use std::collections::BTreeMap;
use std::fmt;

type DecodeFn<H> = dyn Fn(&mut Cursor, H) -> Result<H> + Send + Sync + 'static;
type WriteFn<H> = dyn Fn(&H) -> Option<FieldWriter<'static>> + Send + Sync + 'static;

struct Entry<H> {
    name: &'static str,
    decode: Box<DecodeFn<H>>,
    write: Option<Box<WriteFn<H>>>,
}

/// Key-to-handler dispatch table for one attribute schema
pub struct FieldTable<H> {
    entries: BTreeMap<u8, Entry<H>>,
}

impl<H> Default for FieldTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for FieldTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, entry)| (key, entry.name)))
            .finish()
    }
}

impl<H> FieldTable<H> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a decode-only field. Fails if the key is already taken.
    pub fn register<D>(&mut self, key: u8, name: &'static str, decode: D) -> Result<()>
    where
        D: Fn(&mut Cursor, H) -> Result<H> + Send + Sync + 'static,
    {
        self.insert(
            key,
            Entry {
                name,
                decode: Box::new(decode),
                write: None,
            },
        )
    }

    /// Register a field in both directions.
    ///
    /// `write` returns `None` when the head holds no value for this key, in which case the
    /// field is left out of the encoding.
    pub fn register_with_writer<D, W>(
        &mut self,
        key: u8,
        name: &'static str,
        decode: D,
        write: W,
    ) -> Result<()>
    where
        D: Fn(&mut Cursor, H) -> Result<H> + Send + Sync + 'static,
        W: Fn(&H) -> Option<FieldWriter<'static>> + Send + Sync + 'static,
    {
        self.insert(
            key,
            Entry {
                name,
                decode: Box::new(decode),
                write: Some(Box::new(write)),
            },
        )
    }

    fn insert(&mut self, key: u8, entry: Entry<H>) -> Result<()> {
        if let Some(existing) = self.entries.get(&key) {
            return Err(CodecError::Field(format!(
                "key {key:#04x} already registered as '{}'",
                existing.name
            )));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn contains(&self, key: u8) -> bool {
        self.entries.contains_key(&key)
    }

    /// Name a key was registered under
    pub fn name(&self, key: u8) -> Option<&'static str> {
        self.entries.get(&key).map(|entry| entry.name)
    }

    /// Registered keys, ascending
    pub fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H> KeyHandler<H> for FieldTable<H> {
    fn field(&self, key: u8, _head: &H) -> Option<FieldDecoder<'_, H>> {
        let entry = self.entries.get(&key)?;
        Some(Box::new(move |cursor: &mut Cursor, head: H| (entry.decode)(cursor, head)))
    }
}

impl<H> FieldPolicy<H> for FieldTable<H> {
    fn fields<'h>(&self, head: &'h H) -> Vec<(u8, FieldWriter<'h>)> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| {
                let write = entry.write.as_ref()?;
                Some((*key, write(head)?))
            })
            .collect()
    }
}
