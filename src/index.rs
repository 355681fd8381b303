//! Index Module
//!
//! In-memory map from key to the offset of its latest PUT record.
//!
//! The index is derived state: replaying the log from offset 0 with
//! [`Index::apply`] always reproduces it.

use std::collections::HashMap;

use crate::log::Entry;

/// Key → log offset of the live value
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Index {
    offsets: HashMap<Vec<u8>, u64>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.offsets.get(key).copied()
    }

    /// Point `key` at `offset`, returning the offset it replaced
    pub fn insert(&mut self, key: Vec<u8>, offset: u64) -> Option<u64> {
        self.offsets.insert(key, offset)
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<u64> {
        self.offsets.remove(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.offsets.contains_key(key)
    }

    /// Replay one record found at `offset`: PUT sets, DELETE clears
    pub fn apply(&mut self, offset: u64, entry: &Entry) {
        match entry {
            Entry::Put { key, .. } => {
                self.offsets.insert(key.clone(), offset);
            }
            Entry::Delete { key } => {
                self.offsets.remove(key.as_slice());
            }
        }
    }

    /// True when the record at `offset` is the current value of `key`
    pub fn is_live(&self, key: &[u8], offset: u64) -> bool {
        self.get(key) == Some(offset)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.offsets.keys().map(|k| k.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.offsets.iter().map(|(k, &off)| (k.as_slice(), off))
    }
}
