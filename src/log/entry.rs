//! Log Entry definitions
//!
//! Defines the structure of individual log records and their wire encoding.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{MiniDbError, Result};

/// Header size: KeySize (4) + ValueSize (4) + Mark (2) = 10 bytes
pub const HEADER_SIZE: usize = 10;

/// Record kind tag as stored in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Mark {
    Put = 0,
    Delete = 1,
}

impl Mark {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Mark::Put),
            1 => Some(Mark::Delete),
            _ => None,
        }
    }
}

/// A single record in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Set a key to a value
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Tombstone for a key (always carries an empty value)
    Delete { key: Vec<u8> },
}

impl Entry {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Entry::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Entry::Delete { key: key.into() }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Entry::Put { key, .. } | Entry::Delete { key } => key,
        }
    }

    /// The stored value, `None` for tombstones
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Entry::Put { value, .. } => Some(value),
            Entry::Delete { .. } => None,
        }
    }

    pub fn mark(&self) -> Mark {
        match self {
            Entry::Put { .. } => Mark::Put,
            Entry::Delete { .. } => Mark::Delete,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Entry::Delete { .. })
    }

    /// Header describing this entry's encoding
    pub fn header(&self) -> EntryHeader {
        EntryHeader {
            key_size: self.key().len() as u32,
            value_size: self.value().map_or(0, |v| v.len() as u32),
            mark: self.mark(),
        }
    }

    /// Total bytes this entry occupies in the log
    pub fn encoded_len(&self) -> u64 {
        self.header().record_len()
    }

    /// Encode as `[key_size][value_size][mark][key][value]`, big-endian
    pub fn encode(&self) -> Bytes {
        let header = self.header();
        let mut buf = BytesMut::with_capacity(header.record_len() as usize);

        buf.put_u32(header.key_size);
        buf.put_u32(header.value_size);
        buf.put_u16(header.mark.as_u16());
        buf.put_slice(self.key());
        if let Some(value) = self.value() {
            buf.put_slice(value);
        }

        buf.freeze()
    }

    /// Rebuild an entry from a decoded header and its payload
    pub fn from_parts(header: &EntryHeader, key: Vec<u8>, value: Vec<u8>) -> Self {
        match header.mark {
            Mark::Put => Entry::Put { key, value },
            Mark::Delete => Entry::Delete { key },
        }
    }
}

/// Fixed-size record prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    pub key_size: u32,
    pub value_size: u32,
    pub mark: Mark,
}

impl EntryHeader {
    /// Decode the header only; the caller reads the payload that follows.
    ///
    /// `offset` is the record's position in the log and is used for error reporting.
    pub fn decode(buf: &[u8], offset: u64) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(MiniDbError::invalid(
                offset,
                format!("header needs {} bytes, got {}", HEADER_SIZE, buf.len()),
            ));
        }

        let mut cursor = &buf[..HEADER_SIZE];
        let key_size = cursor.get_u32();
        let value_size = cursor.get_u32();
        let raw_mark = cursor.get_u16();

        let mark = Mark::from_u16(raw_mark)
            .ok_or_else(|| MiniDbError::invalid(offset, format!("unknown mark {}", raw_mark)))?;

        if key_size == 0 {
            return Err(MiniDbError::invalid(offset, "empty key"));
        }
        if mark == Mark::Delete && value_size != 0 {
            return Err(MiniDbError::invalid(
                offset,
                format!("tombstone declares value_size {}", value_size),
            ));
        }

        Ok(Self {
            key_size,
            value_size,
            mark,
        })
    }

    /// Header plus payload length
    pub fn record_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.key_size as u64 + self.value_size as u64
    }
}
