//! Log Module
//!
//! The append-only data file every write lands in.
//!
//! ## Responsibilities
//! - Encode/decode individual records
//! - Append records at the write frontier
//! - Positional reads of a record at a known offset
//! - Sequential scans for recovery and merge
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Entry 1 (offset 0)                                           │
//! │ ┌──────────────┬────────────────┬──────────┬─────┬────────┐ │
//! │ │ KeySize (4)  │ ValueSize (4)  │ Mark (2) │ Key │ Value  │ │
//! │ └──────────────┴────────────────┴──────────┴─────┴────────┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Entry 2 (offset 10 + KeySize₁ + ValueSize₁)                  │
//! │ ...                                                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//! All integers are big-endian. Mark 0 = PUT, 1 = DELETE (ValueSize 0).
//! Records are packed back to back with no padding.

mod entry;
mod file;
mod scan;

pub use entry::{Entry, EntryHeader, Mark, HEADER_SIZE};
pub use file::LogFile;
pub use scan::LogScanner;
