//! Log Scanner
//!
//! Sequential iteration over all records in a log file.

use crate::error::{MiniDbError, Result};

use super::{Entry, LogFile};

/// Iterator over `(offset, entry)` pairs in file order
///
/// Stops cleanly at the frontier. Any other error is yielded once and then
/// the iterator is exhausted.
pub struct LogScanner<'a> {
    log: &'a LogFile,
    /// Offset of the next record to read
    offset: u64,
    done: bool,
}

impl<'a> LogScanner<'a> {
    pub(super) fn new(log: &'a LogFile, offset: u64) -> Self {
        Self {
            log,
            offset,
            done: false,
        }
    }

    /// Offset the next call to `next()` will read from
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<'a> Iterator for LogScanner<'a> {
    type Item = Result<(u64, Entry)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.log.read_at(self.offset) {
            Ok(entry) => {
                let offset = self.offset;
                self.offset += entry.encoded_len();
                Some(Ok((offset, entry)))
            }
            Err(MiniDbError::EndOfLog) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for LogScanner<'_> {}
