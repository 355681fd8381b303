//! Log File Manager
//!
//! Owns the append-only file handle and the write frontier.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::SyncStrategy;
use crate::error::{MiniDbError, Result};

use super::entry::{Entry, EntryHeader, HEADER_SIZE};
use super::scan::LogScanner;

/// Append-only data file with positional reads
///
/// ## Concurrency:
/// - `append`/`truncate`/`sync` take `&mut self`; the owner serializes them
/// - `read_at` takes `&self` and uses positional reads, so any number of
///   readers can share the file without a seek cursor
pub struct LogFile {
    /// Location of the file on disk
    path: PathBuf,
    file: File,
    /// Next free byte. Everything in `[0, write_offset)` is a complete record.
    write_offset: u64,
    sync_strategy: SyncStrategy,
    /// Appends written since the last fsync
    uncommitted: usize,
}

impl LogFile {
    /// Open or create a log file, positioning the frontier at its current length
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| MiniDbError::io_at("open", path, e))?;

        Self::attach(path, file, sync_strategy)
    }

    /// Create an empty log file, discarding anything already at `path`
    pub fn create(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| MiniDbError::io_at("create", path, e))?;

        Self::attach(path, file, sync_strategy)
    }

    fn attach(path: &Path, file: File, sync_strategy: SyncStrategy) -> Result<Self> {
        let write_offset = file
            .metadata()
            .map_err(|e| MiniDbError::io_at("stat", path, e))?
            .len();

        debug!(path = %path.display(), write_offset, "log file attached");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_offset,
            sync_strategy,
            uncommitted: 0,
        })
    }

    /// Append an entry at the frontier, returning the offset it was written at
    ///
    /// The frontier only moves once the whole record is on the file and any
    /// fsync due under the sync strategy has succeeded. On error the file is
    /// rolled back to the old frontier, so `Err` always means "not written".
    pub fn append(&mut self, entry: &Entry) -> Result<u64> {
        self.append_with(entry, Self::sync_if_due)
    }

    fn append_with<F>(&mut self, entry: &Entry, commit: F) -> Result<u64>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let offset = self.write_offset;
        let buf = entry.encode();

        let written = write_all_at(&self.file, &buf, offset)
            .map_err(|e| MiniDbError::io_at("write", &self.path, e));
        if let Err(e) = written.and_then(|()| commit(self)) {
            self.roll_back(offset);
            return Err(e);
        }

        self.write_offset += buf.len() as u64;
        Ok(offset)
    }

    /// Count the pending append and fsync if the strategy says so
    fn sync_if_due(&mut self) -> Result<()> {
        let due = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.uncommitted + 1 >= count,
        };
        if due {
            self.sync()
        } else {
            self.uncommitted += 1;
            Ok(())
        }
    }

    /// Cut anything past `offset` so a later open does not scan into it
    fn roll_back(&mut self, offset: u64) {
        if let Err(e) = self.file.set_len(offset) {
            warn!(offset, error = %e, "failed to roll back failed append");
        }
    }

    /// Read the complete entry that starts at `offset`
    ///
    /// Returns:
    /// - `Err(EndOfLog)`: `offset` is at or past the frontier
    /// - `Err(TruncatedRecord)`: header or payload runs past the frontier
    /// - `Err(InvalidRecord)`: malformed header
    pub fn read_at(&self, offset: u64) -> Result<Entry> {
        let len = self.write_offset;
        if offset >= len {
            return Err(MiniDbError::EndOfLog);
        }

        let available = len - offset;
        if available < HEADER_SIZE as u64 {
            return Err(MiniDbError::TruncatedRecord {
                offset,
                needed: HEADER_SIZE as u64,
                available,
            });
        }

        let mut header_buf = [0u8; HEADER_SIZE];
        read_exact_at(&self.file, &mut header_buf, offset)
            .map_err(|e| MiniDbError::io_at("read", &self.path, e))?;
        let header = EntryHeader::decode(&header_buf, offset)?;

        // Validate sizes before allocating for the payload
        let needed = header.record_len();
        if needed > available {
            return Err(MiniDbError::TruncatedRecord {
                offset,
                needed,
                available,
            });
        }

        let key_offset = offset + HEADER_SIZE as u64;
        let mut key = vec![0u8; header.key_size as usize];
        read_exact_at(&self.file, &mut key, key_offset)
            .map_err(|e| MiniDbError::io_at("read", &self.path, e))?;

        let mut value = vec![0u8; header.value_size as usize];
        if !value.is_empty() {
            read_exact_at(&self.file, &mut value, key_offset + header.key_size as u64)
                .map_err(|e| MiniDbError::io_at("read", &self.path, e))?;
        }

        Ok(Entry::from_parts(&header, key, value))
    }

    /// Iterate over every record from offset 0
    pub fn scan(&self) -> LogScanner<'_> {
        LogScanner::new(self, 0)
    }

    /// Iterate over every record from `offset`
    pub fn scan_from(&self, offset: u64) -> LogScanner<'_> {
        LogScanner::new(self, offset)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| MiniDbError::io_at("sync", &self.path, e))?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Cut the file (and frontier) back to `len` bytes
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        self.file
            .set_len(len)
            .map_err(|e| MiniDbError::io_at("truncate", &self.path, e))?;
        self.write_offset = len;
        self.sync()
    }

    /// Logical length of the log (the write frontier)
    pub fn len(&self) -> u64 {
        self.write_offset
    }

    pub fn is_empty(&self) -> bool {
        self.write_offset == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends not yet covered by an fsync
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    pub(crate) fn set_sync_strategy(&mut self, sync_strategy: SyncStrategy) {
        self.sync_strategy = sync_strategy;
    }

    /// Record that the file now lives at `path` (after an external rename)
    pub(crate) fn renamed(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }
}

// =============================================================================
// Positional I/O
// =============================================================================

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ))
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
