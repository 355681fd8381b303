//! Store Module
//!
//! The storage engine that coordinates the log file and the index.
//!
//! ## Responsibilities
//! - Append PUT/DELETE records and keep the index pointing at live values
//! - Serve point lookups through the index
//! - Rebuild the index from the log on startup
//! - Run merges that rewrite the log down to its live records

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{MiniDbError, Result};
use crate::index::Index;
use crate::log::{Entry, LogFile};
use crate::merge;

/// Name of the active log file inside the store directory
pub const DATA_FILE_NAME: &str = "minidb.data";

/// Name of the transient file a merge writes before it is renamed over the log
pub const MERGE_FILE_NAME: &str = "minidb.data.merge";

/// Mutable state shared by all callers, guarded as one unit
pub(crate) struct StoreState {
    pub(crate) index: Index,
    pub(crate) log: LogFile,
}

/// Outcome of replaying the log during `open`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Complete records read from the log
    pub entries_scanned: u64,
    pub puts: u64,
    pub deletes: u64,
    /// Keys live after replay
    pub live_keys: usize,
    /// Bytes of a torn tail record cut from the end of the log
    pub truncated_bytes: u64,
}

/// An embedded key-value store over a single append-only log
///
/// ## Concurrency Model
///
/// Index and log live together in one `RwLock<StoreState>`:
/// - **Writes** (put/delete/merge/sync): exclusive lock for the whole operation,
///   so appends never collide on the frontier and merge never swaps the file
///   under a reader
/// - **Reads** (get/contains_key/len/keys): shared lock; the log uses
///   positional reads so readers run in parallel
///
/// It is the only lock in the store and is held only around the file I/O it guards.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Absolute path of the store directory
    dir: PathBuf,

    /// Index + active log
    state: RwLock<StoreState>,

    /// What `open` found in the log
    recovery: RecoveryStats,
}

impl Store {
    /// Open or create a store in `path` with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().data_dir(path.as_ref()).build();
        Self::open_with(config)
    }

    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory and resolve it to an absolute path
    /// 2. Remove a merge file left behind by an interrupted merge
    /// 3. Open/create the log
    /// 4. Replay the log to rebuild the index
    pub fn open_with(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)
            .map_err(|e| MiniDbError::io_at("create_dir", &config.data_dir, e))?;
        let dir = fs::canonicalize(&config.data_dir)
            .map_err(|e| MiniDbError::io_at("canonicalize", &config.data_dir, e))?;

        // The canonical log is always complete; a leftover merge file never is.
        let merge_path = dir.join(MERGE_FILE_NAME);
        if merge_path.exists() {
            warn!(path = %merge_path.display(), "removing stale merge file");
            fs::remove_file(&merge_path)
                .map_err(|e| MiniDbError::io_at("remove", &merge_path, e))?;
        }

        let mut log = LogFile::open(&dir.join(DATA_FILE_NAME), config.sync_strategy)?;
        let mut index = Index::new();
        let recovery = Self::rebuild_index(&mut log, &mut index)?;

        info!(
            dir = %dir.display(),
            entries = recovery.entries_scanned,
            live_keys = recovery.live_keys,
            log_bytes = log.len(),
            "store opened"
        );

        Ok(Self {
            config,
            dir,
            state: RwLock::new(StoreState { index, log }),
            recovery,
        })
    }

    /// Replay every record in file order: PUT sets the key, DELETE clears it
    fn rebuild_index(log: &mut LogFile, index: &mut Index) -> Result<RecoveryStats> {
        let mut stats = RecoveryStats::default();
        let mut torn_at = None;

        for item in log.scan() {
            match item {
                Ok((offset, entry)) => {
                    stats.entries_scanned += 1;
                    match entry {
                        Entry::Put { .. } => stats.puts += 1,
                        Entry::Delete { .. } => stats.deletes += 1,
                    }
                    index.apply(offset, &entry);
                }
                // A record running past the end is treated as a torn append and
                // cut off. The scanner stops here, so it is always the last item.
                // A corrupt header whose key_size or value_size points past the
                // end of the file also lands here and is truncated the same way.
                Err(MiniDbError::TruncatedRecord { offset, .. }) => torn_at = Some(offset),
                Err(e) => return Err(e),
            }
        }

        if let Some(offset) = torn_at {
            stats.truncated_bytes = log.len() - offset;
            warn!(
                offset,
                bytes = stats.truncated_bytes,
                "dropping torn record at end of log"
            );
            log.truncate(offset)?;
        }

        stats.live_keys = index.len();
        Ok(stats)
    }

    /// Get a value by key
    ///
    /// Returns `Err(KeyNotFound)` when the key was never written or was deleted.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let state = self.state.read();

        let offset = state.index.get(key).ok_or(MiniDbError::KeyNotFound)?;
        let entry = state.log.read_at(offset).map_err(|e| match e {
            MiniDbError::EndOfLog => MiniDbError::invalid(offset, "indexed offset is past the end of the log"),
            e => e,
        })?;

        match entry {
            Entry::Put { key: stored, value } if stored == key => Ok(value),
            _ => Err(MiniDbError::invalid(
                offset,
                "indexed record is not a value for the requested key",
            )),
        }
    }

    /// Put a key-value pair
    ///
    /// Empty keys are ignored. On failure the index is left untouched.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        check_field_len("key", key)?;
        check_field_len("value", value)?;

        let mut state = self.state.write();

        let offset = state.log.append(&Entry::put(key, value))?;
        state.index.insert(key.to_vec(), offset);

        debug!(offset, key_len = key.len(), value_len = value.len(), "put");
        Ok(())
    }

    /// Delete a key
    ///
    /// Empty or absent keys are a no-op. Otherwise a tombstone is appended so
    /// the delete survives a restart, then the key leaves the index.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write();

        if !state.index.contains_key(key) {
            return Ok(());
        }

        let offset = state.log.append(&Entry::delete(key))?;
        state.index.remove(key);

        debug!(offset, key_len = key.len(), "delete");
        Ok(())
    }

    /// Rewrite the log so it only holds the live value of each key
    ///
    /// Blocks all other operations while it runs. All-or-nothing: on error the
    /// existing log and index are unchanged.
    pub fn merge(&self) -> Result<()> {
        let mut state = self.state.write();

        let stats = merge::merge(&mut state, &self.dir, self.config.sync_strategy)?;

        info!(
            scanned = stats.entries_scanned,
            live = stats.live_entries,
            bytes_before = stats.bytes_before,
            bytes_after = stats.bytes_after,
            "merge finished"
        );
        Ok(())
    }

    /// Force all appended records to disk
    pub fn sync(&self) -> Result<()> {
        self.state.write().log.sync()
    }

    /// Close the store gracefully
    ///
    /// Syncs the log and releases the file handle.
    pub fn close(self) -> Result<()> {
        let mut state = self.state.into_inner();
        state.log.sync()?;

        info!(dir = %self.dir.display(), log_bytes = state.log.len(), "store closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the absolute store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.state.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().index.is_empty()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.state.read().index.contains_key(key)
    }

    /// Snapshot of all live keys (unordered)
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.state.read().index.keys().map(<[u8]>::to_vec).collect()
    }

    /// Current length of the log in bytes
    pub fn log_size(&self) -> u64 {
        self.state.read().log.len()
    }

    /// Statistics from the index rebuild performed by `open`
    pub fn recovery_stats(&self) -> &RecoveryStats {
        &self.recovery
    }
}

fn check_field_len(what: &'static str, bytes: &[u8]) -> Result<()> {
    if bytes.len() > u32::MAX as usize {
        return Err(MiniDbError::TooLarge {
            what,
            len: bytes.len(),
        });
    }
    Ok(())
}
