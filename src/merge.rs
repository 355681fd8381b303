//! Merge / Compaction
//!
//! Rewrites the log down to the latest PUT of every live key.
//!
//! ## Steps
//! 1. Scan the log; a record is live iff the index points at its own offset.
//!    Superseded PUTs point elsewhere and deleted keys are not indexed, so both
//!    drop out along with every tombstone.
//! 2. Append the live records, in scan order, to `minidb.data.merge`.
//! 3. fsync the merge file and rename it over `minidb.data`.
//! 4. Swap in the renamed file as the active log and the rebased index.
//!
//! The canonical file is only replaced by a complete, synced file, so a crash
//! at any point leaves exactly one valid log under the canonical name.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::SyncStrategy;
use crate::error::{MiniDbError, Result};
use crate::index::Index;
use crate::log::{Entry, LogFile};
use crate::store::{StoreState, DATA_FILE_NAME, MERGE_FILE_NAME};

/// Merge file appends never fsync individually; it is synced once before the rename
const DEFERRED_SYNC: SyncStrategy = SyncStrategy::EveryNEntries { count: usize::MAX };

/// Counters describing one merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MergeStats {
    pub entries_scanned: u64,
    pub live_entries: u64,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

/// Run a merge over `state`. The caller holds the store's write lock.
pub(crate) fn merge(state: &mut StoreState, dir: &Path, sync_strategy: SyncStrategy) -> Result<MergeStats> {
    let mut stats = MergeStats {
        bytes_before: state.log.len(),
        ..MergeStats::default()
    };

    // Step 1: select live records
    let mut live: Vec<Entry> = Vec::new();
    for item in state.log.scan() {
        let (offset, entry) = item?;
        stats.entries_scanned += 1;
        if !entry.is_tombstone() && state.index.is_live(entry.key(), offset) {
            live.push(entry);
        }
    }
    stats.live_entries = live.len() as u64;

    if live.is_empty() {
        debug!(scanned = stats.entries_scanned, "nothing live, merge skipped");
        stats.bytes_after = stats.bytes_before;
        return Ok(stats);
    }

    let data_path = dir.join(DATA_FILE_NAME);
    let merge_path = dir.join(MERGE_FILE_NAME);

    // Step 2 + 3a: write and sync the replacement
    let (merged, staged) = match write_merge_file(&live, &merge_path) {
        Ok(written) => written,
        Err(e) => {
            discard(&merge_path);
            return Err(e);
        }
    };

    // Step 3b: atomic swap
    if let Err(e) = fs::rename(&merge_path, &data_path) {
        drop(merged);
        discard(&merge_path);
        return Err(MiniDbError::io_at("rename", &merge_path, e));
    }

    // Step 4: the renamed handle becomes the active log; dropping the old
    // handle releases the replaced file
    let mut merged = merged.renamed(data_path);
    merged.set_sync_strategy(sync_strategy);
    stats.bytes_after = merged.len();
    state.log = merged;
    state.index = staged;

    if let Err(e) = sync_dir(dir) {
        warn!(dir = %dir.display(), error = %e, "directory sync after merge failed");
    }

    Ok(stats)
}

/// Append `live` to a fresh merge file, returning it with the rebased index
fn write_merge_file(live: &[Entry], path: &Path) -> Result<(LogFile, Index)> {
    let mut merged = LogFile::create(path, DEFERRED_SYNC)?;
    let mut staged = Index::new();

    for entry in live {
        let offset = merged.append(entry)?;
        staged.insert(entry.key().to_vec(), offset);
    }
    merged.sync()?;

    Ok((merged, staged))
}

/// Best-effort removal of a partial merge file
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove merge file");
        }
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
