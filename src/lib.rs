//! # MiniDB
//!
//! A minimal log-structured key-value store with:
//! - A single append-only data file
//! - An in-memory index from key to record offset
//! - Index rebuild from the log on open (crash recovery)
//! - Merge compaction that drops overwritten and deleted records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Store                                │
//! │          put / get / delete / merge / close                  │
//! │              RwLock<Index + LogFile>                         │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!         ┌─────────────┐               ┌──────────────┐
//!         │    Index    │               │   LogFile    │
//!         │ key → offset│               │ minidb.data  │
//!         └─────────────┘               └──────┬───────┘
//!                                              │
//!                                              ▼
//!                                       ┌──────────────┐
//!                                       │ Entry codec  │
//!                                       │ 10-byte hdr  │
//!                                       └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use minidb::Store;
//!
//! let store = Store::open("./minidb_data")?;
//! store.put(b"hello", b"world")?;
//! assert_eq!(store.get(b"hello")?, b"world".to_vec());
//! store.delete(b"hello")?;
//! store.merge()?;
//! store.close()?;
//! # Ok::<(), minidb::MiniDbError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod index;
pub mod store;
mod merge;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MiniDbError, Result};
pub use config::{Config, SyncStrategy};
pub use store::{RecoveryStats, Store, DATA_FILE_NAME, MERGE_FILE_NAME};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of MiniDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
