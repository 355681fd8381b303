//! Tests for Store
//!
//! These tests verify:
//! - Basic get/put/delete operations
//! - Empty-key and missing-key handling
//! - Store lifecycle (open/close)
//! - Accessors

use minidb::config::{Config, SyncStrategy};
use minidb::{MiniDbError, Store, DATA_FILE_NAME};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::EveryWrite) // Sync every write for test reliability
        .build();
    let store = Store::open_with(config).unwrap();
    (temp_dir, store)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_creates_directory_and_log() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("mydb");

    let store = Store::open(&data_dir).unwrap();

    assert!(data_dir.exists());
    assert!(data_dir.join(DATA_FILE_NAME).exists());
    assert!(store.dir().is_absolute());
    assert!(store.is_empty());
}

#[test]
fn test_put_get() {
    let (_temp, store) = setup_temp_store();

    store.put(b"hello", b"world").unwrap();

    assert_eq!(store.get(b"hello").unwrap(), b"world".to_vec());
}

#[test]
fn test_get_nonexistent_key() {
    let (_temp, store) = setup_temp_store();

    let result = store.get(b"nonexistent");

    assert!(matches!(result, Err(MiniDbError::KeyNotFound)));
}

#[test]
fn test_put_overwrite() {
    let (_temp, store) = setup_temp_store();

    store.put(b"key", b"value1").unwrap();
    store.put(b"key", b"value2").unwrap();

    assert_eq!(store.get(b"key").unwrap(), b"value2".to_vec());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_put_empty_value() {
    let (_temp, store) = setup_temp_store();

    store.put(b"key", b"").unwrap();

    assert_eq!(store.get(b"key").unwrap(), Vec::<u8>::new());
    assert!(store.contains_key(b"key"));
}

#[test]
fn test_put_empty_key_is_noop() {
    let (_temp, store) = setup_temp_store();

    store.put(b"", b"value").unwrap();

    assert!(store.is_empty());
    assert_eq!(store.log_size(), 0);
    assert!(store.get(b"").unwrap_err().is_key_not_found());
}

#[test]
fn test_delete() {
    let (_temp, store) = setup_temp_store();

    store.put(b"key", b"value").unwrap();
    assert_eq!(store.get(b"key").unwrap(), b"value".to_vec());

    store.delete(b"key").unwrap();
    assert!(matches!(store.get(b"key"), Err(MiniDbError::KeyNotFound)));
    assert!(!store.contains_key(b"key"));
}

#[test]
fn test_delete_appends_tombstone() {
    let (_temp, store) = setup_temp_store();

    store.put(b"key", b"value").unwrap();
    let before = store.log_size();

    store.delete(b"key").unwrap();

    // Header (10) + key (3)
    assert_eq!(store.log_size(), before + 13);
}

#[test]
fn test_delete_nonexistent_key_is_noop() {
    let (_temp, store) = setup_temp_store();
    store.put(b"other", b"value").unwrap();
    let before = store.log_size();

    store.delete(b"nonexistent").unwrap();

    assert_eq!(store.log_size(), before);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_delete_twice_is_idempotent() {
    let (_temp, store) = setup_temp_store();
    store.put(b"key", b"value").unwrap();

    store.delete(b"key").unwrap();
    let after_first = store.log_size();
    store.delete(b"key").unwrap();

    assert_eq!(store.log_size(), after_first);
    assert!(store.get(b"key").unwrap_err().is_key_not_found());
}

#[test]
fn test_delete_empty_key_is_noop() {
    let (_temp, store) = setup_temp_store();

    store.delete(b"").unwrap();

    assert_eq!(store.log_size(), 0);
}

#[test]
fn test_put_after_delete() {
    let (_temp, store) = setup_temp_store();

    store.put(b"key", b"v1").unwrap();
    store.delete(b"key").unwrap();
    store.put(b"key", b"v2").unwrap();

    assert_eq!(store.get(b"key").unwrap(), b"v2".to_vec());
}

#[test]
fn test_multiple_keys() {
    let (_temp, store) = setup_temp_store();

    store.put(b"key1", b"value1").unwrap();
    store.put(b"key2", b"value2").unwrap();
    store.put(b"key3", b"value3").unwrap();

    assert_eq!(store.get(b"key1").unwrap(), b"value1".to_vec());
    assert_eq!(store.get(b"key2").unwrap(), b"value2".to_vec());
    assert_eq!(store.get(b"key3").unwrap(), b"value3".to_vec());
    assert_eq!(store.len(), 3);
}

#[test]
fn test_binary_keys_and_values() {
    let (_temp, store) = setup_temp_store();
    let key = [0u8, 255, 1, 254];
    let value: Vec<u8> = (0..=255u8).collect();

    store.put(&key, &value).unwrap();

    assert_eq!(store.get(&key).unwrap(), value);
}

#[test]
fn test_large_value() {
    let (_temp, store) = setup_temp_store();
    let value = vec![0xABu8; 1024 * 1024];

    store.put(b"big", &value).unwrap();

    assert_eq!(store.get(b"big").unwrap(), value);
}

// =============================================================================
// Log Accounting Tests
// =============================================================================

#[test]
fn test_log_size_grows_by_encoded_len() {
    let (_temp, store) = setup_temp_store();

    store.put(b"ab", b"xyz").unwrap();
    assert_eq!(store.log_size(), 10 + 2 + 3);

    store.put(b"ab", b"").unwrap();
    assert_eq!(store.log_size(), 15 + 10 + 2);
}

#[test]
fn test_keys_snapshot() {
    let (_temp, store) = setup_temp_store();
    store.put(b"a", b"1").unwrap();
    store.put(b"b", b"2").unwrap();
    store.put(b"c", b"3").unwrap();
    store.delete(b"b").unwrap();

    let mut keys = store.keys();
    keys.sort();

    assert_eq!(keys, vec![b"a".to_vec(), b"c".to_vec()]);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_close_and_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let store = Store::open(temp_dir.path()).unwrap();
    store.put(b"persist", b"me").unwrap();
    store.close().unwrap();

    let store = Store::open(temp_dir.path()).unwrap();
    assert_eq!(store.get(b"persist").unwrap(), b"me".to_vec());
}

#[test]
fn test_sync() {
    let (_temp, store) = setup_temp_store();

    store.put(b"k", b"v").unwrap();
    store.sync().unwrap();

    assert_eq!(store.get(b"k").unwrap(), b"v".to_vec());
}

#[test]
fn test_config_accessor() {
    let (temp, store) = setup_temp_store();

    assert_eq!(store.config().sync_strategy, SyncStrategy::EveryWrite);
    assert_eq!(store.config().data_dir, temp.path());
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.data_dir, std::path::PathBuf::from("./minidb_data"));
    assert_eq!(
        config.sync_strategy,
        SyncStrategy::EveryNEntries { count: 100 }
    );
}
