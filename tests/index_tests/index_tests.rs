//! Tests for Index
//!
//! These tests verify:
//! - Basic insert/get/remove
//! - Replay semantics (PUT sets, DELETE clears, last writer wins)
//! - Liveness checks used by merge

use minidb::index::Index;
use minidb::log::Entry;

#[test]
fn test_index_starts_empty() {
    let index = Index::new();

    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
    assert_eq!(index.get(b"missing"), None);
}

#[test]
fn test_insert_get_remove() {
    let mut index = Index::new();

    assert_eq!(index.insert(b"k".to_vec(), 10), None);
    assert_eq!(index.get(b"k"), Some(10));
    assert!(index.contains_key(b"k"));

    assert_eq!(index.insert(b"k".to_vec(), 42), Some(10));
    assert_eq!(index.get(b"k"), Some(42));

    assert_eq!(index.remove(b"k"), Some(42));
    assert_eq!(index.get(b"k"), None);
    assert_eq!(index.remove(b"k"), None);
}

#[test]
fn test_apply_put_then_delete() {
    let mut index = Index::new();

    index.apply(0, &Entry::put(b"a".to_vec(), b"1".to_vec()));
    assert_eq!(index.get(b"a"), Some(0));

    index.apply(20, &Entry::delete(b"a".to_vec()));
    assert_eq!(index.get(b"a"), None);
}

#[test]
fn test_apply_last_writer_wins() {
    let mut index = Index::new();

    index.apply(0, &Entry::put(b"a".to_vec(), b"1".to_vec()));
    index.apply(11, &Entry::put(b"b".to_vec(), b"2".to_vec()));
    index.apply(22, &Entry::put(b"a".to_vec(), b"3".to_vec()));

    assert_eq!(index.get(b"a"), Some(22));
    assert_eq!(index.get(b"b"), Some(11));
    assert_eq!(index.len(), 2);
}

#[test]
fn test_apply_put_after_delete_revives() {
    let mut index = Index::new();

    index.apply(0, &Entry::put(b"a".to_vec(), b"1".to_vec()));
    index.apply(11, &Entry::delete(b"a".to_vec()));
    index.apply(22, &Entry::put(b"a".to_vec(), b"2".to_vec()));

    assert_eq!(index.get(b"a"), Some(22));
}

#[test]
fn test_apply_delete_of_unknown_key() {
    let mut index = Index::new();

    index.apply(0, &Entry::delete(b"never".to_vec()));

    assert!(index.is_empty());
}

#[test]
fn test_is_live() {
    let mut index = Index::new();
    index.insert(b"a".to_vec(), 22);

    assert!(index.is_live(b"a", 22));
    assert!(!index.is_live(b"a", 0));
    assert!(!index.is_live(b"b", 22));
}

#[test]
fn test_keys_and_iter() {
    let mut index = Index::new();
    index.insert(b"a".to_vec(), 1);
    index.insert(b"b".to_vec(), 2);

    let mut keys: Vec<&[u8]> = index.keys().collect();
    keys.sort();
    assert_eq!(keys, vec![&b"a"[..], &b"b"[..]]);

    let mut pairs: Vec<(&[u8], u64)> = index.iter().collect();
    pairs.sort();
    assert_eq!(pairs, vec![(&b"a"[..], 1), (&b"b"[..], 2)]);
}
