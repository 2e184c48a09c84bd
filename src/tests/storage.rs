use super::{open_storage, FileStorage, MemoryStorage, Storage, STATE_FILE_NAME};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_memory_storage_roundtrip() {
    let mut storage = MemoryStorage::new();
    assert_eq!(storage.get("k").unwrap(), None);

    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

    storage.remove("k").unwrap();
    storage.remove("k").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
}

#[test]
fn test_file_storage_persists_between_handles() {
    let dir = TempDir::new().unwrap();

    let mut storage = FileStorage::in_dir(dir.path()).unwrap();
    storage.set("a", "1").unwrap();
    storage.set("b", "2").unwrap();

    let reopened = FileStorage::in_dir(dir.path()).unwrap();
    assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
    assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    assert_eq!(reopened.path(), dir.path().join(STATE_FILE_NAME));
}

#[test]
fn test_file_storage_remove_keeps_other_keys() {
    let dir = TempDir::new().unwrap();
    let mut storage = FileStorage::in_dir(dir.path()).unwrap();
    storage.set("a", "1").unwrap();
    storage.set("b", "2").unwrap();

    storage.remove("a").unwrap();

    assert_eq!(storage.get("a").unwrap(), None);
    assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_file_storage_missing_file_reads_empty() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::in_dir(&dir.path().join("nested")).unwrap();
    assert_eq!(storage.get("anything").unwrap(), None);
}

#[test]
fn test_file_storage_recovers_from_corrupt_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(STATE_FILE_NAME), "{truncated").unwrap();
    let mut storage = FileStorage::in_dir(dir.path()).unwrap();
    assert!(storage.get("k").is_err());

    storage.set("k", "v").unwrap();

    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    let backup = fs::read_to_string(dir.path().join("collapse-state.json.corrupt")).unwrap();
    assert_eq!(backup, "{truncated");
}

#[test]
fn test_file_storage_remove_recovers_from_corrupt_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(STATE_FILE_NAME), "not json").unwrap();
    let mut storage = FileStorage::in_dir(dir.path()).unwrap();

    storage.remove("k").unwrap();
    storage.set("a", "1").unwrap();

    assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_open_storage_falls_back_to_memory() {
    let dir = TempDir::new().unwrap();
    // A regular file where the state directory should be
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let mut storage = open_storage(&blocker.join("state").to_string_lossy());
    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    assert!(!blocker.join("state").exists());
}
