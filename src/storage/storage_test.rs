use super::*;

#[test]
fn memory_storage_round_trips_and_removes() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("k").unwrap(), None);

    storage.set("k", "v1").unwrap();
    storage.set("k", "v2").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));

    storage.remove("k").unwrap();
    assert_eq!(storage.raw("k"), None);
}

#[test]
fn memory_storage_clones_share_entries() {
    let storage = MemoryStorage::new();
    let other = storage.clone();
    storage.set("user_info", "blob").unwrap();
    assert_eq!(other.raw("user_info").as_deref(), Some("blob"));
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn browser_storage_is_unavailable_outside_hydrate() {
    let storage = BrowserStorage;
    assert_eq!(storage.get("k"), Err(StorageError::Unavailable));
    assert_eq!(storage.set("k", "v"), Err(StorageError::Unavailable));
    assert_eq!(storage.remove("k"), Err(StorageError::Unavailable));
}
