use super::*;

#[test]
fn get_returns_inserted_value() {
    let cache = RecordCache::new(10);
    assert!(cache.insert("a", 1, 1));

    assert_eq!(cache.get("a"), Some(1));
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.cost(), 1);
}

#[test]
fn evicts_least_recently_used_when_full() {
    let cache = RecordCache::new(3);
    cache.insert("a", 'a', 1);
    cache.insert("b", 'b', 1);
    cache.insert("c", 'c', 1);

    // touch "a" so "b" becomes the eviction candidate
    assert_eq!(cache.get("a"), Some('a'));
    cache.insert("d", 'd', 1);

    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("a"), Some('a'));
    assert_eq!(cache.get("c"), Some('c'));
    assert_eq!(cache.get("d"), Some('d'));
    assert_eq!(cache.cost(), 3);
}

#[test]
fn costly_entries_evict_several() {
    let cache = RecordCache::new(4);
    cache.insert("a", 1, 1);
    cache.insert("b", 2, 1);
    cache.insert("c", 3, 1);
    cache.insert("big", 4, 3);

    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("c"), Some(3));
    assert_eq!(cache.get("big"), Some(4));
    assert_eq!(cache.cost(), 4);
}

#[test]
fn entry_larger_than_capacity_is_rejected() {
    let cache = RecordCache::new(2);
    cache.insert("a", 1, 1);

    assert!(!cache.insert("huge", 2, 3));
    assert_eq!(cache.get("huge"), None);
    assert_eq!(cache.get("a"), Some(1));
}

#[test]
fn reinsert_replaces_cost() {
    let cache = RecordCache::new(5);
    cache.insert("a", 1, 2);
    cache.insert("a", 2, 3);

    assert_eq!(cache.get("a"), Some(2));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.cost(), 3);
}

#[test]
fn zero_capacity_disables_caching() {
    let cache = RecordCache::new(0);

    assert!(!cache.insert("a", 1, 1));
    assert!(cache.is_empty());
    assert_eq!(cache.get("a"), None);
}

#[test]
fn remove_and_clear_release_cost() {
    let cache = RecordCache::new(10);
    cache.insert("a", 1, 2);
    cache.insert("b", 2, 3);

    assert_eq!(cache.remove("a"), Some(1));
    assert_eq!(cache.remove("a"), None);
    assert_eq!(cache.cost(), 3);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.cost(), 0);
}
