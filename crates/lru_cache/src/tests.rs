use super::*;

#[test]
fn insert_and_get_round_trips() {
    let mut cache: LruCache<u32, u32> = LruCache::new(4);
    cache.insert(1, 100);
    cache.insert(2, 200);
    assert_eq!(cache.get(&1), Some(100));
    assert_eq!(cache.get(&2), Some(200));
    assert_eq!(cache.get(&3), None);
}

#[test]
fn insert_existing_key_updates_value_without_growing_size() {
    let mut cache: LruCache<u32, u32> = LruCache::new(4);
    cache.insert(1, 100);
    cache.insert(1, 101);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&1), Some(101));
}

#[test]
fn capacity_is_never_exceeded() {
    let mut cache: LruCache<u32, u32> = LruCache::new(2);
    cache.insert(1, 10);
    cache.insert(2, 20);
    cache.insert(3, 30);
    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(&1));
    assert!(cache.contains(&2));
    assert!(cache.contains(&3));
}

#[test]
fn least_recently_used_entry_is_evicted_first() {
    let mut cache: LruCache<u32, u32> = LruCache::new(2);
    cache.insert(1, 10);
    cache.insert(2, 20);
    cache.get(&1); // touch 1, making 2 the LRU entry
    cache.insert(3, 30);
    assert!(cache.contains(&1));
    assert!(!cache.contains(&2));
    assert!(cache.contains(&3));
}

#[test]
fn scenario_s6_recency_and_eviction() {
    let mut cache: LruCache<u32, u32> = LruCache::new(2);
    cache.insert(1, 10);
    cache.insert(2, 20);
    cache.insert(3, 30);
    assert!(!cache.contains(&1));

    cache.get(&2);
    cache.insert(4, 40);
    assert!(!cache.contains(&3));
    assert!(cache.contains(&2));
    assert!(cache.contains(&4));
}

#[test]
fn explicit_remove_drops_entry_and_shrinks_size() {
    let mut cache: LruCache<u32, u32> = LruCache::new(4);
    cache.insert(1, 10);
    cache.insert(2, 20);
    cache.remove(&1);
    assert_eq!(cache.len(), 1);
    assert!(!cache.contains(&1));
    assert!(cache.contains(&2));
}

#[test]
fn remove_missing_key_is_a_no_op() {
    let mut cache: LruCache<u32, u32> = LruCache::new(4);
    cache.insert(1, 10);
    cache.remove(&99);
    assert_eq!(cache.len(), 1);
}

#[test]
fn rehashing_is_transparent_across_many_insertions() {
    let mut cache: LruCache<u32, u32> = LruCache::new(10_000);
    for i in 0..8_000u32 {
        cache.insert(i, i * 2);
    }
    assert_eq!(cache.len(), 8_000);
    for i in 0..8_000u32 {
        assert_eq!(cache.get(&i), Some(i * 2));
    }
}

#[test]
fn eviction_keeps_table_and_list_consistent_under_churn() {
    let mut cache: LruCache<u32, u32> = LruCache::new(100);
    for i in 0..5_000u32 {
        cache.insert(i, i);
    }
    assert_eq!(cache.len(), 100);
    for i in 4_900..5_000u32 {
        assert!(cache.contains(&i));
    }
    for i in 0..4_900u32 {
        assert!(!cache.contains(&i));
    }
}

#[test]
fn empty_cache_reports_is_empty() {
    let cache: LruCache<u32, u32> = LruCache::new(4);
    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
}
