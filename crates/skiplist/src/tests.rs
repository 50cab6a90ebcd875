use super::*;

fn rec(key: &str, value: &str) -> Arc<KVRecord> {
    Arc::new(KVRecord::live(key.as_bytes().to_vec(), value.as_bytes().to_vec()))
}

#[test]
fn insert_and_get_single_key() {
    let list = SkipList::new();
    list.insert(rec("a", "1"));
    let got = list.get(b"a").unwrap();
    assert_eq!(got.value, b"1");
}

#[test]
fn get_missing_key_returns_none() {
    let list = SkipList::new();
    list.insert(rec("a", "1"));
    assert!(list.get(b"z").is_none());
}

#[test]
fn overwrite_returns_newest_insert() {
    let list = SkipList::new();
    list.insert(rec("k", "v1"));
    list.insert(rec("k", "v2"));
    assert_eq!(list.get(b"k").unwrap().value, b"v2");
}

#[test]
fn tombstone_masks_older_live_value() {
    let list = SkipList::new();
    list.insert(rec("k", "v"));
    list.insert(Arc::new(KVRecord::tombstone(b"k".to_vec())));
    assert!(list.get(b"k").is_none());
    // get_entry still exposes the tombstone itself
    assert!(!list.get_entry(b"k").unwrap().is_live());
}

#[test]
fn iterate_yields_ascending_key_order() {
    let list = SkipList::new();
    for k in ["delta", "alpha", "charlie", "bravo"] {
        list.insert(rec(k, k));
    }
    let keys: Vec<Vec<u8>> = list.iter().map(|r| r.key.clone()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn iterate_with_duplicate_keys_keeps_insertion_order_for_the_run() {
    let list = SkipList::new();
    list.insert(rec("k", "v1"));
    list.insert(rec("k", "v2"));
    list.insert(rec("k", "v3"));
    let values: Vec<Vec<u8>> = list
        .iter()
        .filter(|r| r.key == b"k")
        .map(|r| r.value.clone())
        .collect();
    assert_eq!(values, vec![b"v1".to_vec(), b"v2".to_vec(), b"v3".to_vec()]);
}

#[test]
fn bulk_load_10k_unique_keys_round_trips() {
    let list = SkipList::new();
    for i in 0..10_000u32 {
        let k = format!("key{i:05}");
        list.insert(rec(&k, &k));
    }
    for i in 0..10_000u32 {
        let k = format!("key{i:05}");
        assert_eq!(list.get(k.as_bytes()).unwrap().value, k.as_bytes());
    }
}

#[test]
fn height_distribution_respects_h_max_and_is_deterministic_for_a_given_seed() {
    let list1 = SkipList::with_seed(42);
    let list2 = SkipList::with_seed(42);
    for i in 0..500u32 {
        let k = format!("k{i}");
        list1.insert(rec(&k, &k));
        list2.insert(rec(&k, &k));
    }
    // Same seed, same insert sequence => same resulting max height.
    assert_eq!(
        list1.max_height.load(Ordering::Relaxed),
        list2.max_height.load(Ordering::Relaxed)
    );
    assert!(list1.max_height.load(Ordering::Relaxed) <= H_MAX);
}

#[test]
fn empty_list_reports_is_empty() {
    let list = SkipList::new();
    assert!(list.is_empty());
    list.insert(rec("a", "1"));
    assert!(!list.is_empty());
}
