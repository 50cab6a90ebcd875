use super::helpers::open_engine;
use tempfile::tempdir;

#[test]
fn scenario_s1_insert_then_get_before_any_flush() {
    let dir = tempdir().unwrap();
    let mut engine = open_engine(dir.path(), 1024 * 1024);
    engine.insert(b"a".to_vec(), b"1".to_vec()).unwrap();
    assert_eq!(engine.get(b"a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(engine.get(b"missing").unwrap(), None);
}

#[test]
fn get_populates_cache_from_file_stack_and_stays_consistent() {
    let dir = tempdir().unwrap();
    let mut engine = open_engine(dir.path(), 1024 * 1024);
    engine.insert(b"k".to_vec(), b"v".to_vec()).unwrap();
    engine.freeze_and_flush().unwrap();

    // First get() populates the cache from the file stack; the second
    // should return the same value via the cache hit path.
    assert_eq!(engine.get(b"k").unwrap(), Some(b"v".to_vec()));
    assert_eq!(engine.get(b"k").unwrap(), Some(b"v".to_vec()));
}

#[test]
fn reopening_rediscovers_previously_flushed_data() {
    let dir = tempdir().unwrap();
    {
        let mut engine = open_engine(dir.path(), 1024 * 1024);
        engine.insert(b"k".to_vec(), b"v".to_vec()).unwrap();
        engine.shutdown().unwrap();
    }
    let mut reopened = open_engine(dir.path(), 1024 * 1024);
    assert_eq!(reopened.get(b"k").unwrap(), Some(b"v".to_vec()));
}
