use config::EngineConfig;
use engine::Engine;
use tempfile::tempdir;

fn config_for(dir: &std::path::Path) -> EngineConfig {
    EngineConfig {
        sst_dir: dir.to_path_buf(),
        sst_prefix: "riptide-".to_string(),
        cache_capacity: 16,
        memtable_flush_threshold_bytes: 1024 * 1024,
        restart_interval: 4,
    }
}

#[test]
fn insert_flush_and_reopen_round_trips_data() {
    let dir = tempdir().unwrap();
    {
        let mut engine = Engine::open(&config_for(dir.path()), None::<&std::path::Path>).unwrap();
        engine.insert(b"name".to_vec(), b"Alice".to_vec()).unwrap();
        engine.insert(b"city".to_vec(), b"Prague".to_vec()).unwrap();
        engine.remove(b"city".to_vec()).unwrap();
        engine.shutdown().unwrap();
    }

    let mut reopened = Engine::open(&config_for(dir.path()), None::<&std::path::Path>).unwrap();
    assert_eq!(
        reopened.get(b"name").unwrap(),
        Some(b"Alice".to_vec())
    );
    assert_eq!(reopened.get(b"city").unwrap(), None);
}

#[test]
fn automatic_flush_under_sustained_writes_keeps_every_key_readable() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::open(&config_for(dir.path()), None::<&std::path::Path>).unwrap();
    for i in 0..500u32 {
        engine
            .insert(format!("k{i:04}").into_bytes(), format!("v{i}").into_bytes())
            .unwrap();
    }
    for i in 0..500u32 {
        assert_eq!(
            engine.get(format!("k{i:04}").as_bytes()).unwrap(),
            Some(format!("v{i}").into_bytes())
        );
    }
}
