use crate::*;

pub fn open_engine(dir: &std::path::Path, flush_threshold_bytes: usize) -> Engine {
    let config = EngineConfig {
        sst_dir: dir.to_path_buf(),
        sst_prefix: "riptide-".to_string(),
        cache_capacity: 16,
        memtable_flush_threshold_bytes: flush_threshold_bytes,
        restart_interval: 4,
    };
    Engine::open(&config, None::<&std::path::Path>).unwrap()
}
