//! Runtime configuration for the storage engine, read from the
//! environment with the same `env_or` fallback pattern `cli` has always
//! used for its settings.

/// Tunable knobs for an [`engine::Engine`] instance.
///
/// [`engine::Engine`]: ../engine/struct.Engine.html
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory the on-disk file stack lives in.
    pub sst_dir: std::path::PathBuf,
    /// Filename prefix for flushed files, e.g. `"riptide-"` -> `riptide-0.sst`.
    pub sst_prefix: String,
    /// Number of entries the LRU read cache holds.
    pub cache_capacity: usize,
    /// Approximate write-buffer size, in bytes, that triggers a freeze+flush.
    pub memtable_flush_threshold_bytes: usize,
    /// Number of entries between restart points in a persisted block.
    pub restart_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sst_dir: std::path::PathBuf::from("data/sst"),
            sst_prefix: "riptide-".to_string(),
            cache_capacity: 10_000,
            memtable_flush_threshold_bytes: 1024 * 1024,
            restart_interval: 4,
        }
    }
}

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl EngineConfig {
    /// Builds a config from environment variables, falling back to
    /// [`EngineConfig::default`] for anything unset or unparsable.
    ///
    /// ```text
    /// RIPTIDE_SST_DIR               SSTable directory          (default: "data/sst")
    /// RIPTIDE_SST_PREFIX            SSTable filename prefix    (default: "riptide-")
    /// RIPTIDE_CACHE_CAPACITY        LRU cache entry capacity   (default: 10000)
    /// RIPTIDE_FLUSH_THRESHOLD_BYTES memtable flush threshold   (default: 1048576)
    /// RIPTIDE_RESTART_INTERVAL      block restart interval     (default: 4)
    /// ```
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let sst_dir = env_or("RIPTIDE_SST_DIR", defaults.sst_dir.to_str().unwrap_or("data/sst"));
        let sst_prefix = env_or("RIPTIDE_SST_PREFIX", &defaults.sst_prefix);
        let cache_capacity = env_or("RIPTIDE_CACHE_CAPACITY", &defaults.cache_capacity.to_string())
            .parse()
            .unwrap_or(defaults.cache_capacity);
        let memtable_flush_threshold_bytes = env_or(
            "RIPTIDE_FLUSH_THRESHOLD_BYTES",
            &defaults.memtable_flush_threshold_bytes.to_string(),
        )
        .parse()
        .unwrap_or(defaults.memtable_flush_threshold_bytes);
        let restart_interval = env_or("RIPTIDE_RESTART_INTERVAL", &defaults.restart_interval.to_string())
            .parse()
            .unwrap_or(defaults.restart_interval);

        Self {
            sst_dir: std::path::PathBuf::from(sst_dir),
            sst_prefix,
            cache_capacity,
            memtable_flush_threshold_bytes,
            restart_interval,
        }
    }
}
