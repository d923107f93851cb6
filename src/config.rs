use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Upper bound on fetched dataset size.
    pub max_file_size: usize,
    /// Base URL or directory that relative dataset names resolve against.
    pub dataset_base: Option<String>,
    /// When a fetch fails, substitute the deterministic fixture table instead
    /// of surfacing the error. Meant for demo setups, off by default.
    pub fallback_to_mock: bool,
    /// Parsed-table cache capacity (entries).
    pub cache_capacity: u64,
    pub port: u16,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let max_file_size = std::env::var("MAX_FILE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_file_size);

        let dataset_base = std::env::var("DATASET_BASE").ok().filter(|v| !v.is_empty());

        let fallback_to_mock = std::env::var("FALLBACK_TO_MOCK")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let cache_capacity = std::env::var("CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(32);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Ok(Config {
            max_file_size,
            dataset_base,
            fallback_to_mock,
            cache_capacity,
            port,
        })
    }
}
