use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use moka::sync::Cache;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::AppError;

use super::mock_data;
use super::tabular::parser::{parse_csv, parse_json, SourceFormat};
use super::tabular::types::Table;

#[derive(Debug)]
pub enum DatasetContent {
    Table(Table),
    /// Markdown passes through as opaque preformatted text.
    Document(String),
}

#[derive(Debug)]
pub struct LoadedDataset {
    pub source: String,
    pub format: SourceFormat,
    pub content: DatasetContent,
    pub mocked: bool,
}

impl LoadedDataset {
    pub fn table(&self) -> Result<&Table, AppError> {
        match &self.content {
            DatasetContent::Table(table) => Ok(table),
            DatasetContent::Document(_) => Err(AppError::InvalidInput(format!(
                "{} is a document, not a tabular dataset",
                self.source
            ))),
        }
    }
}

struct CurrentView {
    generation: u64,
    dataset: Arc<LoadedDataset>,
}

/// Owns the single in-memory dataset the rest of the service reads. Every
/// load gets a monotonically increasing generation token; a load that
/// resolves after a newer one has committed is dropped instead of
/// overwriting it.
pub struct DatasetLoader {
    client: reqwest::Client,
    cache: Cache<String, Arc<LoadedDataset>>,
    view: Mutex<Option<CurrentView>>,
    generation: AtomicU64,
    base: Option<String>,
    max_file_size: usize,
}

impl DatasetLoader {
    pub fn new(config: &Config) -> Self {
        DatasetLoader {
            client: reqwest::Client::new(),
            cache: Cache::new(config.cache_capacity),
            view: Mutex::new(None),
            generation: AtomicU64::new(0),
            base: config.dataset_base.clone(),
            max_file_size: config.max_file_size,
        }
    }

    /// Fetch, parse and make `source` the current dataset. Parsed tables are
    /// cached by source name, so reloading a recently seen file skips the
    /// fetch entirely.
    pub async fn load(&self, source: &str) -> Result<Arc<LoadedDataset>, AppError> {
        let format = SourceFormat::from_path(source)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(hit) = self.cache.get(source) {
            tracing::info!(source, "dataset cache hit");
            self.commit(generation, hit.clone());
            return Ok(hit);
        }

        let start = std::time::Instant::now();
        let bytes = self.fetch(source).await?;
        if bytes.len() > self.max_file_size {
            return Err(AppError::InvalidInput(format!(
                "{} is {} bytes, over the {} byte limit",
                source,
                bytes.len(),
                self.max_file_size
            )));
        }
        tracing::info!(source, size = bytes.len(), elapsed = ?start.elapsed(), "dataset fetched");

        let content = parse_bytes(format, &bytes)?;
        let dataset = Arc::new(LoadedDataset {
            source: source.to_string(),
            format,
            content,
            mocked: false,
        });
        self.cache.insert(source.to_string(), dataset.clone());
        self.commit(generation, dataset.clone());
        Ok(dataset)
    }

    /// Make the deterministic fixture the current dataset, marked as mocked.
    /// Called by handlers when a fetch fails and the config opted into
    /// substitution; the engine itself never fabricates data.
    pub fn substitute_fixture(&self, source: &str) -> Arc<LoadedDataset> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let dataset = Arc::new(LoadedDataset {
            source: source.to_string(),
            format: SourceFormat::Csv,
            content: DatasetContent::Table(mock_data::prediction_fixture()),
            mocked: true,
        });
        self.commit(generation, dataset.clone());
        dataset
    }

    pub fn current(&self) -> Result<Arc<LoadedDataset>, AppError> {
        self.view
            .lock()
            .as_ref()
            .map(|v| v.dataset.clone())
            .ok_or(AppError::NoDataset)
    }

    fn commit(&self, generation: u64, dataset: Arc<LoadedDataset>) -> bool {
        let mut view = self.view.lock();
        match view.as_ref() {
            Some(current) if current.generation > generation => {
                tracing::warn!(
                    source = %dataset.source,
                    generation,
                    current = current.generation,
                    "stale load discarded"
                );
                false
            }
            _ => {
                *view = Some(CurrentView {
                    generation,
                    dataset,
                });
                true
            }
        }
    }

    fn resolve(&self, source: &str) -> String {
        if source.starts_with("http://") || source.starts_with("https://") {
            source.to_string()
        } else if let Some(base) = &self.base {
            format!("{}/{}", base.trim_end_matches('/'), source)
        } else {
            source.to_string()
        }
    }

    async fn fetch(&self, source: &str) -> Result<Bytes, AppError> {
        let target = self.resolve(source);
        if target.starts_with("http://") || target.starts_with("https://") {
            let response = self
                .client
                .get(&target)
                .send()
                .await
                .map_err(|e| AppError::Fetch(format!("Failed to fetch {}: {}", target, e)))?;

            if !response.status().is_success() {
                return Err(AppError::Fetch(format!(
                    "Failed to fetch {}. Status: {}",
                    target,
                    response.status()
                )));
            }

            response
                .bytes()
                .await
                .map_err(|e| AppError::Fetch(format!("Failed to read response bytes: {}", e)))
        } else {
            let data = tokio::fs::read(&target)
                .await
                .map_err(|e| AppError::Fetch(format!("Failed to read {}: {}", target, e)))?;
            Ok(Bytes::from(data))
        }
    }
}

fn parse_bytes(format: SourceFormat, bytes: &Bytes) -> Result<DatasetContent, AppError> {
    match format {
        SourceFormat::Csv => Ok(DatasetContent::Table(parse_csv(&String::from_utf8_lossy(
            bytes,
        )))),
        SourceFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(bytes)?;
            Ok(DatasetContent::Table(parse_json(&value)))
        }
        SourceFormat::Markdown => Ok(DatasetContent::Document(
            String::from_utf8_lossy(bytes).into_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base: Option<String>) -> Config {
        Config {
            max_file_size: 1024 * 1024,
            dataset_base: base,
            fallback_to_mock: false,
            cache_capacity: 8,
            port: 0,
        }
    }

    fn loader_with_base(dir: &std::path::Path) -> DatasetLoader {
        DatasetLoader::new(&test_config(Some(dir.to_string_lossy().into_owned())))
    }

    #[tokio::test]
    async fn loads_csv_from_disk_and_commits_view() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prices.csv"), "a,b\n1,x\n2,y\n").unwrap();

        let loader = loader_with_base(dir.path());
        let loaded = loader.load("prices.csv").await.unwrap();
        assert_eq!(loaded.table().unwrap().row_count(), 2);
        assert_eq!(loader.current().unwrap().source, "prices.csv");
    }

    #[tokio::test]
    async fn newest_load_wins_the_view() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.csv"), "v\n1\n").unwrap();
        std::fs::write(dir.path().join("b.csv"), "v\n2\n").unwrap();

        let loader = loader_with_base(dir.path());
        loader.load("a.csv").await.unwrap();
        let b = loader.load("b.csv").await.unwrap();

        // A load that resolves late with an older generation must not
        // overwrite the newer view.
        let stale = Arc::new(LoadedDataset {
            source: "a.csv".to_string(),
            format: SourceFormat::Csv,
            content: DatasetContent::Table(b.table().unwrap().clone()),
            mocked: false,
        });
        assert!(!loader.commit(1, stale));
        assert_eq!(loader.current().unwrap().source, "b.csv");
    }

    #[tokio::test]
    async fn second_load_of_same_source_hits_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.csv");
        std::fs::write(&path, "v\n1\n").unwrap();

        let loader = loader_with_base(dir.path());
        loader.load("c.csv").await.unwrap();
        // Remove the backing file; the cached parse must still serve.
        std::fs::remove_file(&path).unwrap();
        let again = loader.load("c.csv").await.unwrap();
        assert_eq!(again.table().unwrap().row_count(), 1);
    }

    #[tokio::test]
    async fn missing_file_surfaces_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_with_base(dir.path());
        let err = loader.load("absent.csv").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
        assert!(matches!(loader.current(), Err(AppError::NoDataset)));
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected_before_fetch() {
        let loader = DatasetLoader::new(&test_config(None));
        let err = loader.load("weights.bin").await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn markdown_loads_as_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "# Notes\n").unwrap();

        let loader = loader_with_base(dir.path());
        let loaded = loader.load("notes.md").await.unwrap();
        assert!(loaded.table().is_err());
        assert!(matches!(&loaded.content, DatasetContent::Document(d) if d.starts_with("# Notes")));
    }

    #[tokio::test]
    async fn fixture_substitution_becomes_current_and_is_marked() {
        let loader = DatasetLoader::new(&test_config(None));
        let dataset = loader.substitute_fixture("preds.csv");
        assert!(dataset.mocked);
        assert!(loader.current().unwrap().mocked);
    }
}
