// src/storage/mod.rs
use crate::extractors::table::ListingTables;
use crate::fetch::models::ListingTable;
use crate::processing::column::ColumnSpec;
use crate::processing::dataset::{Column, ColumnValues, DatasetAssembler, TypedDataset};
use crate::utils::error::{FetchError, StorageError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Sidecar written next to every CSV snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub source_url: String,
    pub table_id: String,
    pub fetched_at: DateTime<Utc>,
    pub row_count: usize,
    pub columns: Vec<ColumnSpec>,
}

impl SnapshotMeta {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) < max_age
    }
}

/// How [`StorageManager::load_or_fetch`] chooses between the cache and the network.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub table: ListingTable,
    pub source_url: String,
    pub max_age: Duration,
    /// Skip the freshness check and always fetch
    pub refresh: bool,
    /// Keep a copy of the fetched page under `debug/`
    pub save_raw_page: bool,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    fn csv_path(&self, stem: &str) -> PathBuf {
        self.base_dir.join(format!("{}.csv", stem))
    }

    fn meta_path(&self, stem: &str) -> PathBuf {
        self.base_dir.join(format!("{}_meta.json", stem))
    }

    /// Writes `dataset` as `<stem>.csv` plus `<stem>_meta.json`.
    pub fn save_snapshot(
        &self,
        stem: &str,
        dataset: &TypedDataset,
        source_url: &str,
        table_id: &str,
    ) -> Result<PathBuf, StorageError> {
        let csv_path = self.csv_path(stem);
        let mut writer = csv::Writer::from_path(&csv_path)?;

        writer.write_record(dataset.column_names())?;
        for row in 0..dataset.row_count() {
            writer.write_record(dataset.row(row).iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;

        let meta = SnapshotMeta {
            source_url: source_url.to_string(),
            table_id: table_id.to_string(),
            fetched_at: Utc::now(),
            row_count: dataset.row_count(),
            columns: dataset.specs(),
        };
        let meta_str = serde_json::to_string_pretty(&meta)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(self.meta_path(stem), meta_str)?;

        tracing::info!("Saved snapshot ({} rows) to {}", dataset.row_count(), csv_path.display());
        Ok(csv_path)
    }

    /// Reads the metadata sidecar, `Ok(None)` when no snapshot exists.
    pub fn load_meta(&self, stem: &str) -> Result<Option<SnapshotMeta>, StorageError> {
        let path = self.meta_path(stem);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        let meta = serde_json::from_str(&text)
            .map_err(|e| StorageError::CorruptSnapshot(path.display().to_string(), e.to_string()))?;
        Ok(Some(meta))
    }

    /// Loads a snapshot, using the column kinds recorded in its metadata.
    pub fn load_snapshot(&self, stem: &str) -> Result<Option<(SnapshotMeta, TypedDataset)>, StorageError> {
        let Some(meta) = self.load_meta(stem)? else {
            return Ok(None);
        };
        let csv_path = self.csv_path(stem);
        if !csv_path.exists() {
            return Ok(None);
        }
        let corrupt = |msg: String| StorageError::CorruptSnapshot(csv_path.display().to_string(), msg);

        let mut reader = csv::Reader::from_path(&csv_path)?;
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let expected: Vec<&str> = meta.columns.iter().map(|c| c.name.as_str()).collect();
        if header != expected {
            return Err(corrupt(format!("header {:?} does not match metadata {:?}", header, expected)));
        }

        let mut builders: Vec<ColumnValues> = meta
            .columns
            .iter()
            .map(|c| ColumnValues::with_capacity(c.kind, meta.row_count))
            .collect();
        for record in reader.records() {
            let record = record?;
            for (col, values) in builders.iter_mut().enumerate() {
                let cell = record.get(col).unwrap_or("");
                push_canonical(values, cell).map_err(corrupt)?;
            }
        }

        let columns = meta
            .columns
            .iter()
            .cloned()
            .zip(builders)
            .map(|(spec, values)| Column::new(spec, values))
            .collect();
        let dataset = TypedDataset::from_columns(columns).map_err(corrupt)?;
        if dataset.row_count() != meta.row_count && !dataset.columns().is_empty() {
            return Err(corrupt(format!("expected {} rows, found {}", meta.row_count, dataset.row_count())));
        }

        tracing::debug!("Loaded snapshot {} ({} rows)", csv_path.display(), dataset.row_count());
        Ok(Some((meta, dataset)))
    }

    /// Loads the snapshot only if it is younger than `max_age`.
    /// Stale, missing and unreadable snapshots all yield `None`.
    pub fn load_fresh(&self, stem: &str, max_age: Duration) -> Option<TypedDataset> {
        match self.load_snapshot(stem) {
            Ok(Some((meta, dataset))) => {
                let now = Utc::now();
                if meta.is_fresh(now, max_age) {
                    tracing::info!("Using cached snapshot from {} ({} rows)", meta.fetched_at.to_rfc3339(), dataset.row_count());
                    Some(dataset)
                } else {
                    tracing::info!("Cached snapshot is {} minutes old, refreshing", meta.age(now).num_minutes());
                    None
                }
            }
            Ok(None) => {
                tracing::info!("No cached snapshot for '{}'", stem);
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable snapshot '{}': {}", stem, e);
                None
            }
        }
    }

    /// Saves a copy of the fetched page for debugging.
    pub fn save_raw_page(&self, html: &str) -> Result<PathBuf, StorageError> {
        let debug_dir = self.base_dir.join("debug");
        fs::create_dir_all(&debug_dir)?;
        let path = debug_dir.join(format!("raw_page_{}.html", Utc::now().format("%Y%m%dT%H%M%S")));
        fs::write(&path, html)?;
        tracing::info!("Saved raw page to {}", path.display());
        Ok(path)
    }

    /// Returns the requested table from a fresh snapshot, or calls `fetch`, assembles
    /// both tables and caches every non-empty one.
    ///
    /// When `fetch` fails, a snapshot of any age is returned; without one the
    /// result is an empty dataset.
    pub async fn load_or_fetch<F, Fut>(&self, request: &LoadRequest, fetch: F) -> TypedDataset
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(String, ListingTables), FetchError>>,
    {
        let stem = request.table.cache_stem();

        if !request.refresh {
            if let Some(dataset) = self.load_fresh(stem, request.max_age) {
                return dataset;
            }
        }

        let (html, tables) = match fetch().await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::error!("Could not retrieve listing: {}", e);
                return match self.load_snapshot(stem) {
                    Ok(Some((meta, dataset))) => {
                        tracing::warn!("Falling back to snapshot from {}", meta.fetched_at.to_rfc3339());
                        dataset
                    }
                    Ok(None) => TypedDataset::default(),
                    Err(e) => {
                        tracing::warn!("Ignoring unreadable snapshot '{}': {}", stem, e);
                        TypedDataset::default()
                    }
                };
            }
        };

        if request.save_raw_page {
            if let Err(e) = self.save_raw_page(&html) {
                tracing::warn!("Failed to save raw page: {}", e);
            }
        }

        let assembler = DatasetAssembler::new();
        let mut selected = TypedDataset::default();
        for table in ListingTable::ALL {
            let raw = match table {
                ListingTable::Current => &tables.current,
                ListingTable::Deprecated => &tables.deprecated,
            };
            let dataset = assembler.assemble(raw);
            if dataset.is_empty() {
                tracing::warn!("No rows for {:?} table '{}'", table, table.table_id());
                continue;
            }

            match self.save_snapshot(table.cache_stem(), &dataset, &request.source_url, table.table_id()) {
                Ok(path) => tracing::info!("Cached {:?} table at {}", table, path.display()),
                Err(e) => tracing::error!("Failed to cache {:?} table: {}", table, e),
            }
            if table == request.table {
                selected = dataset;
            }
        }

        selected
    }
}

/// Parses the canonical text written by `save_snapshot`.
fn push_canonical(values: &mut ColumnValues, cell: &str) -> Result<(), String> {
    match values {
        ColumnValues::Boolean(v) => v.push(
            cell.parse::<bool>()
                .map_err(|_| format!("invalid boolean '{}'", cell))?,
        ),
        ColumnValues::Integer(v) => v.push(
            cell.parse::<i64>()
                .map_err(|_| format!("invalid integer '{}'", cell))?,
        ),
        ColumnValues::Numeric(v) => v.push(if cell.is_empty() {
            None
        } else {
            Some(cell.parse::<f64>().map_err(|_| format!("invalid number '{}'", cell))?)
        }),
        ColumnValues::Text(v) => v.push(cell.to_string()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::table::RawTable;
    use crate::processing::dataset::{assemble, Value};
    use tempfile::tempdir;

    fn sample() -> TypedDataset {
        let rows = vec![
            vec!["eScooter", "Gewicht (kg)", "Blinker", "Wechselakku", "Federung"],
            vec!["Alpha, \"Pro\"", "15,5", "2", "ja", "vorne"],
            vec!["Beta", "", "", "nein", ""],
        ];
        assemble(&RawTable::from_rows(
            rows.into_iter().map(|r| r.into_iter().map(String::from).collect()).collect(),
        ))
    }

    #[test]
    fn test_snapshot_reload_keeps_types() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        let dataset = sample();

        storage.save_snapshot("listing", &dataset, "https://example.test/", "tablepress-2").unwrap();
        let (meta, loaded) = storage.load_snapshot("listing").unwrap().unwrap();

        assert_eq!(meta.row_count, 2);
        assert_eq!(meta.table_id, "tablepress-2");
        assert_eq!(loaded, dataset);
        assert_eq!(loaded.value("gewicht_kg", 1), Some(Value::Missing));
        assert_eq!(loaded.value("wechselakku", 0), Some(Value::Bool(true)));
    }

    #[test]
    fn test_fresh_and_stale_snapshots() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        storage.save_snapshot("listing", &sample(), "u", "t").unwrap();

        assert!(storage.load_fresh("listing", Duration::hours(24)).is_some());
        assert!(storage.load_fresh("listing", Duration::zero()).is_none());
    }

    #[test]
    fn test_missing_snapshot() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path().join("nested/cache")).unwrap();
        assert!(storage.load_snapshot("listing").unwrap().is_none());
        assert!(storage.load_fresh("listing", Duration::hours(24)).is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_reported() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        storage.save_snapshot("listing", &sample(), "u", "t").unwrap();
        fs::write(tmp.path().join("listing.csv"), "model,gewicht_kg,blinker,wechselakku,federung\nA,heavy,1,true,x\n").unwrap();

        let err = storage.load_snapshot("listing").unwrap_err();
        assert!(matches!(err, StorageError::CorruptSnapshot(_, _)), "got {}", err);
        assert!(storage.load_fresh("listing", Duration::hours(24)).is_none());
    }

    fn request(table: ListingTable, max_age: Duration) -> LoadRequest {
        LoadRequest {
            table,
            source_url: "https://example.test/".to_string(),
            max_age,
            refresh: false,
            save_raw_page: false,
        }
    }

    fn listing() -> ListingTables {
        let current = vec![
            vec!["eScooter", "UVP", "Gutscheincode (Werbung)"],
            vec!["Alpha", "499", "SAVE10"],
            vec!["Beta", "1299", ""],
        ];
        ListingTables {
            current: RawTable::from_rows(
                current.into_iter().map(|r| r.into_iter().map(String::from).collect()).collect(),
            ),
            deprecated: RawTable::default(),
        }
    }

    fn server_error() -> Result<(String, ListingTables), FetchError> {
        Err(FetchError::Http(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
    }

    #[tokio::test]
    async fn test_fetch_caches_only_non_empty_tables() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();

        let dataset = storage
            .load_or_fetch(&request(ListingTable::Current, Duration::hours(24)), || async {
                Ok(("<html></html>".to_string(), listing()))
            })
            .await;

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column_names(), vec!["model", "uvp"]);
        assert!(tmp.path().join("escooter_current.csv").exists());
        assert!(tmp.path().join("escooter_current_meta.json").exists());
        assert!(!tmp.path().join("escooter_deprecated.csv").exists());
        assert!(!tmp.path().join("escooter_deprecated_meta.json").exists());
        assert!(!tmp.path().join("debug").exists());
    }

    #[tokio::test]
    async fn test_requested_table_is_returned() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        let mut tables = listing();
        tables.deprecated = RawTable::from_rows(vec![
            vec!["eScooter".to_string()],
            vec!["Old".to_string()],
        ]);

        let mut req = request(ListingTable::Deprecated, Duration::hours(24));
        req.save_raw_page = true;
        let dataset = storage
            .load_or_fetch(&req, move || async move { Ok(("<html></html>".to_string(), tables)) })
            .await;

        assert_eq!(dataset.row_count(), 1);
        assert_eq!(dataset.value("model", 0), Some(Value::Text("Old")));
        assert!(tmp.path().join("escooter_current.csv").exists());
        assert!(tmp.path().join("escooter_deprecated.csv").exists());
        assert_eq!(fs::read_dir(tmp.path().join("debug")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_fresh_snapshot_skips_fetch() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        storage.save_snapshot("escooter_current", &sample(), "u", "t").unwrap();

        let mut fetched = false;
        let dataset = storage
            .load_or_fetch(&request(ListingTable::Current, Duration::hours(24)), || {
                fetched = true;
                async { server_error() }
            })
            .await;

        assert!(!fetched);
        assert_eq!(dataset, sample());
    }

    #[tokio::test]
    async fn test_refresh_ignores_fresh_snapshot() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        storage.save_snapshot("escooter_current", &sample(), "u", "t").unwrap();

        let mut req = request(ListingTable::Current, Duration::hours(24));
        req.refresh = true;
        let dataset = storage
            .load_or_fetch(&req, || async { Ok((String::new(), listing())) })
            .await;

        assert_eq!(dataset.value("model", 0), Some(Value::Text("Alpha")));
    }

    #[tokio::test]
    async fn test_fetch_error_falls_back_to_stale_snapshot() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        storage.save_snapshot("escooter_current", &sample(), "u", "t").unwrap();

        let dataset = storage
            .load_or_fetch(&request(ListingTable::Current, Duration::zero()), || async { server_error() })
            .await;

        assert_eq!(dataset, sample());
    }

    #[tokio::test]
    async fn test_fetch_error_without_snapshot_is_empty() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();

        let dataset = storage
            .load_or_fetch(&request(ListingTable::Current, Duration::hours(24)), || async { server_error() })
            .await;

        assert!(dataset.is_empty());
        assert!(!tmp.path().join("escooter_current.csv").exists());
    }

    #[test]
    fn test_integral_float_survives_reload() {
        let tmp = tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        let dataset = assemble(&RawTable::from_rows(vec![
            vec!["eScooter".to_string(), "Akku (Wh)".to_string()],
            vec!["Big".to_string(), "10000000000000000".to_string()],
        ]));

        storage.save_snapshot("listing", &dataset, "u", "t").unwrap();
        let csv = fs::read_to_string(tmp.path().join("listing.csv")).unwrap();
        assert!(csv.contains("10000000000000000.0"), "{}", csv);
        let (_, loaded) = storage.load_snapshot("listing").unwrap().unwrap();
        assert_eq!(loaded.value("akku_wh", 0), Some(Value::Float(1e16)));
    }

    #[test]
    fn test_meta_freshness() {
        let meta = SnapshotMeta {
            source_url: "u".into(),
            table_id: "t".into(),
            fetched_at: Utc::now() - Duration::hours(25),
            row_count: 0,
            columns: Vec::new(),
        };
        assert!(!meta.is_fresh(Utc::now(), Duration::hours(24)));
        assert!(meta.is_fresh(Utc::now(), Duration::hours(48)));
    }
}
