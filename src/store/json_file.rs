//! JSON snapshot file backing a [`MemoryStore`].

use super::{DataStore, Entity, MemoryStore, Snapshot, StoreError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A data store loaded from, and saved back to, one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open a snapshot file. A missing file yields an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let snapshot = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str::<Snapshot>(&content)?
        } else {
            debug!("No data file at {}, starting empty", path.display());
            Snapshot::default()
        };

        info!(
            "Loaded {} clients and {} stage records from {}",
            snapshot.clients.len(),
            snapshot.stage_records.len(),
            path.display()
        );

        Ok(Self {
            path,
            inner: MemoryStore::new(snapshot),
        })
    }

    /// Write the full snapshot back to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(self.inner.snapshot())?;
        tokio::fs::write(&self.path, content).await?;
        info!("Saved data to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.inner.snapshot()
    }
}

impl DataStore for JsonFileStore {
    fn list<E: Entity>(&self) -> Vec<E> {
        self.inner.list()
    }

    fn filter<E: Entity, P: Fn(&E) -> bool>(&self, predicate: P) -> Vec<E> {
        self.inner.filter(predicate)
    }

    fn create<E: Entity>(&mut self, entity: E) -> Result<E, StoreError> {
        self.inner.create(entity)
    }

    fn update<E: Entity>(&mut self, id: &str, entity: E) -> Result<E, StoreError> {
        self.inner.update(id, entity)
    }

    fn delete<E: Entity>(&mut self, id: &str) -> Result<(), StoreError> {
        self.inner.delete::<E>(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, StageRecord};
    use tempfile::TempDir;

    const SAMPLE: &str = include_str!("../../fixtures/sample_data.json");

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("none.json")).await.unwrap();
        assert!(store.list::<Client>().is_empty());
    }

    #[tokio::test]
    async fn test_open_sample_fixture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.list::<Client>().len(), 3);
        assert!(!store.list::<StageRecord>().is_empty());
    }

    #[tokio::test]
    async fn test_save_round_trips_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut store = JsonFileStore::open(&path).await.unwrap();
        store.delete::<Client>("client-fitlife").unwrap();
        store.save().await.unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.list::<Client>().len(), 2);
        assert!(reopened.get::<Client>("client-fitlife").is_none());
    }

    #[tokio::test]
    async fn test_open_rejects_bad_month() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{"stage_records": [{"client_id": "c1", "stage": 2, "month": "2024-1"}]}"#,
        )
        .unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
