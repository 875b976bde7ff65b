//! Upload persistence: an in-memory store and a JSON file store.
//!
//! The file store keeps every record in one JSON array under
//! `~/.docent/library_uploads.json` unless told otherwise.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::UploadRecord;
use crate::error::DocentError;

const LIBRARY_FILE: &str = "library_uploads.json";

/// Persistence for uploaded documents, keyed by `uploaded_at`.
pub trait UploadStore: Send + Sync {
    /// All records in insertion order.
    fn list(&self) -> Result<Vec<UploadRecord>, DocentError>;
    fn find(&self, uploaded_at: i64) -> Result<Option<UploadRecord>, DocentError>;
    /// Append a record. Ids must be unique.
    fn insert(&self, record: UploadRecord) -> Result<(), DocentError>;
}

fn ensure_unique(records: &[UploadRecord], record: &UploadRecord) -> Result<(), DocentError> {
    if records.iter().any(|r| r.uploaded_at == record.uploaded_at) {
        return Err(DocentError::InvalidState(format!(
            "An upload with id {} already exists",
            record.uploaded_at
        )));
    }
    Ok(())
}

/// In-memory store, mostly for tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryUploadStore {
    records: Mutex<Vec<UploadRecord>>,
}

impl MemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UploadStore for MemoryUploadStore {
    fn list(&self) -> Result<Vec<UploadRecord>, DocentError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn find(&self, uploaded_at: i64) -> Result<Option<UploadRecord>, DocentError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|record| record.uploaded_at == uploaded_at)
            .cloned())
    }

    fn insert(&self, record: UploadRecord) -> Result<(), DocentError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        ensure_unique(&records, &record)?;
        records.push(record);
        Ok(())
    }
}

/// Configuration for file-backed upload storage.
#[derive(Debug, Clone)]
pub struct UploadStoreConfig {
    pub path: PathBuf,
}

impl UploadStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        default_docent_dir().join(LIBRARY_FILE)
    }
}

/// File-backed store holding every record in one JSON array.
///
/// # Example
/// ```no_run
/// use docent::library::{FileUploadStore, UploadForm, UploadStore};
///
/// let store = FileUploadStore::new_default();
/// let record = UploadForm::builder()
///     .topic("Physics")
///     .build()
///     .into_record_now("feynman.pdf", b"%PDF-1.4")?;
/// store.insert(record)?;
/// # Ok::<(), docent::error::DocentError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileUploadStore {
    path: PathBuf,
}

impl FileUploadStore {
    pub fn new(config: UploadStoreConfig) -> Self {
        Self { path: config.path }
    }

    pub fn new_default() -> Self {
        Self {
            path: UploadStoreConfig::default_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<UploadRecord>, DocentError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, records: &[UploadRecord]) -> Result<(), DocentError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string(records)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl UploadStore for FileUploadStore {
    fn list(&self) -> Result<Vec<UploadRecord>, DocentError> {
        self.read_all()
    }

    fn find(&self, uploaded_at: i64) -> Result<Option<UploadRecord>, DocentError> {
        Ok(self
            .read_all()?
            .into_iter()
            .find(|record| record.uploaded_at == uploaded_at))
    }

    fn insert(&self, record: UploadRecord) -> Result<(), DocentError> {
        let mut records = self.read_all()?;
        ensure_unique(&records, &record)?;
        debug!(path = %self.path.display(), id = record.uploaded_at, "storing upload");
        records.push(record);
        self.write_all(&records)
    }
}

fn default_docent_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".docent"))
        .unwrap_or_else(|| PathBuf::from(".docent"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Author, UploadForm};
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileUploadStore) {
        let dir = TempDir::new().unwrap();
        let store = FileUploadStore::new(UploadStoreConfig::new(
            dir.path().join("nested").join(LIBRARY_FILE),
        ));
        (dir, store)
    }

    fn upload(id: i64, topic: &str) -> UploadRecord {
        UploadForm::builder()
            .topic(topic)
            .authors(vec![Author::new("Ada", "Lovelace")])
            .build()
            .into_record(&format!("{id}.pdf"), b"%PDF", id)
            .unwrap()
    }

    fn exercise(store: &dyn UploadStore) {
        assert!(store.list().unwrap().is_empty());
        store.insert(upload(2, "Analysis")).unwrap();
        store.insert(upload(1, "Engines")).unwrap();

        let ids: Vec<_> = store.list().unwrap().iter().map(|r| r.uploaded_at).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(store.find(1).unwrap().unwrap().topic, "Engines");
        assert!(store.find(3).unwrap().is_none());

        let err = store.insert(upload(2, "Duplicate")).unwrap_err();
        assert!(matches!(err, DocentError::InvalidState(_)));
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn memory_store_behaves() {
        exercise(&MemoryUploadStore::new());
    }

    #[test]
    fn file_store_behaves() {
        let (_dir, store) = temp_store();
        exercise(&store);
    }

    #[test]
    fn file_store_persists_between_instances() {
        let (_dir, store) = temp_store();
        store.insert(upload(5, "Topology")).unwrap();

        let reopened = FileUploadStore::new(UploadStoreConfig::new(store.path()));
        assert_eq!(reopened.list().unwrap(), vec![upload(5, "Topology")]);
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(
            store.list().unwrap_err(),
            DocentError::Serialization(_)
        ));
    }
}
