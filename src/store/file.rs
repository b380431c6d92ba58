use super::{Collection, Store};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Store backed by one pretty-printed JSON array per collection under `dir`.
///
/// Writes go straight to the target file with a single write call, so a
/// crash mid-write can truncate the document.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load(&self, collection: Collection) -> Vec<Value> {
        let path = self.path_for(collection);

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No document at {}, treating as empty", path.display());
                return Vec::new();
            }
            Err(e) => {
                error!("Error reading {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Value>>(&data) {
            Ok(records) => records,
            Err(e) => {
                error!("Error parsing {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    async fn save(&self, collection: Collection, records: &[Value]) -> bool {
        let path = self.path_for(collection);

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            error!("Error creating {}: {}", self.dir.display(), e);
            return false;
        }

        let json = match serde_json::to_string_pretty(records) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing {}: {}", collection, e);
                return false;
            }
        };

        match tokio::fs::write(&path, json).await {
            Ok(()) => {
                debug!("Wrote {} records to {}", records.len(), path.display());
                true
            }
            Err(e) => {
                error!("Error writing {}: {}", path.display(), e);
                false
            }
        }
    }

    async fn exists(&self, collection: Collection) -> bool {
        tokio::fs::try_exists(self.path_for(collection))
            .await
            .unwrap_or(false)
    }
}
