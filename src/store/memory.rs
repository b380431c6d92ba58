use super::{Collection, Store};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process store with the same whole-collection semantics as the file store
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a collection
    pub fn with_collection(mut self, collection: Collection, records: Vec<Value>) -> Self {
        self.collections.get_mut().insert(collection, records);
        self
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    async fn save(&self, collection: Collection, records: &[Value]) -> bool {
        self.collections
            .write()
            .await
            .insert(collection, records.to_vec());
        true
    }

    async fn exists(&self, collection: Collection) -> bool {
        self.collections.read().await.contains_key(&collection)
    }
}

