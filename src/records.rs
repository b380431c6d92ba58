//! Typed CRUD over whole-collection documents.
//!
//! Every mutation loads the entire collection, changes it in memory and writes
//! the entire collection back, whatever the size of the change. Records are
//! kept as the JSON objects that were loaded; the entity types are a decoded
//! view used to validate and to read fields, never what gets written.

use std::borrow::Borrow;
use std::ops::Deref;
use std::sync::Arc;

use crate::models::Entity;
use crate::store::{Collection, Store};
use chrono::Utc;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Fields a caller may never set through an update
const IMMUTABLE_FIELDS: &[&str] = &["id", "createdAt"];

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid {entity}: {source}")]
    Invalid {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored {collection} document holds an undecodable record: {source}")]
    Corrupt {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {0} document")]
    WriteFailed(Collection),
}

pub type Result<T> = std::result::Result<T, RecordError>;

/// A record exactly as stored, with its decoded view.
///
/// Serializes as the stored object, so timestamps keep their original text
/// and fields the record never had stay absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    fields: Map<String, Value>,
    record: T,
}

impl<T: Entity> Stored<T> {
    fn from_fields(fields: Map<String, Value>) -> serde_json::Result<Self> {
        let record = serde_json::from_value(Value::Object(fields.clone()))?;
        Ok(Self { fields, record })
    }

    fn from_value(value: Value) -> serde_json::Result<Self> {
        Self::from_fields(serde_json::from_value(value)?)
    }
}

impl<T> Stored<T> {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_record(self) -> T {
        self.record
    }
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

impl<T> Borrow<T> for Stored<T> {
    fn borrow(&self) -> &T {
        &self.record
    }
}

impl<T> Serialize for Stored<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Entity-level operations over a [`Store`]
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn Store>,
}

impl Repository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All records in storage order
    pub async fn list<T: Entity>(&self) -> Result<Vec<Stored<T>>> {
        let raw = self.store.load(T::COLLECTION).await;
        raw.into_iter()
            .map(|value| Stored::from_value(value).map_err(corrupt::<T>))
            .collect()
    }

    /// First record with the given id
    pub async fn get<T: Entity>(&self, id: &str) -> Result<Stored<T>> {
        let raw = self.store.load(T::COLLECTION).await;
        let value = raw
            .into_iter()
            .find(|value| has_id(value, id))
            .ok_or(RecordError::NotFound(T::NAME))?;
        Stored::from_value(value).map_err(corrupt::<T>)
    }

    /// Append a new record built from caller fields.
    ///
    /// The server assigns `id` and `createdAt` and applies the entity's
    /// creation overrides; all of these win over caller input. Nothing else
    /// is added to what the caller sent.
    pub async fn create<T: Entity>(&self, fields: Map<String, Value>) -> Result<Stored<T>> {
        let mut raw = self.store.load(T::COLLECTION).await;

        let mut record = Map::new();
        record.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        for (key, value) in fields {
            if key != "id" {
                record.insert(key, value);
            }
        }
        record.insert("createdAt".to_string(), timestamp());
        record.extend(T::creation_overrides());

        let created = Stored::<T>::from_fields(record).map_err(invalid::<T>)?;
        raw.push(Value::Object(created.fields.clone()));
        self.persist(T::COLLECTION, &raw).await?;

        info!("Created {} {}", T::NAME, created.id());
        Ok(created)
    }

    /// Shallow-merge `patch` over the record with the given id.
    ///
    /// Caller fields win; fields not named in the patch keep their stored
    /// value and position. Other records are written back as loaded.
    pub async fn update<T: Entity>(&self, id: &str, patch: Map<String, Value>) -> Result<Stored<T>> {
        let mut raw = self.store.load(T::COLLECTION).await;
        let index = raw
            .iter()
            .position(|value| has_id(value, id))
            .ok_or(RecordError::NotFound(T::NAME))?;

        let mut merged: Map<String, Value> =
            serde_json::from_value(raw[index].clone()).map_err(corrupt::<T>)?;
        for (key, value) in patch {
            if IMMUTABLE_FIELDS.contains(&key.as_str()) {
                debug!("Ignoring immutable field {} on {} {}", key, T::NAME, id);
                continue;
            }
            merged.insert(key, value);
        }
        if T::STAMPS_UPDATED_AT {
            merged.insert("updatedAt".to_string(), timestamp());
        }

        let updated = Stored::<T>::from_fields(merged).map_err(invalid::<T>)?;
        raw[index] = Value::Object(updated.fields.clone());
        self.persist(T::COLLECTION, &raw).await?;

        info!("Updated {} {}", T::NAME, updated.id());
        Ok(updated)
    }

    /// Remove the first record with the given id
    pub async fn delete<T: Entity>(&self, id: &str) -> Result<()> {
        let mut raw = self.store.load(T::COLLECTION).await;
        let index = raw
            .iter()
            .position(|value| has_id(value, id))
            .ok_or(RecordError::NotFound(T::NAME))?;

        raw.remove(index);
        self.persist(T::COLLECTION, &raw).await?;

        info!("Deleted {} {}", T::NAME, id);
        Ok(())
    }

    async fn persist(&self, collection: Collection, raw: &[Value]) -> Result<()> {
        if self.store.save(collection, raw).await {
            Ok(())
        } else {
            Err(RecordError::WriteFailed(collection))
        }
    }
}

fn has_id(value: &Value, id: &str) -> bool {
    value.get("id").and_then(Value::as_str) == Some(id)
}

fn invalid<T: Entity>(source: serde_json::Error) -> RecordError {
    RecordError::Invalid {
        entity: T::NAME,
        source,
    }
}

fn corrupt<T: Entity>(source: serde_json::Error) -> RecordError {
    RecordError::Corrupt {
        collection: T::COLLECTION,
        source,
    }
}

/// Same shape as JavaScript's `toISOString`
fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, BookingStatus, Lead, LeadStatus, Property};
    use crate::store::{JsonFileStore, MemoryStore};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::sync::{Barrier, Mutex};

    fn repository() -> Repository {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn listing(title: &str) -> Map<String, Value> {
        object(json!({
            "title": title,
            "price": 85000,
            "location": "E-11, Islamabad",
            "bedrooms": 3,
            "bathrooms": 2,
            "area": 1200,
            "images": ["https://example.com/a.jpg"],
            "description": "Modern apartment",
            "featured": true
        }))
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_and_get_returns_same_record() {
        let repo = repository();
        let mut ids = HashSet::new();

        for n in 0..20 {
            let created = repo
                .create::<Property>(listing(&format!("Listing {n}")))
                .await
                .unwrap();
            assert!(ids.insert(created.id.clone()), "duplicate id {}", created.id);

            let fetched = repo.get::<Property>(&created.id).await.unwrap();
            assert_eq!(fetched, created);
        }
    }

    #[tokio::test]
    async fn create_ignores_caller_supplied_id() {
        let repo = repository();
        let mut fields = listing("Studio");
        fields.insert("id".to_string(), json!("chosen-by-caller"));

        let created = repo.create::<Property>(fields).await.unwrap();
        assert_ne!(created.id, "chosen-by-caller");
    }

    #[tokio::test]
    async fn create_stores_only_caller_and_server_fields() {
        let store = Arc::new(MemoryStore::new());
        let repo = Repository::new(store.clone());

        let created = repo
            .create::<Property>(object(json!({"title": "Plot", "price": 12000})))
            .await
            .unwrap();

        let keys: Vec<&str> = created.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "title", "price", "createdAt"]);
        // The decoded view still fills the gaps
        assert_eq!(created.bedrooms, 0);

        let stored = store.load(Collection::Properties).await;
        assert_eq!(stored, vec![serde_json::to_value(&created).unwrap()]);
        let created_at = stored[0]["createdAt"].as_str().unwrap();
        assert!(created_at.ends_with('Z') && created_at.contains('.'));
    }

    #[tokio::test]
    async fn create_forces_initial_status() {
        let repo = repository();

        let lead = repo
            .create::<Lead>(object(json!({"source": "website", "status": "converted"})))
            .await
            .unwrap();
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.fields()["status"], json!("new"));

        let booking = repo
            .create::<Booking>(object(json!({"name": "Bilal", "status": "confirmed"})))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn update_rewrites_only_the_patched_field() {
        let original = vec![
            json!({
                "id": "1",
                "title": "Luxury 3 Bedroom Apartment",
                "price": 85000,
                "location": "E-11, Islamabad",
                "bedrooms": 3,
                "featured": true,
                "createdAt": "2025-01-01T00:00:00.000Z"
            }),
            json!({
                "id": "2",
                "title": "Corner Plot",
                "price": 85000.5,
                "createdAt": "2025-02-01T10:00:00.000Z",
                "agent": {"name": "Usman"}
            }),
        ];
        let store = Arc::new(
            MemoryStore::new().with_collection(Collection::Properties, original.clone()),
        );
        let repo = Repository::new(store.clone());

        let updated = repo
            .update::<Property>("1", object(json!({"price": 70000})))
            .await
            .unwrap();
        assert_eq!(updated.price, 70000.0);

        let mut expected = original[0].clone();
        expected["price"] = json!(70000);

        let stored = store.load(Collection::Properties).await;
        assert_eq!(
            serde_json::to_string(&stored[0]).unwrap(),
            serde_json::to_string(&expected).unwrap()
        );
        assert_eq!(
            serde_json::to_string(&stored[1]).unwrap(),
            serde_json::to_string(&original[1]).unwrap()
        );
        assert_eq!(serde_json::to_value(&updated).unwrap(), expected);
        // Property updates have never stamped updatedAt
        assert!(updated.updated_at.is_none());
    }

    #[tokio::test]
    async fn update_keeps_id_immutable() {
        let repo = repository();
        let created = repo.create::<Property>(listing("Cozy House")).await.unwrap();

        let updated = repo
            .update::<Property>(&created.id, object(json!({"id": "other", "title": "Renamed"})))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Renamed");
    }

    #[tokio::test]
    async fn lead_update_stamps_updated_at() {
        let repo = repository();
        let lead = repo
            .create::<Lead>(object(json!({"source": "chatbot"})))
            .await
            .unwrap();
        assert!(lead.updated_at.is_none());

        let updated = repo
            .update::<Lead>(&lead.id, object(json!({"status": "contacted"})))
            .await
            .unwrap();

        assert_eq!(updated.status, LeadStatus::Contacted);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.fields()["createdAt"], lead.fields()["createdAt"]);
    }

    #[tokio::test]
    async fn update_rejects_unknown_status() {
        let repo = repository();
        let booking = repo
            .create::<Booking>(object(json!({"name": "Sara"})))
            .await
            .unwrap();

        let result = repo
            .update::<Booking>(&booking.id, object(json!({"status": "postponed"})))
            .await;

        assert!(matches!(result, Err(RecordError::Invalid { .. })));
        let stored = repo.get::<Booking>(&booking.id).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let repo = repository();
        let result = repo.update::<Lead>("nope", Map::new()).await;
        assert!(matches!(result, Err(RecordError::NotFound("Lead"))));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_record_then_reports_not_found() {
        let repo = repository();
        let first = repo.create::<Property>(listing("First")).await.unwrap();
        let second = repo.create::<Property>(listing("Second")).await.unwrap();

        repo.delete::<Property>(&first.id).await.unwrap();

        let remaining = repo.list::<Property>().await.unwrap();
        assert_eq!(remaining, vec![second]);

        let again = repo.delete::<Property>(&first.id).await;
        assert!(matches!(again, Err(RecordError::NotFound("Property"))));
    }

    #[tokio::test]
    async fn undecodable_stored_record_is_reported_not_dropped() {
        let store = MemoryStore::new().with_collection(
            Collection::Properties,
            vec![json!({"id": "1", "price": "expensive"})],
        );
        let repo = Repository::new(Arc::new(store));

        let result = repo.list::<Property>().await;
        assert!(matches!(result, Err(RecordError::Corrupt { .. })));
    }

    /// File store whose loads wait until two callers have loaded, so their
    /// read-modify-write cycles overlap. Saves go one at a time.
    struct OverlappingLoads {
        inner: JsonFileStore,
        loaded: Barrier,
        writing: Mutex<()>,
    }

    #[async_trait]
    impl Store for OverlappingLoads {
        async fn load(&self, collection: Collection) -> Vec<Value> {
            let records = self.inner.load(collection).await;
            self.loaded.wait().await;
            records
        }

        async fn save(&self, collection: Collection, records: &[Value]) -> bool {
            let _guard = self.writing.lock().await;
            self.inner.save(collection, records).await
        }

        async fn exists(&self, collection: Collection) -> bool {
            self.inner.exists(collection).await
        }
    }

    #[tokio::test]
    async fn concurrent_updates_lose_one_change() {
        let dir = tempfile::TempDir::new().unwrap();
        let file_store = JsonFileStore::new(dir.path());
        assert!(
            file_store
                .save(
                    Collection::Leads,
                    &[
                        json!({"id": "a", "source": "website", "status": "new", "createdAt": "2025-01-01T00:00:00.000Z"}),
                        json!({"id": "b", "source": "chatbot", "status": "new", "createdAt": "2025-01-02T00:00:00.000Z"}),
                    ],
                )
                .await
        );

        let repo = Repository::new(Arc::new(OverlappingLoads {
            inner: JsonFileStore::new(dir.path()),
            loaded: Barrier::new(2),
            writing: Mutex::new(()),
        }));

        // If updates were serialized, the first load would wait here forever
        let (first, second) = tokio::time::timeout(Duration::from_secs(10), async {
            tokio::join!(
                repo.update::<Lead>("a", object(json!({"status": "contacted"}))),
                repo.update::<Lead>("b", object(json!({"status": "qualified"}))),
            )
        })
        .await
        .expect("both updates should run their load concurrently");
        first.unwrap();
        second.unwrap();

        let stored = file_store.load(Collection::Leads).await;
        let statuses: Vec<&str> = stored
            .iter()
            .map(|record| record["status"].as_str().unwrap())
            .collect();
        let changed = statuses.iter().filter(|status| **status != "new").count();
        assert_eq!(changed, 1, "the later save should overwrite the earlier one: {statuses:?}");
    }
}
