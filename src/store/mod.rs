pub mod file;
pub mod memory;
pub mod seed;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// One JSON document per collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Properties,
    Leads,
    Bookings,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Properties,
        Collection::Leads,
        Collection::Bookings,
        Collection::Users,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Properties => "properties",
            Collection::Leads => "leads",
            Collection::Bookings => "bookings",
            Collection::Users => "users",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whole-document persistence for entity collections.
///
/// The only primitives are "read the entire collection" and "overwrite the
/// entire collection". Nothing serializes concurrent read-modify-write
/// sequences: when two callers load before either saves, the last save wins.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load a full collection in storage order.
    ///
    /// A missing document is an empty collection. Unreadable or corrupt
    /// documents are logged and also read as empty.
    async fn load(&self, collection: Collection) -> Vec<Value>;

    /// Overwrite a full collection. Returns `false` if the write failed.
    async fn save(&self, collection: Collection, records: &[Value]) -> bool;

    /// Whether a document exists for the collection at all
    async fn exists(&self, collection: Collection) -> bool;
}
