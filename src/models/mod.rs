mod booking;
mod lead;
mod property;
mod user;

pub use booking::{Booking, BookingStatus};
pub use lead::{Lead, LeadStatus};
pub use property::Property;
pub use user::{User, UserProfile};

use crate::store::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A record type persisted as one element of a collection document
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backing collection
    const COLLECTION: Collection;

    /// Human-readable name used in not-found messages
    const NAME: &'static str;

    /// Whether updates stamp `updatedAt`. Properties never have.
    const STAMPS_UPDATED_AT: bool;

    fn id(&self) -> &str;

    /// Fields the server forces on creation, overriding caller input
    fn creation_overrides() -> Map<String, Value> {
        Map::new()
    }
}

/// Error for a status string outside the fixed enumeration
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} status '{value}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}
