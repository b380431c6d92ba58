use super::Entity;
use crate::store::Collection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Core property listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub id: String,
    pub title: String,
    /// Any JSON number, fractions included
    pub price: f64,
    pub location: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Square feet
    pub area: f64,
    /// The first image is the main one
    pub images: Vec<String>,
    pub description: String,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Fields without a dedicated slot, kept as the caller sent them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Property {
    const COLLECTION: Collection = Collection::Properties;
    const NAME: &'static str = "Property";
    const STAMPS_UPDATED_AT: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
}
