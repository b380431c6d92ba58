use super::{Collection, Store};
use crate::auth::hash_password;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

pub const DEMO_ADMIN_EMAIL: &str = "admin@demo.com";
pub const DEMO_ADMIN_PASSWORD: &str = "password123";

/// Write starter documents for every collection that has none yet.
///
/// Existing documents are left alone, even empty or corrupt ones.
pub async fn ensure_seed_data(store: &dyn Store) -> Result<()> {
    for collection in Collection::ALL {
        if store.exists(collection).await {
            continue;
        }

        let records = match collection {
            Collection::Properties => sample_properties(),
            Collection::Users => vec![demo_admin()?],
            Collection::Leads | Collection::Bookings => Vec::new(),
        };

        if !store.save(collection, &records).await {
            anyhow::bail!("Failed to write initial {} document", collection);
        }
        info!("📋 Seeded {} with {} records", collection, records.len());

        if collection == Collection::Users {
            warn!(
                "Created demo admin {} with the default password; change it before going live",
                DEMO_ADMIN_EMAIL
            );
        }
    }
    Ok(())
}

fn demo_admin() -> Result<Value> {
    let password = hash_password(DEMO_ADMIN_PASSWORD).context("Failed to hash demo password")?;
    Ok(json!({
        "id": "1",
        "email": DEMO_ADMIN_EMAIL,
        "password": password,
        "role": "admin",
        "name": "Admin User"
    }))
}

fn sample_properties() -> Vec<Value> {
    let now = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    vec![
        json!({
            "id": "1",
            "title": "Luxury 3 Bedroom Apartment",
            "price": 85000,
            "location": "E-11, Islamabad",
            "bedrooms": 3,
            "bathrooms": 2,
            "area": 1200,
            "images": [
                "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=500",
                "https://images.unsplash.com/photo-1560449752-2dd9b55c0d3e?w=500",
                "https://images.unsplash.com/photo-1560448075-bb485b067938?w=500"
            ],
            "description": "Modern luxury apartment with stunning city views",
            "featured": true,
            "createdAt": now
        }),
        json!({
            "id": "2",
            "title": "Cozy 2 Bedroom House",
            "price": 65000,
            "location": "F-10, Islamabad",
            "bedrooms": 2,
            "bathrooms": 1,
            "area": 900,
            "images": [
                "https://images.unsplash.com/photo-1570129477492-45c003edd2be?w=500"
            ],
            "description": "Perfect family home in quiet neighborhood",
            "featured": false,
            "createdAt": now
        }),
        json!({
            "id": "3",
            "title": "Modern Studio Apartment",
            "price": 35000,
            "location": "G-9, Islamabad",
            "bedrooms": 1,
            "bathrooms": 1,
            "area": 600,
            "images": [
                "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=500"
            ],
            "description": "Compact and efficient studio for young professionals",
            "featured": false,
            "createdAt": now
        }),
    ]
}
