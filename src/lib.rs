//! Listings catalog, lead capture and back-office API for a real-estate site,
//! persisted as one JSON document per collection.

pub mod api;
pub mod auth;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod records;
pub mod store;

pub use api::{router, AppState};
pub use config::Config;
pub use error::ApiError;
