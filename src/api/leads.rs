use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};

use super::extract::{ApiJson, ApiQuery};
use super::AppState;
use crate::auth::{Capability, Principal};
use crate::error::ApiError;
use crate::filters::LeadFilter;
use crate::models::Lead;
use crate::records::{Repository, Stored};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leads", get(list_leads).post(create_lead))
        .route("/api/leads/{id}", get(get_lead).put(update_lead))
}

async fn list_leads(
    principal: Principal,
    State(repo): State<Repository>,
    ApiQuery(filter): ApiQuery<LeadFilter>,
) -> Result<Json<Vec<Stored<Lead>>>, ApiError> {
    principal.require(Capability::ManageLeads)?;

    let leads = repo.list::<Lead>().await?;
    Ok(Json(filter.apply(leads)))
}

async fn get_lead(
    principal: Principal,
    State(repo): State<Repository>,
    Path(id): Path<String>,
) -> Result<Json<Stored<Lead>>, ApiError> {
    principal.require(Capability::ManageLeads)?;

    Ok(Json(repo.get::<Lead>(&id).await?))
}

/// Public: contact forms and booking pages post here; status always starts new
async fn create_lead(
    State(repo): State<Repository>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> Result<(StatusCode, Json<Stored<Lead>>), ApiError> {
    let lead = repo.create::<Lead>(fields).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

async fn update_lead(
    principal: Principal,
    State(repo): State<Repository>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> Result<Json<Stored<Lead>>, ApiError> {
    principal.require(Capability::ManageLeads)?;

    Ok(Json(repo.update::<Lead>(&id, patch).await?))
}
