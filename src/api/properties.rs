use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};

use super::extract::{ApiJson, ApiQuery};
use super::AppState;
use crate::auth::{Capability, Principal};
use crate::error::ApiError;
use crate::filters::PropertyFilter;
use crate::models::Property;
use crate::records::{Repository, Stored};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/properties",
            get(list_properties).post(create_property),
        )
        .route(
            "/api/properties/{id}",
            get(get_property)
                .put(update_property)
                .delete(delete_property),
        )
}

async fn list_properties(
    State(repo): State<Repository>,
    ApiQuery(filter): ApiQuery<PropertyFilter>,
) -> Result<Json<Vec<Stored<Property>>>, ApiError> {
    let properties = repo.list::<Property>().await?;
    Ok(Json(filter.apply(properties)))
}

async fn get_property(
    State(repo): State<Repository>,
    Path(id): Path<String>,
) -> Result<Json<Stored<Property>>, ApiError> {
    Ok(Json(repo.get::<Property>(&id).await?))
}

async fn create_property(
    principal: Principal,
    State(repo): State<Repository>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> Result<(StatusCode, Json<Stored<Property>>), ApiError> {
    principal.require(Capability::ManageProperties)?;

    let property = repo.create::<Property>(fields).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

async fn update_property(
    principal: Principal,
    State(repo): State<Repository>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> Result<Json<Stored<Property>>, ApiError> {
    principal.require(Capability::ManageProperties)?;

    Ok(Json(repo.update::<Property>(&id, patch).await?))
}

async fn delete_property(
    principal: Principal,
    State(repo): State<Repository>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    principal.require(Capability::ManageProperties)?;

    repo.delete::<Property>(&id).await?;
    Ok(Json(json!({ "message": "Property deleted successfully" })))
}
