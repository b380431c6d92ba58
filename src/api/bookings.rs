use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use tracing::info;

use super::extract::{ApiJson, ApiQuery};
use super::AppState;
use crate::auth::{Capability, Principal};
use crate::error::ApiError;
use crate::filters::BookingFilter;
use crate::models::Booking;
use crate::records::{Repository, Stored};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/{id}", get(get_booking).put(update_booking))
}

async fn list_bookings(
    principal: Principal,
    State(repo): State<Repository>,
    ApiQuery(filter): ApiQuery<BookingFilter>,
) -> Result<Json<Vec<Stored<Booking>>>, ApiError> {
    principal.require(Capability::ManageBookings)?;

    let bookings = repo.list::<Booking>().await?;
    Ok(Json(filter.apply(bookings)))
}

async fn get_booking(
    principal: Principal,
    State(repo): State<Repository>,
    Path(id): Path<String>,
) -> Result<Json<Stored<Booking>>, ApiError> {
    principal.require(Capability::ManageBookings)?;

    Ok(Json(repo.get::<Booking>(&id).await?))
}

/// Public: visitors book without an account; status always starts pending
async fn create_booking(
    State(repo): State<Repository>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> Result<(StatusCode, Json<Stored<Booking>>), ApiError> {
    let booking = repo.create::<Booking>(fields).await?;
    info!(
        property = booking.property_id.as_deref().unwrap_or("-"),
        "New visit request for {} {}",
        booking.date.as_deref().unwrap_or("?"),
        booking.time.as_deref().unwrap_or("?")
    );
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn update_booking(
    principal: Principal,
    State(repo): State<Repository>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> Result<Json<Stored<Booking>>, ApiError> {
    principal.require(Capability::ManageBookings)?;

    Ok(Json(repo.update::<Booking>(&id, patch).await?))
}
