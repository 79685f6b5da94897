//! Rental API route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

use super::models::CalendarEntry;
use super::requests::{AvailabilityQuery, CalculatePricingRequest, CreateBookingRequest};
use super::responses::{BookingResponse, PricingResponse};
use super::services;

/// Router for `/api/rentals`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/listings/:listing_id/availability", get(availability))
        .route("/pricing", post(calculate_pricing))
        .route("/bookings", post(create_booking))
}

/// Availability calendar for a listing over a date window
pub async fn availability(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<CalendarEntry>>> {
    let window = services::availability_window(
        state.store.as_ref(),
        &state.cache,
        listing_id,
        query.start_date,
        query.end_date,
    )
    .await?;

    Ok(Json(window))
}

/// Quote a rental
pub async fn calculate_pricing(
    State(state): State<AppState>,
    Json(req): Json<CalculatePricingRequest>,
) -> Result<Json<PricingResponse>> {
    let resp = services::calculate_pricing(
        state.store.as_ref(),
        &state.cache,
        &state.engine,
        &state.currency,
        &req,
    )
    .await?;

    Ok(Json(resp))
}

/// Create a pending booking
pub async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>)> {
    let booking = services::create_booking(
        state.store.as_ref(),
        &state.cache,
        &state.engine,
        &state.currency,
        req,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}
