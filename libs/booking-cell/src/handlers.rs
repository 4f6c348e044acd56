// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{Booking, BookingError, CancelBookingRequest, CreateBookingRequest};
use crate::services::availability::AvailabilityService;
use crate::services::booking::BookingService;

/// Shared state for the booking routes: services constructed once at
/// startup with their repository and dispatcher injected.
pub struct BookingState {
    pub bookings: Arc<BookingService>,
    pub availability: Arc<AvailabilityService>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: NaiveDate,
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state
        .bookings
        .create(request)
        .await
        .map_err(map_booking_error)?;

    Ok((StatusCode::CREATED, Json(booking)))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .bookings
        .cancel(booking_id, &request.cancel_reason)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "message": "Booking cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(booking))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<BookingState>>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state
        .availability
        .available_slots(room_id, query.date)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(slots)))
}

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::InvalidFormat(_)
        | BookingError::TooFarInAdvance(_)
        | BookingError::NonContiguousSlots
        | BookingError::SlotConflict
        | BookingError::MissingReason => AppError::BadRequest(e.to_string()),
        BookingError::NotFound => AppError::NotFound(e.to_string()),
        BookingError::Repository(msg) => AppError::Database(msg),
    }
}
