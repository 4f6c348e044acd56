// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, BookingState};

pub fn booking_routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/bookings", post(handlers::create_booking))
        .route("/bookings/{booking_id}", get(handlers::get_booking))
        .route("/bookings/{booking_id}/cancel", post(handlers::cancel_booking))
        .route(
            "/rooms/{room_id}/available-slots",
            get(handlers::get_available_slots),
        )
        .with_state(state)
}
