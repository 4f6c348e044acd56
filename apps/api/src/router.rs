use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use booking_cell::handlers::BookingState;
use booking_cell::router::booking_routes;

pub fn create_router(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Meeting-room booking API is running!" }))
        .route("/health", get(health))
        .nest("/api/v1", booking_routes(state))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
