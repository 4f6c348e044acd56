use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Local;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use booking_cell::handlers::BookingState;
use booking_cell::repository::{BookingRepository, SupabaseBookingRepository};
use booking_cell::{AvailabilityService, BookingService, ReconcileWorker, ReconciliationService};
use notification_cell::{ChatBotDispatcher, NotificationDispatcher};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting meeting-room booking API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Wire up the repository and notification dispatcher once, at the edge
    let supabase = Arc::new(SupabaseClient::new(&config));
    let repository: Arc<dyn BookingRepository> =
        Arc::new(SupabaseBookingRepository::new(supabase));
    let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(ChatBotDispatcher::new(&config));

    let availability = Arc::new(AvailabilityService::new(Arc::clone(&repository)));
    let bookings = Arc::new(BookingService::new(
        Arc::clone(&repository),
        Arc::clone(&availability),
        dispatcher,
    ));
    let reconciliation = Arc::new(ReconciliationService::new(Arc::clone(&repository)));

    // Repair mis-expired bookings before the periodic job takes over
    match reconciliation.repair_once(Local::now().naive_local()).await {
        Ok(0) => {}
        Ok(repaired) => info!("Startup repair reverted {} bookings to active", repaired),
        Err(e) => warn!("Startup repair pass failed: {}", e),
    }

    let worker = ReconcileWorker::new(
        Arc::clone(&reconciliation),
        Duration::from_secs(config.reconcile_interval_secs),
    );
    let reconcile_handle = worker.spawn();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create shared state
    let state = Arc::new(BookingState {
        bookings,
        availability,
    });

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    reconcile_handle.shutdown().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
