pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;
pub mod slots;

pub use models::*;
pub use repository::{BookingRepository, SupabaseBookingRepository};
pub use router::booking_routes;
pub use services::availability::AvailabilityService;
pub use services::booking::BookingService;
pub use services::reconcile::{ReconcileHandle, ReconcileWorker, ReconciliationService};
