//! API routes for booking-server

pub mod bookings;
pub mod health;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the service router
pub fn create_router(state: AppState) -> Router {
    let bookings = Router::new()
        .route("/api/bookings", post(bookings::admit_booking))
        .route(
            "/api/bookings/{id}",
            get(bookings::get_booking).delete(bookings::cancel_booking),
        )
        .route("/api/bookings/{id}/slot", put(bookings::reschedule_booking))
        .route(
            "/api/tables/{table_id}/availability",
            get(bookings::check_availability),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(bookings)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
