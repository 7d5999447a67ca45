//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Staff
        .route("/staff", get(handlers::list_staff).post(handlers::create_staff))
        .route(
            "/staff/{id}",
            put(handlers::update_staff).delete(handlers::delete_staff),
        )
        .route("/classes", get(handlers::list_classes))
        // Timetables. Class names are free text, so nothing else lives under /timetables/{class}.
        .route("/timetables", get(handlers::list_timetables))
        .route("/timetables/generate", post(handlers::generate_timetables))
        .route("/timetables/{class}", get(handlers::get_timetable))
        .route("/timetables/{class}/slots", put(handlers::edit_slot))
        // Generation bookkeeping
        .route("/diagnostics", get(handlers::get_diagnostics))
        .route("/runs", get(handlers::list_runs))
        .route("/runs/{id}", get(handlers::get_run));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::engine::OfflineGenerator;
    use crate::services::TimetableService;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let service = TimetableService::new(
            Arc::new(LocalRepository::new()),
            Arc::new(OfflineGenerator),
        );
        let _router = create_router(AppState::new(service));
    }
}
