//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::TimetableService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TimetableService>,
}

impl AppState {
    pub fn new(service: TimetableService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
