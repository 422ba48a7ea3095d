use std::sync::Arc;

use axum::Router;

use crate::AppState;

pub mod general_router;
pub mod report_router;

use general_router::general_routes;
use report_router::report_routes;

/// Main application router assembly function
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        // Report listing and bulk creation
        .merge(report_routes())
        // Health check and the JSON 404 fallback
        .merge(general_routes())
}
