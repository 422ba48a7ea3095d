use axum::{ routing::get, Router };
use std::sync::Arc;
use crate::{ AppState, handlers::report_handlers::{ get_reports, create_reports } };

// REPORT ROUTER
pub fn report_routes() -> Router<Arc<AppState>> {
    Router::new().route("/reports", get(get_reports).post(create_reports))
}
