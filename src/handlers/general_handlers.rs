use axum::{ extract::State, Json };
use std::sync::Arc;
use crate::{
    AppState,
    models::{ ApiResponse, HealthStatus },
    errors::{ HttpError, ErrorMessage },
};

pub async fn handler_404() -> HttpError {
    HttpError::not_found(ErrorMessage::NotFound.to_string())
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse {
        success: true,
        data: Some(HealthStatus {
            status: "ok".to_string(),
            store: state.reports.store().backend().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
        message: None,
    })
}
