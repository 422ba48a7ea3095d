// Library entry point - exposes the report service as a reusable library

pub mod config;
pub mod models;
pub mod dto;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod middleware;
pub mod handlers;
pub mod routes;

pub mod schema;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use config::{ Config, ConfigError, PaginatorConfig, StoreBackend };
pub use errors::{ HttpError, ErrorMessage };
pub use models::Report;
pub use dto::ReportCreation;
pub use repositories::{ ReportStore, InMemoryReportStore, PgReportStore, StoreError };
pub use services::{ Pageable, ReportService };
pub use utils::{ ReportGenerator, RandomReportGenerator };

use std::sync::Arc;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{ catch_panic::CatchPanicLayer, trace::TraceLayer };
use tracing::info;

// Application state type
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub reports: ReportService,
}

impl AppState {
    /// Build the state from configuration, connecting the configured store backend.
    pub async fn new(config: Config) -> Result<Self, ConfigError> {
        let store: Arc<dyn ReportStore> = match config.database.backend {
            StoreBackend::Memory => {
                info!("Using the in-memory report store");
                Arc::new(InMemoryReportStore::new())
            }
            StoreBackend::Postgres => {
                let pool = config.database.build_pool()?;
                let store = PgReportStore::connect(pool).await.map_err(|e|
                    ConfigError::Config(format!("Report store setup failed: {}", e))
                )?;
                Arc::new(store)
            }
        };

        Ok(Self::with_parts(config, store, Arc::new(RandomReportGenerator::new())))
    }

    /// Explicit wiring, used by `new` and by tests that inject their own collaborators.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn ReportStore>,
        generator: Arc<dyn ReportGenerator>
    ) -> Self {
        Self {
            config,
            reports: ReportService::new(store, generator),
        }
    }
}

/// Create the complete application router with its layers and state applied
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = middleware::cors::create_cors_layer(&state.config.server);

    routes
        ::create_router()
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::new())
                .layer(cors)
        )
}

/// Initialize the application with all dependencies
pub async fn initialize_app(config: Config) -> Result<Router, ConfigError> {
    let state = Arc::new(AppState::new(config).await?);
    Ok(create_app(state))
}
