use axum::http::{ header, HeaderValue, Method };
use tower_http::cors::{ AllowOrigin, CorsLayer };
use tracing::warn;

use crate::config::ServerConfig;

/// CORS policy for the report endpoints.
///
/// Production only admits `CORS_ALLOWED_ORIGIN` (nothing when unset or unparsable);
/// any other environment admits the service's own address.
pub fn create_cors_layer(server: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if server.environment == "production" {
        match server.allowed_origin.as_deref().map(HeaderValue::from_str) {
            Some(Ok(origin)) => base.allow_origin(AllowOrigin::list([origin])),
            Some(Err(e)) => {
                warn!("Ignoring invalid CORS_ALLOWED_ORIGIN: {}", e);
                base.allow_origin(AllowOrigin::list([]))
            }
            None => base.allow_origin(AllowOrigin::list([])),
        }
    } else {
        match HeaderValue::from_str(&format!("http://{}:{}", server.host, server.port)) {
            Ok(origin) => base.allow_origin(AllowOrigin::list([origin])),
            Err(_) => base.allow_origin(AllowOrigin::list([])),
        }
    }
}
