//! geokit Service Library
//!
//! HTTP handlers, router and configuration for the geokit service.
//! This library is used by both the geokit-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use geokit::{Database, GeoError};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8085;

/// Service settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// HTTP server port.
    pub port: u16,
    /// Whether `/query` accepts SQL.
    pub enable_query: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            enable_query: false,
        }
    }
}

impl ServiceConfig {
    /// Read `GEOKIT_PORT` and `GEOKIT_ENABLE_QUERY`.
    ///
    /// Unset variables fall back to the defaults; set but malformed ones are
    /// an error.
    pub fn from_env() -> geokit::Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("GEOKIT_PORT") {
            config.port = port.parse().map_err(|_| GeoError::Config {
                message: format!("GEOKIT_PORT is not a valid port: {}", port),
            })?;
        }

        if let Ok(flag) = std::env::var("GEOKIT_ENABLE_QUERY") {
            config.enable_query = parse_flag(&flag).ok_or_else(|| GeoError::Config {
                message: format!("GEOKIT_ENABLE_QUERY is not a boolean: {}", flag),
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Application state shared across handlers.
pub struct AppState {
    /// Database handle, absent when `DATABASE_URL` is not set.
    pub db: Option<Database>,
    /// Service settings.
    pub config: ServiceConfig,
}

/// Build the service router.
///
/// Every endpoint answers with and without a trailing slash.
pub fn app(state: Arc<AppState>) -> Router {
    let routes: [(&str, axum::routing::MethodRouter<Arc<AppState>>); 13] = [
        ("/healthcheck", get(handlers::ping)),
        ("/health", get(handlers::health_check)),
        ("/stats", get(handlers::get_stats)),
        ("/encodegeohash", post(handlers::encode_geohash)),
        ("/decodegeohash", post(handlers::decode_geohash)),
        ("/encodeh3", post(handlers::encode_h3)),
        ("/decodeh3", post(handlers::decode_h3)),
        ("/h3kring", post(handlers::h3_k_ring)),
        ("/rdp", post(handlers::rdp)),
        ("/simplify", post(handlers::simplify_geojson)),
        ("/dijkstra", post(handlers::dijkstra)),
        ("/dem", post(handlers::dem)),
        ("/query", post(handlers::query)),
    ];

    let mut router = Router::new();
    for (path, handler) in routes {
        router = router
            .route(path, handler.clone())
            .route(&format!("{}/", path), handler);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    CoordinateResponse, DecodeRequest, EncodeRequest, ErrorResponse, GeohashResponse,
    HealthResponse, RdpRequest, RoutingRequest, StatsResponse,
};
