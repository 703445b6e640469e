//! geokit Service - HTTP microservice for geospatial encoding, simplification
//! and PostGIS queries.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_URL` | PostgreSQL connection string | None (database endpoints answer 503) |
//! | `GEOKIT_PORT` | HTTP server port | 8085 |
//! | `GEOKIT_DB_MAX_CONNECTIONS` | Connection pool size | 10 |
//! | `GEOKIT_DEM_TABLE` | PostGIS raster table for `/dem` | `public.eu_dem` |
//! | `GEOKIT_ROUTING_EDGES` | pgRouting edge table | `osm_2po_4pgr` |
//! | `GEOKIT_ROUTING_VERTICES` | pgRouting vertex table | `osm_2po_4pgr_vertices_pgr` |
//! | `GEOKIT_DEM_CACHE_SIZE` | Cached DEM samples | 10000 |
//! | `GEOKIT_ENABLE_QUERY` | Allow raw SQL on `/query` | false |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /healthcheck` - Liveness probe, answers "pong"
//! - `GET /health` - Health check with database status
//! - `GET /stats` - DEM cache statistics
//! - `POST /encodegeohash`, `/decodegeohash` - Geohash cells
//! - `POST /encodeh3`, `/decodeh3`, `/h3kring` - H3 cells
//! - `POST /rdp` - Polyline simplification
//! - `POST /simplify?epsilon=E` - GeoJSON simplification
//! - `POST /dijkstra` - Shortest path over the road network
//! - `POST /dem` - Raster elevation at a point
//! - `POST /query` - JSON rows for a SQL query
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use geokit::DatabaseBuilder;
use geokit_service::{app, handlers, AppState, ServiceConfig};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the geokit service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "geokit Service",
        version = "0.1.0",
        description = "REST API for polyline simplification, geohash/H3 cells and PostGIS queries.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::ping,
        handlers::health_check,
        handlers::get_stats,
        handlers::encode_geohash,
        handlers::decode_geohash,
        handlers::encode_h3,
        handlers::decode_h3,
        handlers::h3_k_ring,
        handlers::rdp,
        handlers::simplify_geojson,
        handlers::dijkstra,
        handlers::dem,
        handlers::query,
    ),
    components(
        schemas(
            handlers::EncodeRequest,
            handlers::DecodeRequest,
            handlers::GeohashResponse,
            handlers::CoordinateResponse,
            handlers::RdpPoint,
            handlers::RdpRequest,
            handlers::RoutingRequest,
            geokit::RouteStep,
            handlers::DemRequest,
            handlers::QueryRequest,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "cells", description = "Geohash and H3 endpoints"),
        (name = "simplify", description = "Polyline simplification endpoints"),
        (name = "database", description = "PostGIS and pgRouting endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geokit_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;

    // DATABASE_URL is optional; without it the database endpoints answer 503
    let db = match DatabaseBuilder::from_env() {
        Ok(builder) => Some(builder.connect().await?),
        Err(e) => {
            tracing::warn!(error = %e, "Database disabled");
            None
        }
    };

    tracing::info!(
        port = config.port,
        database = db.is_some(),
        dem_table = db.as_ref().map(|d| d.dem_table()),
        dem_cache_capacity = db.as_ref().map(|d| d.cache_capacity()),
        enable_query = config.enable_query,
        "Starting geokit service"
    );

    let port = config.port;
    let state = Arc::new(AppState { db, config });

    let router = app(state.clone())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = &state.db {
        db.close().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
