//! HTTP request handlers for the geokit service.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use geojson::Geometry;
use geokit::{
    cell::{self, Coordinate},
    geojson::simplify_geometry,
    Database, DistanceMode, GeoError, Point, RouteStep, Simplifier,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;

/// JSON body extractor that answers malformed input with an [`ErrorResponse`].
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::warn!(error = %rejection, "Rejected request body");
                Err(error_message(
                    StatusCode::BAD_REQUEST,
                    "invalid input json format",
                ))
            }
        }
    }
}

/// Query string extractor that answers malformed parameters with an [`ErrorResponse`].
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => {
                tracing::warn!(error = %rejection, "Rejected query string");
                Err(error_message(StatusCode::BAD_REQUEST, rejection.body_text()))
            }
        }
    }
}

/// Request body for encoding a coordinate.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EncodeRequest {
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub long: f64,
    /// Geohash length (1 to 12) or H3 resolution (0 to 15).
    pub resolution: u32,
    /// Ring radius for `/h3kring`.
    #[serde(default)]
    pub k: u32,
}

/// Request body for decoding a geohash or H3 index.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecodeRequest {
    /// The geohash or H3 index string.
    pub encoded: String,
}

/// Decoded geohash cell.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeohashResponse {
    /// Latitude of the cell centre.
    pub lat: f64,
    /// Longitude of the cell centre.
    pub lon: f64,
    /// Half the cell height in degrees.
    pub lat_error: f64,
    /// Half the cell width in degrees.
    pub lon_error: f64,
}

/// Centre of an H3 cell.
#[derive(Debug, Serialize, ToSchema)]
pub struct CoordinateResponse {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// A point of a polyline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct RdpPoint {
    pub x: f64,
    pub y: f64,
}

impl From<RdpPoint> for Point {
    fn from(p: RdpPoint) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for RdpPoint {
    fn from(p: Point) -> Self {
        RdpPoint { x: p.x, y: p.y }
    }
}

/// Request body for polyline simplification.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RdpRequest {
    /// The polyline, more than 2 points.
    pub seq: Vec<RdpPoint>,
    /// Tolerance, finite and non-negative.
    pub epsilon: f64,
    /// Use the true perpendicular distance instead of the unnormalized one.
    #[serde(default)]
    pub normalize: bool,
}

/// Query parameters for GeoJSON simplification.
#[derive(Debug, Deserialize)]
pub struct SimplifyQuery {
    /// Tolerance, finite and non-negative.
    pub epsilon: f64,
    /// Use the true perpendicular distance instead of the unnormalized one.
    #[serde(default)]
    pub normalize: bool,
}

/// Request body for shortest path routing.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoutingRequest {
    #[serde(rename = "src-lat")]
    pub src_lat: f64,
    #[serde(rename = "src-long")]
    pub src_long: f64,
    #[serde(rename = "dst-lat")]
    pub dst_lat: f64,
    #[serde(rename = "dst-long")]
    pub dst_long: f64,
}

/// Request body for DEM elevation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DemRequest {
    /// Location in the coordinate system given by `srid`.
    pub location: RdpPoint,
    /// Spatial reference id of `location`.
    pub srid: i32,
}

/// Request body for a pass-through query.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryRequest {
    /// The SQL to run.
    pub sql: String,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Database state: "connected", "unreachable" or "disabled".
    pub database: String,
}

/// DEM cache statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of samples in cache.
    pub cached_samples: u64,
    /// Cache hit count.
    pub cache_hits: u64,
    /// Cache miss count.
    pub cache_misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

fn error_message(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a library error to a status code and error body.
pub fn error_response(e: GeoError) -> Response {
    let status = match &e {
        GeoError::TooFewPoints { .. }
        | GeoError::InvalidTolerance { .. }
        | GeoError::NonFiniteCoordinate { .. }
        | GeoError::InvalidCoordinate { .. }
        | GeoError::OutOfBounds { .. }
        | GeoError::InvalidPrecision { .. }
        | GeoError::InvalidGeohash { .. }
        | GeoError::InvalidResolution { .. }
        | GeoError::InvalidH3Index { .. }
        | GeoError::InvalidKRing { .. } => StatusCode::BAD_REQUEST,
        GeoError::Database(
            sqlx_error @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
        ) => {
            tracing::error!(error = %sqlx_error, "Database unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
        GeoError::InvalidIdentifier { .. } | GeoError::Config { .. } | GeoError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    tracing::warn!(error = %e, status = status.as_u16(), "Request failed");

    error_message(status, e.to_string())
}

fn database(state: &AppState) -> Result<&Database, Response> {
    state.db.as_ref().ok_or_else(|| {
        error_message(StatusCode::SERVICE_UNAVAILABLE, "database not configured")
    })
}

/// Out-of-range values saturate so the library reports them as invalid.
fn h3_resolution(resolution: u32) -> u8 {
    u8::try_from(resolution).unwrap_or(u8::MAX)
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "system",
    responses((status = 200, description = "Service is alive", body = String))
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// Health check endpoint.
///
/// Returns service status, version and database reachability.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match &state.db {
        Some(db) if db.ping().await => "connected",
        Some(_) => "unreachable",
        None => "disabled",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}

/// Get DEM cache statistics.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "system",
    responses(
        (status = 200, description = "Cache statistics", body = StatsResponse),
        (status = 503, description = "No database configured", body = ErrorResponse)
    )
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Response {
    let db = match database(&state) {
        Ok(db) => db,
        Err(response) => return response,
    };
    let stats = db.cache_stats();

    Json(StatsResponse {
        cached_samples: stats.entry_count,
        cache_hits: stats.hit_count,
        cache_misses: stats.miss_count,
        hit_rate: stats.hit_rate(),
    })
    .into_response()
}

/// Encode a coordinate as a geohash of `resolution` characters.
#[utoipa::path(
    post,
    path = "/encodegeohash",
    tag = "cells",
    request_body = EncodeRequest,
    responses(
        (status = 200, description = "Geohash", body = String),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn encode_geohash(JsonBody(req): JsonBody<EncodeRequest>) -> Response {
    match cell::encode_geohash(req.lat, req.long, req.resolution as usize) {
        Ok(hash) => {
            tracing::info!(
                lat = req.lat,
                lon = req.long,
                precision = req.resolution,
                geohash = %hash,
                "Encoded geohash"
            );
            Json(hash).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Decode a geohash into its cell centre.
#[utoipa::path(
    post,
    path = "/decodegeohash",
    tag = "cells",
    request_body = DecodeRequest,
    responses(
        (status = 200, description = "Cell centre", body = GeohashResponse),
        (status = 400, description = "Invalid geohash", body = ErrorResponse)
    )
)]
pub async fn decode_geohash(JsonBody(req): JsonBody<DecodeRequest>) -> Response {
    match cell::decode_geohash(&req.encoded) {
        Ok(decoded) => Json(GeohashResponse {
            lat: decoded.lat,
            lon: decoded.lon,
            lat_error: decoded.lat_error,
            lon_error: decoded.lon_error,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Encode a coordinate as an H3 index at `resolution`.
#[utoipa::path(
    post,
    path = "/encodeh3",
    tag = "cells",
    request_body = EncodeRequest,
    responses(
        (status = 200, description = "H3 index", body = String),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn encode_h3(JsonBody(req): JsonBody<EncodeRequest>) -> Response {
    let resolution = h3_resolution(req.resolution);

    match cell::encode_h3(req.lat, req.long, resolution) {
        Ok(index) => Json(index).into_response(),
        Err(e) => error_response(e),
    }
}

/// Decode an H3 index into its cell centre.
#[utoipa::path(
    post,
    path = "/decodeh3",
    tag = "cells",
    request_body = DecodeRequest,
    responses(
        (status = 200, description = "Cell centre", body = CoordinateResponse),
        (status = 400, description = "Invalid index", body = ErrorResponse)
    )
)]
pub async fn decode_h3(JsonBody(req): JsonBody<DecodeRequest>) -> Response {
    match cell::decode_h3(&req.encoded) {
        Ok(Coordinate { lat, lon }) => Json(CoordinateResponse { lat, lon }).into_response(),
        Err(e) => error_response(e),
    }
}

/// H3 cells within `k` steps of the cell containing the coordinate.
#[utoipa::path(
    post,
    path = "/h3kring",
    tag = "cells",
    request_body = EncodeRequest,
    responses(
        (status = 200, description = "H3 indexes", body = [String]),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn h3_k_ring(JsonBody(req): JsonBody<EncodeRequest>) -> Response {
    let resolution = h3_resolution(req.resolution);

    match cell::h3_k_ring(req.lat, req.long, resolution, req.k) {
        Ok(cells) => Json(cells).into_response(),
        Err(e) => error_response(e),
    }
}

/// Simplify a polyline with Ramer-Douglas-Peucker.
#[utoipa::path(
    post,
    path = "/rdp",
    tag = "simplify",
    request_body = RdpRequest,
    responses(
        (status = 200, description = "Simplified polyline", body = [RdpPoint]),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn rdp(JsonBody(req): JsonBody<RdpRequest>) -> Response {
    if req.seq.len() <= 2 {
        return error_message(StatusCode::BAD_REQUEST, "need more than 2 elements in seq");
    }

    let mode = if req.normalize {
        DistanceMode::Perpendicular
    } else {
        DistanceMode::Unnormalized
    };
    let points: Vec<Point> = req.seq.iter().copied().map(Point::from).collect();

    match Simplifier::with_mode(req.epsilon, mode).and_then(|s| s.simplify(&points)) {
        Ok(simplified) => {
            tracing::info!(
                input = points.len(),
                output = simplified.len(),
                epsilon = req.epsilon,
                ?mode,
                "Simplified polyline"
            );
            let body: Vec<RdpPoint> = simplified.into_iter().map(RdpPoint::from).collect();
            Json(body).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Simplify every path of a GeoJSON geometry.
#[utoipa::path(
    post,
    path = "/simplify",
    tag = "simplify",
    params(
        ("epsilon" = f64, Query, description = "Tolerance"),
        ("normalize" = Option<bool>, Query, description = "Use perpendicular distance")
    ),
    request_body(content = Object, description = "GeoJSON geometry"),
    responses(
        (status = 200, description = "Simplified GeoJSON geometry", body = Object),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn simplify_geojson(
    QueryParams(query): QueryParams<SimplifyQuery>,
    JsonBody(geometry): JsonBody<Geometry>,
) -> Response {
    let mode = if query.normalize {
        DistanceMode::Perpendicular
    } else {
        DistanceMode::Unnormalized
    };

    match Simplifier::with_mode(query.epsilon, mode).and_then(|s| simplify_geometry(&s, geometry))
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(e),
    }
}

/// Shortest path between the road vertices nearest to two coordinates.
#[utoipa::path(
    post,
    path = "/dijkstra",
    tag = "database",
    request_body = RoutingRequest,
    responses(
        (status = 200, description = "Route steps", body = [RouteStep]),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    )
)]
pub async fn dijkstra(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RoutingRequest>,
) -> Response {
    let db = match database(&state) {
        Ok(db) => db,
        Err(response) => return response,
    };

    let src = Coordinate {
        lat: req.src_lat,
        lon: req.src_long,
    };
    let dst = Coordinate {
        lat: req.dst_lat,
        lon: req.dst_long,
    };

    tracing::debug!(?src, ?dst, "Routing query");

    match db.shortest_path(src, dst).await {
        Ok(steps) => {
            tracing::info!(steps = steps.len(), "Route found");
            Json(steps).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Sample the DEM raster at a location.
#[utoipa::path(
    post,
    path = "/dem",
    tag = "database",
    request_body = DemRequest,
    responses(
        (status = 200, description = "Height in meters", body = f64),
        (status = 404, description = "No raster covers the location", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    )
)]
pub async fn dem(State(state): State<Arc<AppState>>, JsonBody(req): JsonBody<DemRequest>) -> Response {
    let db = match database(&state) {
        Ok(db) => db,
        Err(response) => return response,
    };
    let RdpPoint { x, y } = req.location;

    match db.elevation(x, y, req.srid).await {
        Ok(Some(height)) => {
            tracing::info!(x, y, srid = req.srid, height, "Elevation found");
            Json(height).into_response()
        }
        Ok(None) => {
            tracing::info!(x, y, srid = req.srid, "No elevation data");
            error_message(StatusCode::NOT_FOUND, "no elevation data at location")
        }
        Err(e) => error_response(e),
    }
}

/// Run a SQL query and return its rows as JSON objects.
#[utoipa::path(
    post,
    path = "/query",
    tag = "database",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Rows", body = Object),
        (status = 400, description = "Query failed", body = ErrorResponse),
        (status = 403, description = "Query endpoint disabled", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    )
)]
pub async fn query(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<QueryRequest>,
) -> Response {
    if !state.config.enable_query {
        return error_message(StatusCode::FORBIDDEN, "query endpoint is disabled");
    }
    let db = match database(&state) {
        Ok(db) => db,
        Err(response) => return response,
    };

    match db.query_json(&req.sql).await {
        Ok(rows) => Json(rows).into_response(),
        Err(GeoError::Database(sqlx::Error::Database(e))) => {
            tracing::warn!(error = %e, "Query rejected by database");
            error_message(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => error_response(e),
    }
}
