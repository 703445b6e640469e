//! Error types for the geokit library.

use thiserror::Error;

/// Errors that can occur when simplifying, encoding or querying.
#[derive(Error, Debug)]
pub enum GeoError {
    /// The polyline has fewer points than the simplifier can work with.
    #[error("Too few points: {count} (at least 2 required)")]
    TooFewPoints { count: usize },

    /// Tolerance is negative, NaN or infinite.
    #[error("Invalid tolerance: {epsilon} (must be finite and non-negative)")]
    InvalidTolerance { epsilon: f64 },

    /// A point of the polyline has a NaN or infinite coordinate.
    #[error("Non-finite coordinate at index {index}")]
    NonFiniteCoordinate { index: usize },

    /// A coordinate value is malformed (e.g., wrong number of ordinates).
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    /// Coordinates are outside the valid WGS84 range.
    #[error("Coordinates out of bounds: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    OutOfBounds { lat: f64, lon: f64 },

    /// Geohash precision is outside 1..=12.
    #[error("Invalid geohash precision: {precision} (valid: 1 to 12)")]
    InvalidPrecision { precision: usize },

    /// The geohash string could not be decoded.
    #[error("Invalid geohash '{hash}': {message}")]
    InvalidGeohash { hash: String, message: String },

    /// H3 resolution is outside 0..=15.
    #[error("Invalid H3 resolution: {resolution} (valid: 0 to 15)")]
    InvalidResolution { resolution: u8 },

    /// The H3 index string could not be parsed.
    #[error("Invalid H3 index '{index}': {message}")]
    InvalidH3Index { index: String, message: String },

    /// The k-ring radius is larger than allowed.
    #[error("Invalid k-ring radius: {k} (maximum {max})")]
    InvalidKRing { k: u32, max: u32 },

    /// A configured table name is not a plain SQL identifier.
    #[error("Invalid SQL identifier: {name}")]
    InvalidIdentifier { name: String },

    /// Missing or malformed configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Error reported by PostgreSQL or the connection pool.
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias using [`GeoError`].
pub type Result<T> = std::result::Result<T, GeoError>;
