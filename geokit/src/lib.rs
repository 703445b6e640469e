//! # geokit - Geospatial Encoding and Simplification Library
//!
//! Small, dependable building blocks for geospatial web services:
//!
//! - **Polyline simplification**: Ramer-Douglas-Peucker over borrowed point
//!   slices, see [`simplify`]
//! - **Cell encoding**: geohash and H3 encode/decode and H3 k-rings, see [`cell`]
//! - **GeoJSON** (feature `geojson`): simplify every path of a geometry
//! - **PostgreSQL** (feature `postgres`): pgRouting shortest paths, PostGIS
//!   raster elevation and JSON pass-through queries
//!
//! ## Quick Start
//!
//! ```
//! use geokit::{simplify, Point};
//!
//! let path = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.1),
//!     Point::new(2.0, -0.1),
//!     Point::new(3.0, 5.0),
//!     Point::new(4.0, 6.0),
//! ];
//!
//! let simplified = simplify(&path, 1.0).unwrap();
//! assert_eq!(simplified.first(), path.first());
//! assert_eq!(simplified.last(), path.last());
//! ```
//!
//! ## Feature Flags
//!
//! - `geojson` - GeoJSON geometry simplification
//! - `postgres` - database access through `sqlx` with a `moka` sample cache

pub mod cell;
pub mod error;
pub mod simplify;

#[cfg(feature = "postgres")]
pub mod db;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use cell::{Coordinate, DecodedGeohash};
pub use error::{GeoError, Result};
pub use simplify::{simplify, simplify_indices, simplify_with, DistanceMode, Point, Simplifier};

#[cfg(feature = "postgres")]
pub use db::{Database, DatabaseBuilder, RouteStep};
