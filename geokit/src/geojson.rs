//! GeoJSON geometry simplification.
//!
//! This module applies the Ramer-Douglas-Peucker simplifier to GeoJSON
//! geometries. Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use geokit::geojson::simplify_geometry;
//! use geokit::simplify::Simplifier;
//! use geojson::Geometry;
//!
//! let line: Geometry = r#"{
//!     "type": "LineString",
//!     "coordinates": [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [2.0, 5.0]]
//! }"#.parse().unwrap();
//!
//! let simplified = simplify_geometry(&Simplifier::new(0.5)?, line)?;
//! // Result: [[0.0, 0.0], [2.0, 0.0], [2.0, 5.0]]
//! ```

use geojson::{Geometry, PolygonType, Position, Value as GeoJsonValue};

use crate::error::{GeoError, Result};
use crate::simplify::{Point, Simplifier};

/// Smallest number of positions in a valid closed linear ring.
const MIN_RING_POSITIONS: usize = 4;

/// Simplify every path in a GeoJSON geometry.
///
/// Positions are read as `[x, y, ...]`; any extra ordinates (e.g. altitude)
/// travel with their position untouched.
///
/// Supported geometry types:
/// - Point, MultiPoint (returned unchanged, they are not paths)
/// - LineString, MultiLineString
/// - Polygon, MultiPolygon (each ring separately)
/// - GeometryCollection
///
/// A closed ring is split at the vertex farthest from its first position
/// and the two halves are simplified separately, since the chord between
/// the equal first and last positions has no length. A ring that would
/// shrink below 4 positions is kept as-is so that the output polygon stays
/// valid.
///
/// # Errors
///
/// Returns an error if any position has fewer than 2 ordinates or a
/// non-finite coordinate.
pub fn simplify_geometry(simplifier: &Simplifier, geometry: Geometry) -> Result<Geometry> {
    let new_value = match geometry.value {
        GeoJsonValue::Point(coord) => {
            to_point(&coord)?;
            GeoJsonValue::Point(coord)
        }
        GeoJsonValue::MultiPoint(coords) => {
            for coord in &coords {
                to_point(coord)?;
            }
            GeoJsonValue::MultiPoint(coords)
        }
        GeoJsonValue::LineString(coords) => {
            GeoJsonValue::LineString(simplify_positions(simplifier, coords)?)
        }
        GeoJsonValue::MultiLineString(lines) => {
            let simplified: Result<Vec<_>> = lines
                .into_iter()
                .map(|line| simplify_positions(simplifier, line))
                .collect();
            GeoJsonValue::MultiLineString(simplified?)
        }
        GeoJsonValue::Polygon(rings) => GeoJsonValue::Polygon(simplify_polygon(simplifier, rings)?),
        GeoJsonValue::MultiPolygon(polygons) => {
            let simplified: Result<Vec<_>> = polygons
                .into_iter()
                .map(|polygon| simplify_polygon(simplifier, polygon))
                .collect();
            GeoJsonValue::MultiPolygon(simplified?)
        }
        GeoJsonValue::GeometryCollection(geometries) => {
            let simplified: Result<Vec<_>> = geometries
                .into_iter()
                .map(|g| simplify_geometry(simplifier, g))
                .collect();
            GeoJsonValue::GeometryCollection(simplified?)
        }
    };

    Ok(Geometry::new(new_value))
}

/// Simplify a single line of positions.
///
/// Lines with 2 or fewer positions are returned unchanged.
pub fn simplify_positions(simplifier: &Simplifier, coords: Vec<Position>) -> Result<Vec<Position>> {
    let points = coords.iter().map(|c| to_point(c)).collect::<Result<Vec<_>>>()?;
    if points.len() <= 2 {
        return Ok(coords);
    }

    let keep = simplifier.indices(&points)?;
    Ok(select(coords, keep))
}

/// Keep the positions at the ascending indices `keep`.
fn select(coords: Vec<Position>, keep: Vec<usize>) -> Vec<Position> {
    let mut kept = keep.into_iter().peekable();
    coords
        .into_iter()
        .enumerate()
        .filter_map(|(i, coord)| {
            if kept.peek() == Some(&i) {
                kept.next();
                Some(coord)
            } else {
                None
            }
        })
        .collect()
}

/// Simplify a linear ring, keeping it closed.
fn simplify_ring(simplifier: &Simplifier, ring: Vec<Position>) -> Result<Vec<Position>> {
    let points = ring.iter().map(|c| to_point(c)).collect::<Result<Vec<_>>>()?;
    let n = points.len();
    if n < MIN_RING_POSITIONS || points[0] != points[n - 1] {
        return simplify_positions(simplifier, ring);
    }

    let start = points[0];
    let mut split = 0;
    let mut d_max = 0.0;
    for (i, p) in points.iter().enumerate().take(n - 1).skip(1) {
        let d = (p.x - start.x).hypot(p.y - start.y);
        if d > d_max {
            d_max = d;
            split = i;
        }
    }
    // Every vertex sits on the start position
    if split == 0 {
        return simplify_positions(simplifier, ring);
    }

    let head = simplifier.indices(&points[..=split])?;
    let tail = simplifier.indices(&points[split..])?;
    let keep = head
        .into_iter()
        .chain(tail.into_iter().skip(1).map(|i| i + split))
        .collect();

    Ok(select(ring, keep))
}

fn simplify_polygon(simplifier: &Simplifier, rings: PolygonType) -> Result<PolygonType> {
    rings
        .into_iter()
        .map(|ring| {
            let simplified = simplify_ring(simplifier, ring.clone())?;
            if simplified.len() < MIN_RING_POSITIONS {
                Ok(ring)
            } else {
                Ok(simplified)
            }
        })
        .collect()
}

fn to_point(coord: &[f64]) -> Result<Point> {
    if coord.len() < 2 {
        return Err(GeoError::InvalidCoordinate {
            message: "Coordinate must have at least 2 elements (x, y)".to_string(),
        });
    }
    Ok(Point::new(coord[0], coord[1]))
}
