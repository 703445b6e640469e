//! Geohash and H3 cell encoding.
//!
//! Thin, validated wrappers around the [`geohash`] and [`h3o`] crates. All
//! coordinates are WGS84 decimal degrees.
//!
//! # Example
//!
//! ```
//! use geokit::cell::{decode_geohash, encode_geohash, encode_h3};
//!
//! let hash = encode_geohash(57.64911, 10.40744, 11).unwrap();
//! assert_eq!(hash, "u4pruydqqvj");
//!
//! let decoded = decode_geohash(&hash).unwrap();
//! assert!((decoded.lat - 57.64911).abs() < 1e-5);
//!
//! let index = encode_h3(37.775938728915946, -122.41795063018799, 9).unwrap();
//! assert_eq!(index, "8928308280fffff");
//! ```

use h3o::{CellIndex, LatLng, Resolution};
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};

/// Longest geohash accepted, in characters.
pub const MAX_GEOHASH_PRECISION: usize = 12;

/// Largest k-ring radius accepted by [`h3_k_ring`].
///
/// A disk of radius `k` holds `3k(k+1) + 1` cells.
pub const MAX_K_RING: u32 = 50;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// Centre of a geohash cell and its half-extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedGeohash {
    /// Latitude of the cell centre.
    pub lat: f64,
    /// Longitude of the cell centre.
    pub lon: f64,
    /// Half the cell height, in degrees.
    pub lat_error: f64,
    /// Half the cell width, in degrees.
    pub lon_error: f64,
}

/// Check that a coordinate is finite and within WGS84 range.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite()
        || !lon.is_finite()
        || !(-90.0..=90.0).contains(&lat)
        || !(-180.0..=180.0).contains(&lon)
    {
        return Err(GeoError::OutOfBounds { lat, lon });
    }
    Ok(())
}

/// Encode a coordinate as a geohash of `precision` characters.
///
/// # Errors
///
/// - [`GeoError::OutOfBounds`] for coordinates outside WGS84 range
/// - [`GeoError::InvalidPrecision`] unless `1 <= precision <= 12`
pub fn encode_geohash(lat: f64, lon: f64, precision: usize) -> Result<String> {
    validate_coordinates(lat, lon)?;
    if precision == 0 || precision > MAX_GEOHASH_PRECISION {
        return Err(GeoError::InvalidPrecision { precision });
    }

    geohash::encode(geohash::Coord { x: lon, y: lat }, precision)
        .map_err(|_| GeoError::OutOfBounds { lat, lon })
}

/// Decode a geohash into the centre of its cell.
pub fn decode_geohash(hash: &str) -> Result<DecodedGeohash> {
    if hash.is_empty() || hash.len() > MAX_GEOHASH_PRECISION {
        return Err(GeoError::InvalidGeohash {
            hash: hash.to_string(),
            message: format!("length must be 1 to {}", MAX_GEOHASH_PRECISION),
        });
    }

    let (centre, lon_error, lat_error) =
        geohash::decode(hash).map_err(|e| GeoError::InvalidGeohash {
            hash: hash.to_string(),
            message: e.to_string(),
        })?;

    Ok(DecodedGeohash {
        lat: centre.y,
        lon: centre.x,
        lat_error,
        lon_error,
    })
}

fn resolution(resolution: u8) -> Result<Resolution> {
    Resolution::try_from(resolution).map_err(|_| GeoError::InvalidResolution { resolution })
}

fn cell_for(lat: f64, lon: f64, res: u8) -> Result<CellIndex> {
    validate_coordinates(lat, lon)?;
    let res = resolution(res)?;
    let coord = LatLng::new(lat, lon).map_err(|_| GeoError::OutOfBounds { lat, lon })?;
    Ok(coord.to_cell(res))
}

/// Encode a coordinate as the hex string of its H3 cell at `resolution`.
///
/// # Errors
///
/// - [`GeoError::OutOfBounds`] for coordinates outside WGS84 range
/// - [`GeoError::InvalidResolution`] unless `resolution <= 15`
pub fn encode_h3(lat: f64, lon: f64, resolution: u8) -> Result<String> {
    Ok(cell_for(lat, lon, resolution)?.to_string())
}

/// Decode an H3 index string into the centre of its cell.
pub fn decode_h3(index: &str) -> Result<Coordinate> {
    let cell = index
        .parse::<CellIndex>()
        .map_err(|e| GeoError::InvalidH3Index {
            index: index.to_string(),
            message: e.to_string(),
        })?;
    let centre = LatLng::from(cell);

    Ok(Coordinate {
        lat: centre.lat(),
        lon: centre.lng(),
    })
}

/// All H3 cells within grid distance `k` of the cell containing the coordinate.
///
/// The result includes the containing cell itself.
///
/// # Errors
///
/// Same as [`encode_h3`], plus [`GeoError::InvalidKRing`] when `k > MAX_K_RING`.
pub fn h3_k_ring(lat: f64, lon: f64, resolution: u8, k: u32) -> Result<Vec<String>> {
    if k > MAX_K_RING {
        return Err(GeoError::InvalidKRing { k, max: MAX_K_RING });
    }
    let origin = cell_for(lat, lon, resolution)?;
    let disk: Vec<CellIndex> = origin.grid_disk(k);

    Ok(disk.into_iter().map(|cell| cell.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_geohash() {
        assert_eq!(encode_geohash(57.64911, 10.40744, 11).unwrap(), "u4pruydqqvj");
        assert_eq!(encode_geohash(57.64911, 10.40744, 5).unwrap(), "u4pru");
    }

    #[test]
    fn test_encode_geohash_invalid_precision() {
        assert!(matches!(
            encode_geohash(0.0, 0.0, 0),
            Err(GeoError::InvalidPrecision { precision: 0 })
        ));
        assert!(matches!(
            encode_geohash(0.0, 0.0, 13),
            Err(GeoError::InvalidPrecision { precision: 13 })
        ));
    }

    #[test]
    fn test_encode_geohash_out_of_bounds() {
        assert!(matches!(
            encode_geohash(91.0, 0.0, 5),
            Err(GeoError::OutOfBounds { .. })
        ));
        assert!(matches!(
            encode_geohash(0.0, f64::NAN, 5),
            Err(GeoError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_decode_geohash() {
        let decoded = decode_geohash("u4pruydqqvj").unwrap();
        assert!((decoded.lat - 57.64911).abs() < 1e-5);
        assert!((decoded.lon - 10.40744).abs() < 1e-5);
        assert!(decoded.lat_error > 0.0);
        assert!(decoded.lon_error > 0.0);
    }

    #[test]
    fn test_decode_geohash_contains_encoded_point() {
        let hash = encode_geohash(-33.8688, 151.2093, 7).unwrap();
        let decoded = decode_geohash(&hash).unwrap();
        assert!((decoded.lat - -33.8688).abs() <= decoded.lat_error);
        assert!((decoded.lon - 151.2093).abs() <= decoded.lon_error);
    }

    #[test]
    fn test_decode_geohash_invalid() {
        assert!(matches!(
            decode_geohash(""),
            Err(GeoError::InvalidGeohash { .. })
        ));
        // 'a' is not part of the geohash alphabet
        assert!(matches!(
            decode_geohash("u4pa"),
            Err(GeoError::InvalidGeohash { .. })
        ));
    }

    #[test]
    fn test_encode_h3() {
        let index = encode_h3(37.775938728915946, -122.41795063018799, 9).unwrap();
        assert_eq!(index, "8928308280fffff");
    }

    #[test]
    fn test_encode_h3_invalid_resolution() {
        assert!(matches!(
            encode_h3(0.0, 0.0, 16),
            Err(GeoError::InvalidResolution { resolution: 16 })
        ));
    }

    #[test]
    fn test_decode_h3_round_trip_stays_in_cell() {
        let index = encode_h3(48.8566, 2.3522, 10).unwrap();
        let centre = decode_h3(&index).unwrap();
        assert!((centre.lat - 48.8566).abs() < 0.01);
        assert!((centre.lon - 2.3522).abs() < 0.01);
        assert_eq!(encode_h3(centre.lat, centre.lon, 10).unwrap(), index);
    }

    #[test]
    fn test_decode_h3_invalid() {
        assert!(matches!(
            decode_h3("not-a-cell"),
            Err(GeoError::InvalidH3Index { .. })
        ));
    }

    #[test]
    fn test_h3_k_ring() {
        let origin = encode_h3(48.8566, 2.3522, 8).unwrap();

        let ring0 = h3_k_ring(48.8566, 2.3522, 8, 0).unwrap();
        assert_eq!(ring0, vec![origin.clone()]);

        let ring1 = h3_k_ring(48.8566, 2.3522, 8, 1).unwrap();
        assert_eq!(ring1.len(), 7);
        assert!(ring1.contains(&origin));

        let ring2 = h3_k_ring(48.8566, 2.3522, 8, 2).unwrap();
        assert_eq!(ring2.len(), 19);
    }

    #[test]
    fn test_h3_k_ring_too_large() {
        assert!(matches!(
            h3_k_ring(0.0, 0.0, 5, MAX_K_RING + 1),
            Err(GeoError::InvalidKRing { .. })
        ));
    }
}
