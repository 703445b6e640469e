//! Python bindings for the geokit simplification and cell encoding library.

#![allow(clippy::useless_conversion)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

// Use fully qualified path to avoid collision with the Python module name
use ::geokit as geokit_lib;
use geokit_lib::{DistanceMode, GeoError, Point};

fn to_py_err(e: GeoError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn distance_mode(normalize: bool) -> DistanceMode {
    if normalize {
        DistanceMode::Perpendicular
    } else {
        DistanceMode::Unnormalized
    }
}

fn to_points(points: Vec<(f64, f64)>) -> Vec<Point> {
    points.into_iter().map(Point::from).collect()
}

/// Ramer-Douglas-Peucker simplifier with a fixed tolerance.
///
/// Example:
///     >>> s = Simplifier(1.0)
///     >>> s.simplify([(0, 0), (1, 0.1), (2, 0)])
///     [(0.0, 0.0), (2.0, 0.0)]
#[pyclass]
struct Simplifier {
    inner: geokit_lib::Simplifier,
}

#[pymethods]
impl Simplifier {
    /// Create a simplifier.
    ///
    /// Args:
    ///     epsilon: Tolerance, finite and non-negative.
    ///     normalize: Measure the true perpendicular distance (default: False).
    ///
    /// Raises:
    ///     ValueError: If epsilon is negative or not finite.
    #[new]
    #[pyo3(signature = (epsilon, normalize=false))]
    fn new(epsilon: f64, normalize: bool) -> PyResult<Self> {
        let inner = geokit_lib::Simplifier::with_mode(epsilon, distance_mode(normalize))
            .map_err(to_py_err)?;
        Ok(Simplifier { inner })
    }

    #[getter]
    fn epsilon(&self) -> f64 {
        self.inner.epsilon()
    }

    #[getter]
    fn normalize(&self) -> bool {
        self.inner.mode() == DistanceMode::Perpendicular
    }

    /// Simplify a sequence of (x, y) points.
    fn simplify(&self, points: Vec<(f64, f64)>) -> PyResult<Vec<(f64, f64)>> {
        let simplified = self
            .inner
            .simplify(&to_points(points))
            .map_err(to_py_err)?;
        Ok(simplified.into_iter().map(|p| (p.x, p.y)).collect())
    }

    /// Indices of the points a simplification keeps, ascending.
    fn indices(&self, points: Vec<(f64, f64)>) -> PyResult<Vec<usize>> {
        self.inner.indices(&to_points(points)).map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "Simplifier(epsilon={}, normalize={})",
            self.epsilon(),
            if self.normalize() { "True" } else { "False" }
        )
    }
}

/// Simplify a polyline with Ramer-Douglas-Peucker.
///
/// Args:
///     points: Sequence of (x, y) tuples, at least 2.
///     epsilon: Tolerance, finite and non-negative.
///     normalize: Measure the true perpendicular distance (default: False).
///
/// Returns:
///     The retained points, first and last always included.
///
/// Raises:
///     ValueError: On fewer than 2 points, a bad tolerance or a non-finite coordinate.
#[pyfunction]
#[pyo3(signature = (points, epsilon, normalize=false))]
fn simplify(points: Vec<(f64, f64)>, epsilon: f64, normalize: bool) -> PyResult<Vec<(f64, f64)>> {
    Simplifier::new(epsilon, normalize)?.simplify(points)
}

/// Indices of the points `simplify` would keep.
#[pyfunction]
#[pyo3(signature = (points, epsilon, normalize=false))]
fn simplify_indices(points: Vec<(f64, f64)>, epsilon: f64, normalize: bool) -> PyResult<Vec<usize>> {
    Simplifier::new(epsilon, normalize)?.indices(points)
}

/// Encode a coordinate as a geohash.
///
/// Example:
///     >>> encode_geohash(57.64911, 10.40744, 11)
///     'u4pruydqqvj'
#[pyfunction]
#[pyo3(signature = (lat, lon, precision=9))]
fn encode_geohash(lat: f64, lon: f64, precision: usize) -> PyResult<String> {
    geokit_lib::cell::encode_geohash(lat, lon, precision).map_err(to_py_err)
}

/// Decode a geohash.
///
/// Returns:
///     Tuple of (lat, lon, lat_error, lon_error) for the cell centre.
#[pyfunction]
fn decode_geohash(hash: &str) -> PyResult<(f64, f64, f64, f64)> {
    let d = geokit_lib::cell::decode_geohash(hash).map_err(to_py_err)?;
    Ok((d.lat, d.lon, d.lat_error, d.lon_error))
}

/// Encode a coordinate as an H3 index string.
///
/// Example:
///     >>> encode_h3(37.775938728915946, -122.41795063018799, 9)
///     '8928308280fffff'
#[pyfunction]
#[pyo3(signature = (lat, lon, resolution=9))]
fn encode_h3(lat: f64, lon: f64, resolution: u8) -> PyResult<String> {
    geokit_lib::cell::encode_h3(lat, lon, resolution).map_err(to_py_err)
}

/// Decode an H3 index into the (lat, lon) of its cell centre.
#[pyfunction]
fn decode_h3(index: &str) -> PyResult<(f64, f64)> {
    let c = geokit_lib::cell::decode_h3(index).map_err(to_py_err)?;
    Ok((c.lat, c.lon))
}

/// H3 cells within grid distance k of the cell containing a coordinate.
#[pyfunction]
#[pyo3(signature = (lat, lon, resolution=9, k=1))]
fn h3_k_ring(lat: f64, lon: f64, resolution: u8, k: u32) -> PyResult<Vec<String>> {
    geokit_lib::cell::h3_k_ring(lat, lon, resolution, k).map_err(to_py_err)
}

/// geokit - polyline simplification and geohash/H3 cells.
///
/// Example:
///     >>> import geokit_py as geokit
///     >>> geokit.simplify([(0, 0), (1, 0.1), (2, -0.1), (3, 5)], 1.0)
///     >>> geokit.encode_h3(48.8566, 2.3522, 9)
#[pymodule]
fn geokit_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Simplifier>()?;
    m.add_function(wrap_pyfunction!(simplify, m)?)?;
    m.add_function(wrap_pyfunction!(simplify_indices, m)?)?;
    m.add_function(wrap_pyfunction!(encode_geohash, m)?)?;
    m.add_function(wrap_pyfunction!(decode_geohash, m)?)?;
    m.add_function(wrap_pyfunction!(encode_h3, m)?)?;
    m.add_function(wrap_pyfunction!(decode_h3, m)?)?;
    m.add_function(wrap_pyfunction!(h3_k_ring, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("MAX_GEOHASH_PRECISION", geokit_lib::cell::MAX_GEOHASH_PRECISION)?;
    m.add("MAX_K_RING", geokit_lib::cell::MAX_K_RING)?;
    Ok(())
}
