//! Ramer-Douglas-Peucker polyline simplification.
//!
//! This module provides [`Simplifier`] and the [`simplify`] family of
//! functions, which reduce an ordered sequence of 2-D points to a subsequence
//! that keeps the overall shape of the path within a tolerance.
//!
//! # Distance Modes
//!
//! The deviation of a point from a chord is measured in one of two ways:
//!
//! - [`DistanceMode::Unnormalized`] (default): `|y21·px − x21·py + x2·y1 − y2·x1|`,
//!   the cross-product form without division by the chord length. This is
//!   proportional to the perpendicular distance, so the effective tolerance
//!   grows with the chord length. It matches the behavior existing `/rdp`
//!   clients rely on.
//! - [`DistanceMode::Perpendicular`]: the true Euclidean distance from the
//!   point to the line through the chord.
//!
//! # Example
//!
//! ```
//! use geokit::simplify::{simplify, Point};
//!
//! let line = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(2.0, 0.0),
//!     Point::new(3.0, 4.0),
//! ];
//!
//! let simplified = simplify(&line, 0.5).unwrap();
//! assert_eq!(
//!     simplified,
//!     vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(3.0, 4.0)]
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// How the deviation of a point from a chord is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    /// Cross-product magnitude, not divided by the chord length.
    #[default]
    Unnormalized,
    /// Euclidean distance to the line through the chord.
    Perpendicular,
}

impl DistanceMode {
    /// Distance of `p` from the line through `a` and `b`.
    ///
    /// In [`DistanceMode::Perpendicular`] a zero-length chord falls back to
    /// the distance between `p` and `a`.
    pub fn distance(self, p: Point, a: Point, b: Point) -> f64 {
        let x21 = b.x - a.x;
        let y21 = b.y - a.y;
        let cross = (y21 * p.x - x21 * p.y + b.x * a.y - b.y * a.x).abs();

        match self {
            DistanceMode::Unnormalized => cross,
            DistanceMode::Perpendicular => {
                let length = x21.hypot(y21);
                if length == 0.0 {
                    (p.x - a.x).hypot(p.y - a.y)
                } else {
                    cross / length
                }
            }
        }
    }
}

/// A validated tolerance and distance mode, reusable across polylines.
///
/// # Example
///
/// ```
/// use geokit::simplify::{DistanceMode, Point, Simplifier};
///
/// let simplifier = Simplifier::with_mode(0.5, DistanceMode::Perpendicular).unwrap();
/// let line = [
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.4),
///     Point::new(20.0, 0.0),
/// ];
/// assert_eq!(simplifier.indices(&line).unwrap(), vec![0, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simplifier {
    epsilon: f64,
    mode: DistanceMode,
}

impl Simplifier {
    /// Create a simplifier using [`DistanceMode::Unnormalized`].
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidTolerance`] if `epsilon` is negative or not finite.
    pub fn new(epsilon: f64) -> Result<Self> {
        Self::with_mode(epsilon, DistanceMode::default())
    }

    /// Create a simplifier with an explicit distance mode.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidTolerance`] if `epsilon` is negative or not finite.
    pub fn with_mode(epsilon: f64, mode: DistanceMode) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(GeoError::InvalidTolerance { epsilon });
        }
        Ok(Self { epsilon, mode })
    }

    /// The tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// The distance mode.
    pub fn mode(&self) -> DistanceMode {
        self.mode
    }

    /// Simplify a polyline, returning the retained points in order.
    ///
    /// # Errors
    ///
    /// - [`GeoError::TooFewPoints`] if `points` has fewer than 2 elements
    /// - [`GeoError::NonFiniteCoordinate`] if any coordinate is NaN or infinite
    pub fn simplify(&self, points: &[Point]) -> Result<Vec<Point>> {
        let indices = self.indices(points)?;
        Ok(indices.into_iter().map(|i| points[i]).collect())
    }

    /// Simplify a polyline, returning the indices of the retained points.
    ///
    /// The first and last indices are always present.
    pub fn indices(&self, points: &[Point]) -> Result<Vec<usize>> {
        validate_points(points)?;
        Ok(self.retained(points))
    }

    /// Mark retained points over index ranges of the borrowed slice.
    ///
    /// Ranges are processed from an explicit stack, so pathological inputs
    /// cannot exhaust the call stack.
    fn retained(&self, points: &[Point]) -> Vec<usize> {
        let n = points.len();
        let mut keep = vec![false; n];
        keep[0] = true;
        keep[n - 1] = true;

        let mut ranges = vec![(0, n - 1)];
        while let Some((start, end)) = ranges.pop() {
            if end <= start + 1 {
                continue;
            }

            let (a, b) = (points[start], points[end]);
            let mut farthest = start;
            let mut d_max = -1.0;
            for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
                let d = self.mode.distance(p, a, b);
                if d > d_max {
                    farthest = i;
                    d_max = d;
                }
            }

            if d_max > self.epsilon {
                keep[farthest] = true;
                ranges.push((farthest, end));
                ranges.push((start, farthest));
            }
        }

        keep.iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect()
    }
}

fn validate_points(points: &[Point]) -> Result<()> {
    if points.len() < 2 {
        return Err(GeoError::TooFewPoints {
            count: points.len(),
        });
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(GeoError::NonFiniteCoordinate { index });
    }
    Ok(())
}

/// Simplify a polyline with the unnormalized distance.
///
/// See [`Simplifier::simplify`].
pub fn simplify(points: &[Point], epsilon: f64) -> Result<Vec<Point>> {
    Simplifier::new(epsilon)?.simplify(points)
}

/// Simplify a polyline with an explicit distance mode.
pub fn simplify_with(points: &[Point], epsilon: f64, mode: DistanceMode) -> Result<Vec<Point>> {
    Simplifier::with_mode(epsilon, mode)?.simplify(points)
}

/// Indices of the points retained by simplification, in order.
pub fn simplify_indices(points: &[Point], epsilon: f64, mode: DistanceMode) -> Result<Vec<usize>> {
    Simplifier::with_mode(epsilon, mode)?.indices(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().copied().map(Point::from).collect()
    }

    fn sample_path() -> Vec<Point> {
        points(&[
            (0.0, 0.0),
            (1.0, 0.1),
            (2.0, -0.1),
            (3.0, 5.0),
            (4.0, 6.0),
            (5.0, 7.0),
            (6.0, 8.1),
            (7.0, 9.0),
            (8.0, 9.0),
            (9.0, 9.0),
        ])
    }

    fn is_subsequence(output: &[Point], input: &[Point]) -> bool {
        let mut it = input.iter();
        output.iter().all(|p| it.any(|q| q == p))
    }

    /// Every dropped point lies within `epsilon` of the chord joining the
    /// retained points on either side of it.
    fn assert_within_tolerance(input: &[Point], keep: &[usize], epsilon: f64, mode: DistanceMode) {
        assert_eq!(keep.first(), Some(&0));
        assert_eq!(keep.last(), Some(&(input.len() - 1)));

        for pair in keep.windows(2) {
            let (a, b) = (input[pair[0]], input[pair[1]]);
            for i in pair[0] + 1..pair[1] {
                let d = mode.distance(input[i], a, b);
                assert!(
                    d <= epsilon,
                    "point {i} dropped at distance {d} > {epsilon} ({mode:?})"
                );
            }
        }
    }

    fn wavy_track() -> Vec<Point> {
        (0..200)
            .map(|i| {
                let x = i as f64 * 0.25;
                Point::new(x, (x * 0.7).sin() * 3.0 + (x * 5.3).cos() * 0.2)
            })
            .collect()
    }

    #[test]
    fn test_dropped_points_within_tolerance() {
        for input in [sample_path(), wavy_track()] {
            for mode in [DistanceMode::Unnormalized, DistanceMode::Perpendicular] {
                for epsilon in [0.0, 0.05, 0.5, 1.0, 5.0, 100.0] {
                    let keep = simplify_indices(&input, epsilon, mode).unwrap();
                    assert!(keep.windows(2).all(|w| w[0] < w[1]));
                    assert_within_tolerance(&input, &keep, epsilon, mode);
                }
            }
        }
    }

    #[test]
    fn test_sample_path() {
        let input = sample_path();
        let result = simplify(&input, 1.0).unwrap();

        assert_eq!(
            result,
            points(&[(0.0, 0.0), (2.0, -0.1), (3.0, 5.0), (7.0, 9.0), (9.0, 9.0)])
        );
        assert!(result.contains(&Point::new(3.0, 5.0)));
    }

    #[test]
    fn test_sample_path_perpendicular() {
        let input = sample_path();
        let result = simplify_with(&input, 1.0, DistanceMode::Perpendicular).unwrap();

        assert_eq!(
            result,
            points(&[(0.0, 0.0), (2.0, -0.1), (3.0, 5.0), (7.0, 9.0), (9.0, 9.0)])
        );
    }

    #[test]
    fn test_endpoints_preserved() {
        let input = sample_path();
        for epsilon in [0.0, 0.5, 1.0, 10.0, 1e9] {
            let result = simplify(&input, epsilon).unwrap();
            assert_eq!(result.first(), input.first());
            assert_eq!(result.last(), input.last());
            assert!(is_subsequence(&result, &input));
        }
    }

    #[test]
    fn test_zero_tolerance_keeps_turns() {
        let input = points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0), (4.0, 0.0)]);
        let result = simplify(&input, 0.0).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_zero_tolerance_drops_collinear() {
        let input = points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let result = simplify(&input, 0.0).unwrap();
        assert_eq!(result, points(&[(0.0, 0.0), (3.0, 3.0)]));
    }

    #[test]
    fn test_large_tolerance_collapses() {
        let input = sample_path();
        let result = simplify(&input, 1e9).unwrap();
        assert_eq!(result, vec![input[0], input[9]]);
    }

    #[test]
    fn test_idempotent() {
        let input = sample_path();
        for mode in [DistanceMode::Unnormalized, DistanceMode::Perpendicular] {
            let once = simplify_with(&input, 1.0, mode).unwrap();
            let twice = simplify_with(&once, 1.0, mode).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_three_points_within_tolerance() {
        let input = points(&[(0.0, 0.0), (1.0, 0.5), (2.0, 0.0)]);
        let result = simplify(&input, 1.0).unwrap();
        assert_eq!(result, points(&[(0.0, 0.0), (2.0, 0.0)]));
    }

    #[test]
    fn test_two_points_unchanged() {
        let input = points(&[(0.0, 0.0), (5.0, 5.0)]);
        assert_eq!(simplify(&input, 0.0).unwrap(), input);
        assert_eq!(simplify_indices(&input, 3.0, DistanceMode::Perpendicular).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_modes_differ_on_long_chords() {
        // Unnormalized distance scales with the chord length (20 here).
        let input = points(&[(0.0, 0.0), (10.0, 0.5), (20.0, 0.0)]);

        let unnormalized = simplify_with(&input, 1.0, DistanceMode::Unnormalized).unwrap();
        assert_eq!(unnormalized.len(), 3);

        let perpendicular = simplify_with(&input, 1.0, DistanceMode::Perpendicular).unwrap();
        assert_eq!(perpendicular, points(&[(0.0, 0.0), (20.0, 0.0)]));
    }

    #[test]
    fn test_perpendicular_zero_length_chord() {
        // Closed loop: chord endpoints coincide.
        let input = points(&[(0.0, 0.0), (3.0, 4.0), (0.0, 0.0)]);

        let d = DistanceMode::Perpendicular.distance(input[1], input[0], input[2]);
        assert_eq!(d, 5.0);
        assert_eq!(
            simplify_with(&input, 1.0, DistanceMode::Perpendicular).unwrap(),
            input
        );
        assert_eq!(simplify(&input, 1.0).unwrap().len(), 2);
    }

    #[test]
    fn test_symmetric_plateau_keeps_corners() {
        let input = points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0)]);
        let indices = simplify_indices(&input, 0.0, DistanceMode::Perpendicular).unwrap();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_long_convex_path_keeps_every_point() {
        let input: Vec<Point> = (0..10_000)
            .map(|i| {
                let x = i as f64;
                Point::new(x, x * x)
            })
            .collect();
        let result = simplify(&input, 0.0).unwrap();
        assert_eq!(result.len(), input.len());
    }

    #[test]
    fn test_too_few_points() {
        assert!(matches!(
            simplify(&[], 1.0),
            Err(GeoError::TooFewPoints { count: 0 })
        ));
        assert!(matches!(
            simplify(&[Point::new(1.0, 1.0)], 1.0),
            Err(GeoError::TooFewPoints { count: 1 })
        ));
    }

    #[test]
    fn test_invalid_tolerance() {
        let input = sample_path();
        for epsilon in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                simplify(&input, epsilon),
                Err(GeoError::InvalidTolerance { .. })
            ));
        }
    }

    #[test]
    fn test_non_finite_coordinate() {
        let input = points(&[(0.0, 0.0), (1.0, f64::NAN), (2.0, 0.0)]);
        assert!(matches!(
            simplify(&input, 1.0),
            Err(GeoError::NonFiniteCoordinate { index: 1 })
        ));
    }

    #[test]
    fn test_point_serde() {
        let p: Point = serde_json::from_str(r#"{"x": 1.5, "y": -2.0}"#).unwrap();
        assert_eq!(p, Point::new(1.5, -2.0));

        let mode: DistanceMode = serde_json::from_str(r#""perpendicular""#).unwrap();
        assert_eq!(mode, DistanceMode::Perpendicular);
    }
}
