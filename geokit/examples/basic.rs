//! Basic example demonstrating geokit library usage.
//!
//! Run with: cargo run --example basic -- 1.0

use geokit::cell::{encode_geohash, encode_h3, h3_k_ring};
use geokit::{simplify_with, DistanceMode, GeoError, Point};
use std::env;

fn main() -> Result<(), GeoError> {
    // Tolerance from the command line, 1.0 by default
    let epsilon: f64 = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1.0);

    let path: Vec<Point> = [
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
    ]
    .into_iter()
    .map(Point::from)
    .collect();

    println!("Simplification (epsilon = {}):", epsilon);
    println!("{:-<50}", "");

    for mode in [DistanceMode::Unnormalized, DistanceMode::Perpendicular] {
        let simplified = simplify_with(&path, epsilon, mode)?;
        let coords: Vec<String> = simplified
            .iter()
            .map(|p| format!("({}, {})", p.x, p.y))
            .collect();
        println!(
            "{:?}: {} -> {} points: {}",
            mode,
            path.len(),
            simplified.len(),
            coords.join(" ")
        );
    }

    // Cell encodings for some famous landmarks
    let locations = [
        ("Eiffel Tower", 48.8584, 2.2945),
        ("Sydney Opera House", -33.8568, 151.2153),
        ("Golden Gate Bridge", 37.8199, -122.4783),
    ];

    println!("\nCell encodings:");
    println!("{:-<50}", "");

    for (name, lat, lon) in &locations {
        let geohash = encode_geohash(*lat, *lon, 9)?;
        let h3 = encode_h3(*lat, *lon, 9)?;
        let neighbours = h3_k_ring(*lat, *lon, 9, 1)?;
        println!(
            "{}: geohash={} h3={} ({} cells in 1-ring)",
            name,
            geohash,
            h3,
            neighbours.len()
        );
    }

    Ok(())
}
