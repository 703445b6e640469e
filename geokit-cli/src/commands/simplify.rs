use anyhow::{bail, Context, Result};
use geojson::GeoJson;
use geokit::{geojson::simplify_geometry, DistanceMode, Point, Simplifier};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{default_output, progress_bar};

pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    epsilon: f64,
    normalize: bool,
    x_col: &str,
    y_col: &str,
) -> Result<()> {
    let mode = if normalize {
        DistanceMode::Perpendicular
    } else {
        DistanceMode::Unnormalized
    };
    let simplifier = Simplifier::with_mode(epsilon, mode).context("Invalid tolerance")?;

    // Detect file format
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let output_path = match extension.as_str() {
        "csv" => {
            let output_path = output.unwrap_or_else(|| default_output(&input, "simplified", "csv"));
            let (kept, total) = process_csv(&simplifier, &input, &output_path, x_col, y_col)?;
            println!("Kept {} of {} points", kept, total);
            output_path
        }
        "geojson" | "json" => {
            let output_path =
                output.unwrap_or_else(|| default_output(&input, "simplified", "geojson"));
            process_geojson(&simplifier, &input, &output_path)?;
            output_path
        }
        _ => bail!(
            "Unsupported file format: {}. Use .csv or .geojson",
            extension
        ),
    };

    println!("Output written to: {}", output_path.display());
    Ok(())
}

/// Treat the CSV rows as one polyline and write only the retained rows.
///
/// Returns `(kept, total)` row counts.
fn process_csv(
    simplifier: &Simplifier,
    input: &Path,
    output: &Path,
    x_col: &str,
    y_col: &str,
) -> Result<(usize, usize)> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let x_idx = headers
        .iter()
        .position(|h| h == x_col)
        .with_context(|| format!("Column '{}' not found in CSV", x_col))?;
    let y_idx = headers
        .iter()
        .position(|h| h == y_col)
        .with_context(|| format!("Column '{}' not found in CSV", y_col))?;

    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;

    let points = records
        .iter()
        .enumerate()
        .map(|(row, record)| -> Result<Point> {
            let x: f64 = record
                .get(x_idx)
                .with_context(|| format!("Missing x on row {}", row + 1))?
                .trim()
                .parse()
                .with_context(|| format!("Invalid x on row {}", row + 1))?;
            let y: f64 = record
                .get(y_idx)
                .with_context(|| format!("Missing y on row {}", row + 1))?
                .trim()
                .parse()
                .with_context(|| format!("Invalid y on row {}", row + 1))?;
            Ok(Point::new(x, y))
        })
        .collect::<Result<Vec<_>>>()?;

    let keep: Vec<usize> = if points.len() <= 2 {
        (0..points.len()).collect()
    } else {
        simplifier
            .indices(&points)
            .context("Failed to simplify polyline")?
    };

    let output_file = File::create(output).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));
    writer.write_record(&headers)?;
    for &i in &keep {
        writer.write_record(&records[i])?;
    }
    writer.flush()?;

    Ok((keep.len(), records.len()))
}

fn process_geojson(simplifier: &Simplifier, input: &Path, output: &Path) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let reader = BufReader::new(file);

    let geojson: GeoJson = serde_json::from_reader(reader).context("Failed to parse GeoJSON")?;

    let result = match geojson {
        GeoJson::Geometry(geometry) => GeoJson::Geometry(simplify_geometry(simplifier, geometry)?),
        GeoJson::Feature(mut feature) => {
            if let Some(geometry) = feature.geometry.take() {
                feature.geometry = Some(simplify_geometry(simplifier, geometry)?);
            }
            GeoJson::Feature(feature)
        }
        GeoJson::FeatureCollection(mut fc) => {
            let pb = progress_bar(fc.features.len() as u64)?;

            for (i, feature) in fc.features.iter_mut().enumerate() {
                if let Some(geometry) = feature.geometry.take() {
                    let simplified = simplify_geometry(simplifier, geometry)
                        .with_context(|| format!("Failed to simplify feature {}", i))?;
                    feature.geometry = Some(simplified);
                }
                pb.inc(1);
            }
            pb.finish_with_message("done");
            GeoJson::FeatureCollection(fc)
        }
    };

    let output_file = File::create(output).context("Failed to create output file")?;
    let mut writer = BufWriter::new(output_file);
    serde_json::to_writer_pretty(&mut writer, &result)?;
    writer.flush()?;

    Ok(())
}
