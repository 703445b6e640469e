use anyhow::{Context, Result};
use geokit::cell;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::{default_output, progress_bar};
use crate::CellKind;

pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    kind: CellKind,
    precision: u8,
    lat_col: &str,
    lon_col: &str,
) -> Result<()> {
    let output_path = output.unwrap_or_else(|| default_output(&input, "cells", "csv"));
    let rows = process_csv(&input, &output_path, kind, precision, lat_col, lon_col)?;

    println!("Encoded {} rows", rows);
    println!("Output written to: {}", output_path.display());
    Ok(())
}

fn column_name(kind: CellKind) -> &'static str {
    match kind {
        CellKind::Geohash => "geohash",
        CellKind::H3 => "h3",
    }
}

fn encode(kind: CellKind, lat: f64, lon: f64, precision: u8) -> geokit::Result<String> {
    match kind {
        CellKind::Geohash => cell::encode_geohash(lat, lon, precision as usize),
        CellKind::H3 => cell::encode_h3(lat, lon, precision),
    }
}

/// Copy every row of `input` to `output` with a cell column appended.
fn process_csv(
    input: &Path,
    output: &Path,
    kind: CellKind,
    precision: u8,
    lat_col: &str,
    lon_col: &str,
) -> Result<u64> {
    // Fail on a bad precision before reading any data
    encode(kind, 0.0, 0.0, precision).context("Invalid precision")?;

    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;

    // Collect records for progress bar
    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    let pb = progress_bar(records.len() as u64)?;

    let output_file = File::create(output).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push(column_name(kind));
    writer.write_record(&new_headers)?;

    for (row, record) in records.iter().enumerate() {
        let lat: f64 = record
            .get(lat_idx)
            .context("Missing latitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude on row {}", row + 1))?;
        let lon: f64 = record
            .get(lon_idx)
            .context("Missing longitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude on row {}", row + 1))?;

        // Out-of-range rows get an empty cell rather than aborting the file
        let cell = encode(kind, lat, lon, precision).unwrap_or_default();

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&cell);
        writer.write_record(&new_record)?;

        pb.inc(1);
    }

    writer.flush()?;
    pb.finish_with_message("done");

    Ok(records.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_batch_geohash() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.csv");
        let output = dir.path().join("out.csv");
        fs::write(&input, "name,lat,lon\naalborg,57.64911,10.40744\npole,95.0,0.0\n").unwrap();

        let rows = process_csv(&input, &output, CellKind::Geohash, 11, "lat", "lon").unwrap();
        assert_eq!(rows, 2);

        let written = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "name,lat,lon,geohash");
        assert_eq!(lines[1], "aalborg,57.64911,10.40744,u4pruydqqvj");
        assert_eq!(lines[2], "pole,95.0,0.0,");
    }

    #[test]
    fn test_batch_h3_custom_columns() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.csv");
        let output = dir.path().join("out.csv");
        fs::write(
            &input,
            "latitude,longitude\n37.775938728915946,-122.41795063018799\n",
        )
        .unwrap();

        process_csv(&input, &output, CellKind::H3, 9, "latitude", "longitude").unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("latitude,longitude,h3\n"));
        assert!(written.contains(",8928308280fffff"));
    }

    #[test]
    fn test_batch_invalid_precision() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.csv");
        let output = dir.path().join("out.csv");
        fs::write(&input, "lat,lon\n0,0\n").unwrap();

        assert!(process_csv(&input, &output, CellKind::H3, 16, "lat", "lon").is_err());
        assert!(process_csv(&input, &output, CellKind::Geohash, 0, "lat", "lon").is_err());
    }

    #[test]
    fn test_batch_missing_column() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.csv");
        let output = dir.path().join("out.csv");
        fs::write(&input, "y,x\n0,0\n").unwrap();

        let err = process_csv(&input, &output, CellKind::Geohash, 5, "lat", "lon").unwrap_err();
        assert!(err.to_string().contains("Column 'lat' not found"));
    }
}
