use anyhow::{Context, Result};
use geokit::cell;
use serde::Serialize;

#[derive(Serialize)]
struct EncodeResponse<'a> {
    lat: f64,
    lon: f64,
    precision: u64,
    cell: &'a str,
}

#[derive(Serialize)]
struct KRingResponse<'a> {
    lat: f64,
    lon: f64,
    resolution: u8,
    k: u32,
    cells: &'a [String],
}

pub fn geohash_encode(lat: f64, lon: f64, precision: usize, json: bool) -> Result<()> {
    let hash = cell::encode_geohash(lat, lon, precision).context("Failed to encode geohash")?;

    if json {
        let response = EncodeResponse {
            lat,
            lon,
            precision: precision as u64,
            cell: &hash,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", hash);
    }

    Ok(())
}

pub fn geohash_decode(hash: &str, json: bool) -> Result<()> {
    let decoded = cell::decode_geohash(hash).context("Failed to decode geohash")?;

    if json {
        println!("{}", serde_json::to_string(&decoded)?);
    } else {
        println!(
            "{:.6},{:.6} (±{:.6}, ±{:.6})",
            decoded.lat, decoded.lon, decoded.lat_error, decoded.lon_error
        );
    }

    Ok(())
}

pub fn h3_encode(lat: f64, lon: f64, resolution: u8, json: bool) -> Result<()> {
    let index = cell::encode_h3(lat, lon, resolution).context("Failed to encode H3 cell")?;

    if json {
        let response = EncodeResponse {
            lat,
            lon,
            precision: resolution.into(),
            cell: &index,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", index);
    }

    Ok(())
}

pub fn h3_decode(index: &str, json: bool) -> Result<()> {
    let centre = cell::decode_h3(index).context("Failed to decode H3 cell")?;

    if json {
        println!("{}", serde_json::to_string(&centre)?);
    } else {
        println!("{:.6},{:.6}", centre.lat, centre.lon);
    }

    Ok(())
}

pub fn h3_k_ring(lat: f64, lon: f64, resolution: u8, k: u32, json: bool) -> Result<()> {
    let cells =
        cell::h3_k_ring(lat, lon, resolution, k).context("Failed to compute H3 k-ring")?;

    if json {
        let response = KRingResponse {
            lat,
            lon,
            resolution,
            k,
            cells: &cells,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        for cell in &cells {
            println!("{}", cell);
        }
    }

    Ok(())
}
