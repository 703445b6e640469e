use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

/// Polyline simplification and geohash/H3 cell tool
#[derive(Parser)]
#[command(name = "geokit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Cell system for `batch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CellKind {
    Geohash,
    H3,
}

#[derive(Subcommand)]
enum Commands {
    /// Simplify a polyline (CSV) or every geometry of a GeoJSON file
    Simplify {
        /// Input file (CSV or GeoJSON)
        input: PathBuf,

        /// Output file (same format as input if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Simplification tolerance
        #[arg(short, long, env = "GEOKIT_EPSILON", default_value = "1.0")]
        epsilon: f64,

        /// Use the true perpendicular distance
        #[arg(short, long)]
        normalize: bool,

        /// Column name for x (CSV only)
        #[arg(long, default_value = "x")]
        x_col: String,

        /// Column name for y (CSV only)
        #[arg(long, default_value = "y")]
        y_col: String,
    },

    /// Encode or decode geohashes
    Geohash {
        #[command(subcommand)]
        command: GeohashCommand,
    },

    /// Encode or decode H3 cells
    H3 {
        #[command(subcommand)]
        command: H3Command,
    },

    /// Append a cell column to every row of a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_cells.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cell system
        #[arg(long, value_enum, default_value = "geohash")]
        cell: CellKind,

        /// Geohash length or H3 resolution
        #[arg(short, long, default_value = "9")]
        precision: u8,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,
    },
}

#[derive(Subcommand)]
enum GeohashCommand {
    /// Encode a coordinate
    Encode {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Geohash length (1 to 12)
        #[arg(short, long, default_value = "9")]
        precision: usize,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Decode a geohash into its cell centre
    Decode {
        hash: String,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum H3Command {
    /// Encode a coordinate
    Encode {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// H3 resolution (0 to 15)
        #[arg(short, long, default_value = "9")]
        resolution: u8,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Decode an H3 index into its cell centre
    Decode {
        index: String,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List the cells within k steps of the cell containing a coordinate
    Kring {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// H3 resolution (0 to 15)
        #[arg(short, long, default_value = "9")]
        resolution: u8,

        /// Ring radius
        #[arg(short, default_value = "1")]
        k: u32,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simplify {
            input,
            output,
            epsilon,
            normalize,
            x_col,
            y_col,
        } => commands::simplify::run(input, output, epsilon, normalize, &x_col, &y_col),
        Commands::Geohash { command } => match command {
            GeohashCommand::Encode {
                lat,
                lon,
                precision,
                json,
            } => commands::cell::geohash_encode(lat, lon, precision, json),
            GeohashCommand::Decode { hash, json } => commands::cell::geohash_decode(&hash, json),
        },
        Commands::H3 { command } => match command {
            H3Command::Encode {
                lat,
                lon,
                resolution,
                json,
            } => commands::cell::h3_encode(lat, lon, resolution, json),
            H3Command::Decode { index, json } => commands::cell::h3_decode(&index, json),
            H3Command::Kring {
                lat,
                lon,
                resolution,
                k,
                json,
            } => commands::cell::h3_k_ring(lat, lon, resolution, k, json),
        },
        Commands::Batch {
            input,
            output,
            cell,
            precision,
            lat_col,
            lon_col,
        } => commands::batch::run(input, output, cell, precision, &lat_col, &lon_col),
    }
}
