//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Find the spot near a place most likely to stay dry
#[derive(Debug, Parser)]
#[command(name = "dryspot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./dryspot.toml if present)
    #[arg(short, long, global = true, env = "DRYSPOT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search around a place for the driest spot
    Search {
        /// Place name, e.g. "Berlin" or "Alexanderplatz, Berlin"
        place: String,

        /// Search radius in km (default from configuration)
        #[arg(short, long)]
        radius: Option<f64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Number of sites to show, best first
        #[arg(long, default_value_t = 1)]
        top: usize,

        /// Label the winning site with the nearest named place
        #[arg(long)]
        labels: bool,
    },

    /// Print the nine candidate points for a coordinate (no network)
    Candidates {
        /// Origin latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Origin longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in km (default from configuration)
        #[arg(short, long)]
        radius: Option<f64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check that the geocoding and forecast services are reachable
    Health {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
