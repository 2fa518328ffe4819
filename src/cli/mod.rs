//! Command-line interface for nearby-eats.

mod commands;

use clap::{Parser, Subcommand};

/// nearby-eats - find places to eat around a point
#[derive(Parser)]
#[command(name = "nearby-eats")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API and the cache sweeper
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Run a single search and print the results
    #[command(alias = "s")]
    Search {
        /// Latitude of the search center
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude of the search center
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Comma separated categories, e.g. "restaurant,cafe"
        #[arg(long, short)]
        category: Option<String>,

        /// Cuisine or free-text keyword
        #[arg(long, short)]
        keyword: Option<String>,

        /// Provider override: google, osm or both
        #[arg(long, short)]
        provider: Option<String>,

        /// Number of results to print
        #[arg(long, short, default_value_t = crate::constants::limits::DEFAULT_CLI_RESULTS)]
        limit: usize,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
