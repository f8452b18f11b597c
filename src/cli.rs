use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cineanalytics")]
#[command(author, version, about = "Movie discovery front end for TMDB")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List movies trending this week
    Trending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search movies by title
    Search {
        /// Search term
        #[arg(required = true)]
        term: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details for one movie
    Movie {
        /// TMDB movie id
        #[arg(required = true)]
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive live search: each line on stdin replaces the query
    Browse,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
