//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OpenStack service client
#[derive(Parser, Debug)]
#[command(name = "osclient")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Service endpoint, overrides the config file
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Auth token, overrides the config file
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a resource and print its decoded body
    Get {
        /// Path relative to the endpoint, or a full URL
        path: String,
    },

    /// Walk a paginated collection and print one item per line
    List {
        /// Path relative to the endpoint, or a full URL
        path: String,

        /// How the service paginates the collection
        #[arg(long, default_value = "linked")]
        strategy: Strategy,

        /// Body key holding the items (default: first array field)
        #[arg(long)]
        items_key: Option<String>,

        /// Dotted path to the next link, e.g. `servers_links` or `links.next`
        #[arg(long)]
        links_key: Option<String>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Print version information
    Version,
}

/// Pagination strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Whole collection in one response
    Single,
    /// Next URL embedded in the body
    Linked,
    /// `?marker=<last id>`
    Marker,
    /// `?offset=<items seen>`
    Offset,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}
