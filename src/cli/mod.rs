//! CLI module
//!
//! Command-line interface for talking to an OpenStack service.
//!
//! # Commands
//!
//! - `get` - Fetch a resource and print its body
//! - `list` - Walk a paginated collection, one item per line
//! - `version` - Print version information

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, Strategy};
pub use runner::{page_items, resolve_url, walk_collection, ListOptions, Runner};

#[cfg(test)]
mod tests;
