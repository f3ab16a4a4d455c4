//! CLI module
//!
//! Command-line interface for running the loader.
//!
//! # Modes
//!
//! - default - page through results and print each batch
//! - `--schema` - print the columns of the first record
//! - `--arguments` - print the options the loader accepts

mod commands;
mod runner;

pub use commands::{Cli, OutputFormat};
pub use runner::Runner;
