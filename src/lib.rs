//! # nyt-loader
//!
//! A data loader for the New York Times Article Search API.
//!
//! The loader turns a query into authenticated page requests, flattens every
//! returned article into a dotted-key record and hands the records to the
//! caller in fixed-size batches.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nyt_loader::{NyTimesSource, SourceConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SourceConfig::with_query("Silicon Valley");
//!     let mut source = NyTimesSource::new(&config, Some("my-api-key"))?;
//!
//!     println!("{:?}", source.schema().await?);
//!
//!     let mut batches = source.batches();
//!     while let Some(batch) = batches.next_batch().await? {
//!         println!("{} records", batch.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌───────────────┐
//! │ SourceConfig │──▶│ QueryParameters  │──▶│  PageFetcher  │
//! │  (YAML/CLI)  │   │ (api-key, page…) │   │ GET per page  │
//! └──────────────┘   └──────────────────┘   └───────┬───────┘
//!                                                   │ JSON
//!                    ┌──────────────────┐   ┌───────▼───────┐
//!                    │   BatchReader    │◀──│ RecordReader  │
//!                    │ Vec<FlatRecord>  │   │ decode+flatten│
//!                    └──────────────────┘   └───────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod pagination;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use config::{QueryParameters, SourceConfig};
pub use error::{Error, Result};
pub use source::NyTimesSource;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
