//! Pagination module
//!
//! Walks result pages by advancing the `page` query parameter.
//!
//! # Overview
//!
//! - [`RecordReader`] pulls pages until enough documents have been seen,
//!   yielding one flattened record per document.
//! - [`BatchReader`] groups the records of one reader into fixed-size
//!   batches and always finishes with a (possibly empty) trailing batch.
//!
//! Both expose a pull API (`next` / `next_batch`) and can be turned into a
//! [`futures::Stream`] with `into_stream`.

mod reader;
mod types;

pub use reader::{BatchReader, RecordReader};
pub use types::PaginationState;
