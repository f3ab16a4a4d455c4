//! Response decoder module
//!
//! Turns a page of search results into flat rows.
//!
//! # Overview
//!
//! - [`DocumentDecoder`] pulls the document list out of a response body
//!   (`response.docs` for the Article Search API).
//! - [`flatten`] expands nested objects of one document into dotted keys,
//!   so `{"headline": {"main": "x"}}` becomes `{"headline.main": "x"}`.

mod documents;
mod flatten;

pub use documents::{DocumentDecoder, DEFAULT_DOCS_PATH};
pub use flatten::{flatten, KEY_SEPARATOR};
