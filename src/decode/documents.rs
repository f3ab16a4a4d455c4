//! Document extraction from response bodies

use crate::error::{Error, Result};
use crate::types::{Document, JsonValue};

/// Where the Article Search API puts its results
pub const DEFAULT_DOCS_PATH: &str = "response.docs";

/// Extracts the documents array from a page body
#[derive(Debug, Clone)]
pub struct DocumentDecoder {
    /// Dot-separated path to the documents array
    docs_path: String,
}

impl Default for DocumentDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder {
    /// Create a decoder for the Article Search response shape
    pub fn new() -> Self {
        Self::with_path(DEFAULT_DOCS_PATH)
    }

    /// Create a decoder reading documents from a custom path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            docs_path: path.into(),
        }
    }

    /// Path the decoder reads from
    pub fn docs_path(&self) -> &str {
        &self.docs_path
    }

    /// Take the documents out of a page body.
    ///
    /// Every entry must be a JSON object; anything else means the API
    /// answered with a shape this loader does not understand.
    pub fn decode(&self, mut body: JsonValue) -> Result<Vec<Document>> {
        let path = self.docs_path.strip_prefix("$.").unwrap_or(&self.docs_path);

        let mut current = &mut body;
        for part in path.split('.').filter(|p| !p.is_empty()) {
            current = current.get_mut(part).ok_or_else(|| {
                Error::unexpected_response(
                    None,
                    format!("Response has no '{}' field", self.docs_path),
                )
            })?;
        }

        let JsonValue::Array(entries) = current.take() else {
            return Err(Error::unexpected_response(
                None,
                format!("Expected an array at '{}'", self.docs_path),
            ));
        };

        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                JsonValue::Object(doc) => Ok(doc),
                other => Err(Error::unexpected_response(
                    None,
                    format!(
                        "Document {index} at '{}' is not an object: {other}",
                        self.docs_path
                    ),
                )),
            })
            .collect()
    }
}
