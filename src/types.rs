//! Common types used throughout nyt-loader
//!
//! Shared type aliases for the documents, rows and batches that flow
//! through the loader, plus the static argument descriptors.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One raw search result as returned by the API
pub type Document = JsonObject;

/// A document reduced to dotted keys with scalar or array values
pub type FlatRecord = JsonObject;

/// A bounded group of records delivered together
pub type Batch = Vec<FlatRecord>;

// ============================================================================
// Argument Descriptors
// ============================================================================

/// Value type of a plugin argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    Int,
    Bool,
    Str,
}

/// Describes one option accepted by the loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Flag name, including the leading dashes
    pub name: String,
    /// Help text
    pub help: String,
    /// Whether the option must be supplied
    pub required: bool,
    /// Default value
    pub default: JsonValue,
    /// Value type
    #[serde(rename = "type")]
    pub kind: ArgumentType,
}

impl ArgumentSpec {
    /// Create a new argument descriptor
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        required: bool,
        default: impl Into<JsonValue>,
        kind: ArgumentType,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            required,
            default: default.into(),
            kind,
        }
    }
}
