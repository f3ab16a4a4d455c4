//! Loader configuration and query parameter building
//!
//! `SourceConfig` is the typed configuration a user supplies (CLI flags
//! and/or a YAML/JSON file). `QueryParameters` is the validated request
//! parameter set derived from it, sent with every page request.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "NYTIMES_APIKEY";

/// Query parameter carrying the API key
pub const API_KEY_PARAM: &str = "api-key";

/// Query parameter carrying the page number
pub const PAGE_PARAM: &str = "page";

/// Default number of records per batch
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Date format accepted by `begin_date` / `end_date`
const DATE_FORMAT: &str = "%Y%m%d";

/// Query parameters understood by the Article Search API
pub const QUERY_PARAMS: [&str; 11] = [
    API_KEY_PARAM,
    "begin_date",
    "end_date",
    "facet",
    "facet_fields",
    "facet_filter",
    "fl",
    "fq",
    PAGE_PARAM,
    "query",
    "sort",
];

/// Check whether a parameter name is on the allow-list
pub fn is_query_param(name: &str) -> bool {
    QUERY_PARAMS.contains(&name)
}

/// Read the API key from the environment
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok()
}

// ============================================================================
// Sort Order
// ============================================================================

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Newest,
    Oldest,
    Relevance,
}

impl Sort {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Newest => "newest",
            Sort::Oldest => "oldest",
            Sort::Relevance => "relevance",
        }
    }
}

impl FromStr for Sort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "newest" => Ok(Sort::Newest),
            "oldest" => Ok(Sort::Oldest),
            "relevance" => Ok(Sort::Relevance),
            other => Err(Error::invalid_value(
                "sort",
                format!("expected one of newest, oldest, relevance; got '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// User-facing loader configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Search query
    pub query: Option<String>,
    /// Earliest publication date (YYYYMMDD)
    pub begin_date: Option<String>,
    /// Latest publication date (YYYYMMDD)
    pub end_date: Option<String>,
    /// Whether to return facet counts
    pub facet: Option<bool>,
    /// Facets to compute
    pub facet_fields: Option<String>,
    /// Whether facet counts respect the filter query
    pub facet_filter: Option<bool>,
    /// Fields to return per document
    pub fl: Option<String>,
    /// Filter query
    pub fq: Option<String>,
    /// Page to start from
    pub page: Option<u32>,
    /// Result ordering
    pub sort: Option<Sort>,
    /// Records per batch
    pub batch_size: Option<usize>,
    /// Additional raw query parameters
    pub params: BTreeMap<String, JsonValue>,
}

impl SourceConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config for a search query
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// Set the start page
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the batch size
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Add a raw query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Load a config file (YAML, or JSON when the extension is `.json`)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content).map_err(|e| {
                Error::config(format!(
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                ))
            })
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Overlay another config on top of this one; set fields in `other` win
    #[must_use]
    pub fn merge(mut self, other: SourceConfig) -> Self {
        self.query = other.query.or(self.query);
        self.begin_date = other.begin_date.or(self.begin_date);
        self.end_date = other.end_date.or(self.end_date);
        self.facet = other.facet.or(self.facet);
        self.facet_fields = other.facet_fields.or(self.facet_fields);
        self.facet_filter = other.facet_filter.or(self.facet_filter);
        self.fl = other.fl.or(self.fl);
        self.fq = other.fq.or(self.fq);
        self.page = other.page.or(self.page);
        self.sort = other.sort.or(self.sort);
        self.batch_size = other.batch_size.or(self.batch_size);
        self.params.extend(other.params);
        self
    }

    /// Batch size to use, validated
    pub fn resolved_batch_size(&self) -> Result<usize> {
        match self.batch_size {
            Some(0) => Err(Error::invalid_value(
                "batch_size",
                "must be at least 1",
            )),
            Some(size) => Ok(size),
            None => Ok(DEFAULT_BATCH_SIZE),
        }
    }

    fn typed_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                params.push((name, value));
            }
        };
        push("query", self.query.clone());
        push("begin_date", self.begin_date.clone());
        push("end_date", self.end_date.clone());
        push("facet", self.facet.map(|v| v.to_string()));
        push("facet_fields", self.facet_fields.clone());
        push("facet_filter", self.facet_filter.map(|v| v.to_string()));
        push("fl", self.fl.clone());
        push("fq", self.fq.clone());
        push("sort", self.sort.map(|s| s.as_str().to_string()));
        params
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Validated request parameters sent with every page request
#[derive(Clone, PartialEq, Eq)]
pub struct QueryParameters {
    values: BTreeMap<String, String>,
    page: u32,
}

impl QueryParameters {
    /// Build parameters from configuration and the API key.
    ///
    /// Fails before anything touches the network when the key is missing
    /// or a recognized parameter has an invalid value. Unrecognized
    /// parameters are dropped with a warning.
    pub fn build(config: &SourceConfig, api_key: Option<&str>) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::missing_field(API_KEY_PARAM))?;

        let mut values = BTreeMap::new();
        for (name, value) in config.typed_params() {
            values.insert(name.to_string(), value);
        }

        let mut page = config.page;
        let mut unsupported = Vec::new();

        for (name, raw) in &config.params {
            if !is_query_param(name) {
                unsupported.push(name.as_str());
                continue;
            }
            if name == API_KEY_PARAM {
                debug!("Ignoring configured '{API_KEY_PARAM}', the environment key wins");
                continue;
            }
            let Some(value) = param_to_string(name, raw)? else {
                continue;
            };
            if name == PAGE_PARAM {
                if page.is_none() {
                    page = Some(value.parse().map_err(|_| {
                        Error::invalid_value(PAGE_PARAM, format!("'{value}' is not a page number"))
                    })?);
                }
                continue;
            }
            values.entry(name.clone()).or_insert(value);
        }

        if !unsupported.is_empty() {
            warn!(
                "Following query params might be unsupported: {}",
                unsupported.join(", ")
            );
        }

        validate_values(&values)?;
        values.insert(API_KEY_PARAM.to_string(), api_key.to_string());

        Ok(Self {
            values,
            page: page.unwrap_or(0),
        })
    }

    /// Get a parameter value (`page` is available through [`Self::page`])
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// The API key sent with each request
    pub fn api_key(&self) -> &str {
        self.get(API_KEY_PARAM).unwrap_or_default()
    }

    /// Current page
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Move to the next page
    pub fn advance_page(&mut self) -> Result<()> {
        self.page = self.page.checked_add(1).ok_or_else(|| {
            Error::invalid_value(PAGE_PARAM, format!("no page after {}", self.page))
        })?;
        Ok(())
    }

    /// Render as query-string pairs
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.push((PAGE_PARAM.to_string(), self.page.to_string()));
        pairs
    }
}

impl fmt::Debug for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted: BTreeMap<&str, &str> = self
            .values
            .iter()
            .map(|(k, v)| {
                if k == API_KEY_PARAM {
                    (k.as_str(), "***")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("QueryParameters")
            .field("values", &redacted)
            .field("page", &self.page)
            .finish()
    }
}

fn param_to_string(name: &str, value: &JsonValue) -> Result<Option<String>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s.clone())),
        JsonValue::Bool(b) => Ok(Some(b.to_string())),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(Error::invalid_value(
            name,
            "expected a scalar value",
        )),
    }
}

fn validate_values(values: &BTreeMap<String, String>) -> Result<()> {
    let begin = values
        .get("begin_date")
        .map(|v| parse_date("begin_date", v))
        .transpose()?;
    let end = values
        .get("end_date")
        .map(|v| parse_date("end_date", v))
        .transpose()?;

    if let (Some(begin), Some(end)) = (begin, end) {
        if begin > end {
            return Err(Error::invalid_value(
                "begin_date",
                format!("{begin} is after end_date {end}"),
            ));
        }
    }

    if let Some(sort) = values.get("sort") {
        sort.parse::<Sort>()?;
    }

    Ok(())
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| Error::invalid_value(field, format!("'{value}' is not a YYYYMMDD date: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use test_case::test_case;

    #[test]
    fn test_build_requires_api_key() {
        let config = SourceConfig::with_query("Silicon Valley");

        let err = QueryParameters::build(&config, None).unwrap_err();
        assert!(err.is_config_error());
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == API_KEY_PARAM));

        let err = QueryParameters::build(&config, Some("   ")).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_build_defaults_page_to_zero() {
        let config = SourceConfig::with_query("Silicon Valley");
        let params = QueryParameters::build(&config, Some("secret")).unwrap();

        assert_eq!(params.page(), 0);
        assert_eq!(params.get("query"), Some("Silicon Valley"));
        assert_eq!(params.api_key(), "secret");
    }

    #[test]
    fn test_build_api_key_overrides_configured_value() {
        let config = SourceConfig::with_query("q").param("api-key", "from-config");
        let params = QueryParameters::build(&config, Some("from-env")).unwrap();

        assert_eq!(params.api_key(), "from-env");
    }

    #[test]
    fn test_build_drops_unknown_params() {
        let config = SourceConfig::with_query("q")
            .param("fq", "news_desk:(\"Technology\")")
            .param("colour", "blue")
            .param("limit", 50);
        let params = QueryParameters::build(&config, Some("k")).unwrap();

        assert_eq!(params.get("fq"), Some("news_desk:(\"Technology\")"));
        assert_eq!(params.get("colour"), None);
        assert_eq!(params.get("limit"), None);
        let pairs = params.to_query_pairs();
        let mut names: Vec<&str> = pairs.iter().map(|(name, _)| name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["api-key", "fq", "page", "query"]);
    }

    #[test]
    fn test_build_typed_fields_win_over_raw_params() {
        let mut config = SourceConfig::with_query("typed").page(3);
        config.sort = Some(Sort::Oldest);
        let config = config
            .param("query", "raw")
            .param("page", 9)
            .param("sort", "newest");
        let params = QueryParameters::build(&config, Some("k")).unwrap();

        assert_eq!(params.get("query"), Some("typed"));
        assert_eq!(params.get("sort"), Some("oldest"));
        assert_eq!(params.page(), 3);
    }

    #[test]
    fn test_build_page_from_raw_params() {
        let config = SourceConfig::with_query("q").param("page", "4");
        let params = QueryParameters::build(&config, Some("k")).unwrap();
        assert_eq!(params.page(), 4);

        let config = SourceConfig::with_query("q").param("page", "four");
        let err = QueryParameters::build(&config, Some("k")).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_build_rejects_nested_param_values() {
        let config = SourceConfig::with_query("q").param("fq", json!({"a": 1}));
        let err = QueryParameters::build(&config, Some("k")).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "fq"));
    }

    #[test_case("20240101", true ; "valid date")]
    #[test_case("2024-01-01", false ; "dashed date")]
    #[test_case("20241301", false ; "month out of range")]
    #[test_case("yesterday", false ; "not a date")]
    fn test_build_validates_begin_date(value: &str, ok: bool) {
        let mut config = SourceConfig::with_query("q");
        config.begin_date = Some(value.to_string());

        let result = QueryParameters::build(&config, Some("k"));
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn test_build_rejects_inverted_date_range() {
        let mut config = SourceConfig::with_query("q");
        config.begin_date = Some("20240201".to_string());
        config.end_date = Some("20240101".to_string());

        let err = QueryParameters::build(&config, Some("k")).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test_case("newest", true)]
    #[test_case("Oldest", true)]
    #[test_case("relevance", true)]
    #[test_case("random", false)]
    fn test_build_validates_raw_sort(value: &str, ok: bool) {
        let config = SourceConfig::with_query("q").param("sort", value);
        assert_eq!(QueryParameters::build(&config, Some("k")).is_ok(), ok);
    }

    #[test]
    fn test_advance_page() {
        let config = SourceConfig::with_query("q").page(2);
        let mut params = QueryParameters::build(&config, Some("k")).unwrap();

        params.advance_page().unwrap();
        params.advance_page().unwrap();
        assert_eq!(params.page(), 4);
    }

    #[test]
    fn test_advance_page_past_last_page() {
        let config = SourceConfig::with_query("q").page(u32::MAX);
        let mut params = QueryParameters::build(&config, Some("k")).unwrap();

        let err = params.advance_page().unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "page"));
        assert_eq!(params.page(), u32::MAX);
    }

    #[test]
    fn test_to_query_pairs() {
        let mut config = SourceConfig::with_query("q");
        config.facet = Some(true);
        let params = QueryParameters::build(&config, Some("k")).unwrap();

        let pairs = params.to_query_pairs();
        assert!(pairs.contains(&("api-key".to_string(), "k".to_string())));
        assert!(pairs.contains(&("facet".to_string(), "true".to_string())));
        assert!(pairs.contains(&("page".to_string(), "0".to_string())));
        assert!(pairs.contains(&("query".to_string(), "q".to_string())));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = SourceConfig::with_query("q");
        let params = QueryParameters::build(&config, Some("top-secret")).unwrap();

        let debug = format!("{params:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_resolved_batch_size() {
        assert_eq!(
            SourceConfig::new().resolved_batch_size().unwrap(),
            DEFAULT_BATCH_SIZE
        );
        assert_eq!(
            SourceConfig::new().batch_size(25).resolved_batch_size().unwrap(),
            25
        );
        assert!(SourceConfig::new()
            .batch_size(0)
            .resolved_batch_size()
            .unwrap_err()
            .is_config_error());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = SourceConfig::with_query("base")
            .page(1)
            .param("fq", "a")
            .param("fl", "web_url");
        let overrides = SourceConfig::with_query("cli").param("fq", "b");

        let merged = base.merge(overrides);
        assert_eq!(merged.query.as_deref(), Some("cli"));
        assert_eq!(merged.page, Some(1));
        assert_eq!(merged.params.get("fq"), Some(&json!("b")));
        assert_eq!(merged.params.get("fl"), Some(&json!("web_url")));
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
query: "Silicon Valley"
begin_date: "20240101"
sort: newest
batch_size: 20
params:
  fq: 'section_name:("Technology")'
  page: 2
"#;
        let config = SourceConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.query.as_deref(), Some("Silicon Valley"));
        assert_eq!(config.sort, Some(Sort::Newest));
        assert_eq!(config.batch_size, Some(20));

        let params = QueryParameters::build(&config, Some("k")).unwrap();
        assert_eq!(params.page(), 2);
        assert_eq!(params.get("sort"), Some("newest"));
        assert_eq!(params.get("begin_date"), Some("20240101"));
    }

    #[test]
    fn test_from_file_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("loader.yaml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        writeln!(file, "query: elections\npage: 5").unwrap();
        let config = SourceConfig::from_file(&yaml_path).unwrap();
        assert_eq!(config.query.as_deref(), Some("elections"));
        assert_eq!(config.page, Some(5));

        let json_path = dir.path().join("loader.json");
        std::fs::write(&json_path, r#"{"query": "climate", "facet": true}"#).unwrap();
        let config = SourceConfig::from_file(&json_path).unwrap();
        assert_eq!(config.query.as_deref(), Some("climate"));
        assert_eq!(config.facet, Some(true));
    }

    #[test_case("loader.json", "{not json" ; "json")]
    #[test_case("loader.yaml", "query: [unclosed" ; "yaml")]
    fn test_from_file_malformed_is_config_error(name: &str, content: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();

        let err = SourceConfig::from_file(&path).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_file_missing() {
        let err = SourceConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(err.is_config_error());
    }
}
