//! CLI arguments and parsing

use crate::config::{Sort, SourceConfig};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use clap::Parser;
use std::path::PathBuf;

/// NYTimes dataloader plugin
#[derive(Parser, Debug)]
#[command(name = "nyt-loader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// How many articles to get per batch [default: 10]
    #[arg(long = "batch_size", alias = "batch-size")]
    pub batch_size: Option<usize>,

    /// Return the schema of the dataset
    #[arg(long)]
    pub schema: bool,

    /// Get arguments that can be used with the dataloader plugin
    #[arg(long)]
    pub arguments: bool,

    /// Query to the NYTimes Articles API
    #[arg(long)]
    pub query: Option<String>,

    /// Page from where to start requesting NYTimes Articles API [default: 0]
    #[arg(long)]
    pub page: Option<u32>,

    /// Earliest publication date (YYYYMMDD)
    #[arg(long = "begin_date", alias = "begin-date")]
    pub begin_date: Option<String>,

    /// Latest publication date (YYYYMMDD)
    #[arg(long = "end_date", alias = "end-date")]
    pub end_date: Option<String>,

    /// Result ordering
    #[arg(long, value_enum)]
    pub sort: Option<Sort>,

    /// Filter query
    #[arg(long)]
    pub fq: Option<String>,

    /// Fields to return per document (comma-separated)
    #[arg(long)]
    pub fl: Option<String>,

    /// Return facet counts
    #[arg(long)]
    pub facet: Option<bool>,

    /// Facets to compute (comma-separated)
    #[arg(long = "facet_fields", alias = "facet-fields")]
    pub facet_fields: Option<String>,

    /// Make facet counts respect the filter query
    #[arg(long = "facet_filter", alias = "facet-filter")]
    pub facet_filter: Option<bool>,

    /// Extra query parameter as KEY=VALUE (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long = "timeout_secs", alias = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// Pace requests to at most this many per minute
    #[arg(long = "requests_per_minute", alias = "requests-per-minute")]
    pub requests_per_minute: Option<u32>,

    /// Override the Article Search endpoint
    #[arg(long = "base_url", alias = "base-url", hide = true)]
    pub base_url: Option<String>,
}

impl Cli {
    /// Whether an introspection flag replaces the batch run
    pub fn is_introspection(&self) -> bool {
        self.schema || self.arguments
    }

    /// Source configuration given on the command line
    pub fn source_config(&self) -> Result<SourceConfig> {
        let mut config = SourceConfig {
            query: self.query.clone(),
            begin_date: self.begin_date.clone(),
            end_date: self.end_date.clone(),
            facet: self.facet,
            facet_fields: self.facet_fields.clone(),
            facet_filter: self.facet_filter,
            fl: self.fl.clone(),
            fq: self.fq.clone(),
            page: self.page,
            sort: self.sort,
            batch_size: self.batch_size,
            ..Default::default()
        };

        for param in &self.params {
            let (key, value) = parse_param(param)?;
            config.params.insert(key, value);
        }

        Ok(config)
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Pretty,
    /// JSON output (one batch per line)
    Json,
}

fn parse_param(raw: &str) -> Result<(String, JsonValue)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        Error::invalid_value("param", format!("'{raw}' is not in KEY=VALUE form"))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_value("param", format!("'{raw}' has an empty key")));
    }
    Ok((key.to_string(), JsonValue::String(value.to_string())))
}
