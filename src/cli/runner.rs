//! CLI runner - executes the selected mode

use crate::cli::commands::{Cli, OutputFormat};
use crate::config::{api_key_from_env, SourceConfig};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::source::NyTimesSource;
use crate::types::{FlatRecord, JsonValue};
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
    api_key: Option<String>,
}

impl Runner {
    /// Create a new runner, taking the API key from the environment
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            api_key: api_key_from_env(),
        }
    }

    /// Replace the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Run the CLI, writing to stdout
    pub async fn run(&self) -> Result<()> {
        self.run_to(&mut std::io::stdout()).await
    }

    /// Run the CLI, writing results to `out`
    pub async fn run_to(&self, out: &mut impl Write) -> Result<()> {
        if self.cli.arguments {
            let arguments = NyTimesSource::arguments();
            writeln!(out, "{}", serde_json::to_string_pretty(&arguments)?)?;
        }

        if self.cli.schema {
            let mut source = self.build_source()?;
            let schema = source.schema().await?;
            writeln!(out, "{}", serde_json::to_string(&schema)?)?;
        }

        if self.cli.is_introspection() {
            return Ok(());
        }

        let mut source = self.build_source()?;
        source.connect(None, None);
        let result = self.write_batches(&mut source, out).await;
        source.disconnect();
        result
    }

    /// Configuration file (if any) overlaid with command-line values
    fn source_config(&self) -> Result<SourceConfig> {
        let cli_config = self.cli.source_config()?;
        match &self.cli.config {
            Some(path) => Ok(SourceConfig::from_file(path)?.merge(cli_config)),
            None => Ok(cli_config),
        }
    }

    fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder();
        if let Some(url) = &self.cli.base_url {
            builder = builder.endpoint(url.clone());
        }
        if let Some(secs) = self.cli.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(rpm) = self.cli.requests_per_minute {
            builder = builder.rate_limit(RateLimiterConfig::per_minute(rpm));
        }
        builder.build()
    }

    fn build_source(&self) -> Result<NyTimesSource> {
        let config = self.source_config()?;
        if config.query.is_none() {
            return Err(Error::missing_field("query"));
        }
        NyTimesSource::with_http_config(&config, self.api_key.as_deref(), self.http_config())
    }

    async fn write_batches(&self, source: &mut NyTimesSource, out: &mut impl Write) -> Result<()> {
        let mut batches = source.batches();
        let mut index = 0usize;
        let mut total = 0usize;

        while let Some(batch) = batches.next_batch().await? {
            total += batch.len();
            match self.cli.format {
                OutputFormat::Pretty => {
                    writeln!(out, "{index} Batch of {} items", batch.len())?;
                    for record in &batch {
                        writeln!(
                            out,
                            "  - {} - {}",
                            display_field(record, "_id"),
                            display_field(record, "headline.main")
                        )?;
                    }
                }
                OutputFormat::Json => {
                    let line = serde_json::to_string(&json!({
                        "batch": index,
                        "records": batch,
                    }))
                    .context("Failed to serialize batch")?;
                    writeln!(out, "{line}")?;
                }
            }
            index += 1;
        }

        info!("Loaded {total} records in {index} batches");
        Ok(())
    }
}

fn display_field(record: &FlatRecord, key: &str) -> String {
    match record.get(key) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}
