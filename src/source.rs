//! The NYTimes source connector
//!
//! [`NyTimesSource`] owns the query parameters and the page fetcher and
//! hands out readers over them:
//! - [`NyTimesSource::records`] yields flattened records
//! - [`NyTimesSource::batches`] yields batches of records
//! - [`NyTimesSource::schema`] lists the columns of the first record
//! - [`NyTimesSource::arguments`] describes the options the loader accepts

use crate::config::{QueryParameters, SourceConfig};
use crate::decode::DocumentDecoder;
use crate::error::Result;
use crate::http::{ArticleSearchClient, HttpClientConfig, PageFetcher};
use crate::pagination::{BatchReader, RecordReader};
use crate::types::{ArgumentSpec, ArgumentType, JsonValue};
use tracing::debug;

/// Data loader for the NYTimes Article Search API
pub struct NyTimesSource {
    fetcher: Box<dyn PageFetcher>,
    decoder: DocumentDecoder,
    params: QueryParameters,
    batch_size: usize,
}

impl NyTimesSource {
    /// Create a source talking to the public endpoint
    pub fn new(config: &SourceConfig, api_key: Option<&str>) -> Result<Self> {
        Self::with_http_config(config, api_key, HttpClientConfig::default())
    }

    /// Create a source with a custom HTTP configuration
    pub fn with_http_config(
        config: &SourceConfig,
        api_key: Option<&str>,
        http: HttpClientConfig,
    ) -> Result<Self> {
        // Validate before building the client so bad config never reaches the network
        let params = QueryParameters::build(config, api_key)?;
        let batch_size = config.resolved_batch_size()?;
        let client = ArticleSearchClient::with_config(http)?;

        Ok(Self::from_parts(Box::new(client), params, batch_size))
    }

    /// Create a source that pulls pages from a custom fetcher
    pub fn with_fetcher(
        fetcher: impl PageFetcher + 'static,
        config: &SourceConfig,
        api_key: Option<&str>,
    ) -> Result<Self> {
        let params = QueryParameters::build(config, api_key)?;
        let batch_size = config.resolved_batch_size()?;

        Ok(Self::from_parts(Box::new(fetcher), params, batch_size))
    }

    fn from_parts(fetcher: Box<dyn PageFetcher>, params: QueryParameters, batch_size: usize) -> Self {
        Self {
            fetcher,
            decoder: DocumentDecoder::new(),
            params,
            batch_size,
        }
    }

    /// Open the source.
    ///
    /// The API is stateless, so the incremental column and its last value
    /// are only logged.
    pub fn connect(&self, inc_column: Option<&str>, max_inc_value: Option<&JsonValue>) {
        debug!("Incremental Column: {inc_column:?}");
        debug!("Incremental Last Value: {max_inc_value:?}");
    }

    /// Close the source
    pub fn disconnect(&self) {
        debug!("Disconnected from source");
    }

    /// Current query parameters
    pub fn query_params(&self) -> &QueryParameters {
        &self.params
    }

    /// Records per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Read records until at least `target` documents have been seen
    pub fn records(&mut self, target: usize) -> RecordReader<'_> {
        RecordReader::new(&*self.fetcher, &self.decoder, &mut self.params, target)
    }

    /// Read one round of batches, starting at the current page
    pub fn batches(&mut self) -> BatchReader<'_> {
        let batch_size = self.batch_size;
        BatchReader::new(self.records(batch_size), batch_size)
    }

    /// Column names of the first available record (empty when there is none)
    pub async fn schema(&mut self) -> Result<Vec<String>> {
        let mut records = self.records(1);
        let first = records.next().await?;
        Ok(first
            .map(|record| record.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Options understood by the loader
    pub fn arguments() -> Vec<ArgumentSpec> {
        vec![
            ArgumentSpec::new(
                "--batch_size",
                "Number of NYTimes articles to load",
                false,
                10,
                ArgumentType::Int,
            ),
            ArgumentSpec::new(
                "--schema",
                "Return the schema of the dataset",
                false,
                false,
                ArgumentType::Bool,
            ),
            ArgumentSpec::new(
                "--arguments",
                "Get arguments that can be used with the dataloader plugin",
                false,
                false,
                ArgumentType::Bool,
            ),
            ArgumentSpec::new(
                "--query",
                "Query to the NYTimes Articles API",
                true,
                "Silicon Valley",
                ArgumentType::Str,
            ),
            ArgumentSpec::new(
                "--page",
                "Page from where to start requesting NYTimes Articles API",
                false,
                0,
                ArgumentType::Int,
            ),
        ]
    }
}

impl std::fmt::Debug for NyTimesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NyTimesSource")
            .field("params", &self.params)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}
