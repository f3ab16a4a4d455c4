//! Test helpers shared by unit tests

use crate::config::QueryParameters;
use crate::error::Result;
use crate::http::PageFetcher;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Page fetcher that replays scripted responses and records requested pages.
///
/// Once the script runs out every request gets an empty page.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<JsonValue>>>,
    requested_pages: Mutex<Vec<u32>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page holding `count` documents with ids `{prefix}-{n}`
    pub fn page(self, prefix: &str, count: usize) -> Self {
        let docs: Vec<JsonValue> = (0..count)
            .map(|n| {
                json!({
                    "_id": format!("{prefix}-{n}"),
                    "headline": {"main": format!("Headline {prefix}-{n}")}
                })
            })
            .collect();
        self.body(json!({"response": {"docs": docs}}))
    }

    /// Queue a raw response body
    pub fn body(self, body: JsonValue) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Queue an error
    pub fn error(self, error: crate::Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Pages requested so far, in order
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested_pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, params: &QueryParameters) -> Result<JsonValue> {
        self.requested_pages.lock().unwrap().push(params.page());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"response": {"docs": []}})))
    }
}
