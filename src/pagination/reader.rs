//! Record and batch readers

use super::types::PaginationState;
use crate::config::QueryParameters;
use crate::decode::{flatten, DocumentDecoder};
use crate::error::{Error, Result};
use crate::http::PageFetcher;
use crate::types::{Batch, Document, FlatRecord};
use futures::Stream;
use std::collections::VecDeque;
use tracing::{debug, warn};

// ============================================================================
// Record Reader
// ============================================================================

/// Lazily yields flattened records across pages.
///
/// Pages are fetched while fewer than `target` documents have been seen.
/// The last page is yielded in full, so a reader may return more records
/// than requested. A page is accounted for (and `page` advanced) on the
/// pull after its last record, so a caller that stops early leaves the
/// page parameter where it was.
///
/// A page without documents advances `page` and ends the reader.
pub struct RecordReader<'a> {
    fetcher: &'a dyn PageFetcher,
    decoder: &'a DocumentDecoder,
    params: &'a mut QueryParameters,
    target: usize,
    state: PaginationState,
    pending: VecDeque<Document>,
    open_page: Option<usize>,
}

impl<'a> RecordReader<'a> {
    /// Create a reader that stops once `target` documents have been seen
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        decoder: &'a DocumentDecoder,
        params: &'a mut QueryParameters,
        target: usize,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            params,
            target,
            state: PaginationState::new(),
            pending: VecDeque::new(),
            open_page: None,
        }
    }

    /// Current pagination state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Page the next request will ask for
    pub fn current_page(&self) -> u32 {
        self.params.page()
    }

    /// Pull the next record
    pub async fn next(&mut self) -> Result<Option<FlatRecord>> {
        loop {
            if let Some(document) = self.pending.pop_front() {
                return Ok(Some(flatten(&document)));
            }

            if let Some(count) = self.open_page.take() {
                self.finish_page(count)?;
            }

            if self.state.done {
                return Ok(None);
            }
            if self.state.reached(self.target) {
                self.state.mark_done();
                return Ok(None);
            }

            let documents = match self.fetch_page().await {
                Ok(documents) => documents,
                Err(e) => {
                    self.state.mark_done();
                    return Err(e);
                }
            };

            if documents.is_empty() {
                warn!(
                    "Page {} returned no documents, stopping pagination",
                    self.params.page()
                );
                self.state.mark_done();
                self.finish_page(0)?;
                return Ok(None);
            }

            self.open_page = Some(documents.len());
            self.pending.extend(documents);
        }
    }

    /// Turn the reader into a stream of records
    pub fn into_stream(self) -> impl Stream<Item = Result<FlatRecord>> + 'a {
        futures::stream::try_unfold(self, |mut reader| async move {
            let next = reader.next().await?;
            Ok::<_, Error>(next.map(|record| (record, reader)))
        })
    }

    async fn fetch_page(&mut self) -> Result<Vec<Document>> {
        let body = self.fetcher.fetch(&*self.params).await?;
        let documents = self.decoder.decode(body)?;
        debug!(
            "Page {}: fetched {} documents",
            self.params.page(),
            documents.len()
        );
        Ok(documents)
    }

    fn finish_page(&mut self, documents: usize) -> Result<()> {
        self.state.add_page(documents);
        if let Err(e) = self.params.advance_page() {
            self.state.mark_done();
            return Err(e);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RecordReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordReader")
            .field("page", &self.params.page())
            .field("target", &self.target)
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Batch Reader
// ============================================================================

/// Groups the records of one [`RecordReader`] into batches.
///
/// Every batch holds exactly `batch_size` records except the last one,
/// which holds the remainder. The last batch is always produced, even
/// when the remainder is empty.
pub struct BatchReader<'a> {
    records: RecordReader<'a>,
    batch_size: usize,
    buffer: Batch,
    finished: bool,
}

impl<'a> BatchReader<'a> {
    /// Create a batch reader over `records`
    pub fn new(records: RecordReader<'a>, batch_size: usize) -> Self {
        Self {
            records,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            finished: false,
        }
    }

    /// Pagination state of the underlying record reader
    pub fn state(&self) -> &PaginationState {
        self.records.state()
    }

    /// Pull the next batch
    pub async fn next_batch(&mut self) -> Result<Option<Batch>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            match self.records.next().await {
                Ok(Some(record)) => {
                    self.buffer.push(record);
                    if self.buffer.len() >= self.batch_size {
                        return Ok(Some(std::mem::take(&mut self.buffer)));
                    }
                }
                Ok(None) => {
                    self.finished = true;
                    return Ok(Some(std::mem::take(&mut self.buffer)));
                }
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }
    }

    /// Turn the reader into a stream of batches
    pub fn into_stream(self) -> impl Stream<Item = Result<Batch>> + 'a {
        futures::stream::try_unfold(self, |mut reader| async move {
            let next = reader.next_batch().await?;
            Ok::<_, Error>(next.map(|batch| (batch, reader)))
        })
    }
}

impl std::fmt::Debug for BatchReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchReader")
            .field("records", &self.records)
            .field("batch_size", &self.batch_size)
            .field("buffered", &self.buffer.len())
            .field("finished", &self.finished)
            .finish()
    }
}
