// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Indexer
//!
//! Consumes completed documents, batches them by size or timeout, ships
//! each batch to the search sink in one bulk call, and emits per-document
//! FINISH/FAIL events from the sink's reported outcome (§4.5).

use docflow_bootstrap::shutdown::CancellationToken;
use docflow_domain::{BatchOutcome, Document, Event, IndexSink, IndexerMessenger, PipelineError, Poll, RunId, SinkOptions};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// `indexer.*` tunables (§6): `batch_size`/`batch_timeout` default to
/// 100/100ms per §4.5; `routing_field`/`versioning` are the optional
/// per-document routing/versioning settings passed to the sink.
#[derive(Debug, Clone)]
pub struct IndexerSettings {
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub poll_timeout: Duration,
    pub routing_field: Option<String>,
    pub versioning: bool,
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_timeout: Duration::from_millis(100),
            poll_timeout: Duration::from_millis(500),
            routing_field: None,
            versioning: false,
        }
    }
}

/// Batches completed documents into the sink and reports per-document
/// outcomes back over the Messenger's events queue.
pub struct Indexer<M: IndexerMessenger, S: IndexSink> {
    messenger: Arc<M>,
    sink: Arc<S>,
    settings: IndexerSettings,
    cancel: CancellationToken,
}

impl<M: IndexerMessenger, S: IndexSink> Indexer<M, S> {
    pub fn new(messenger: Arc<M>, sink: Arc<S>, settings: IndexerSettings, cancel: CancellationToken) -> Self {
        Self {
            messenger,
            sink,
            settings,
            cancel,
        }
    }

    /// Run until the completed-documents queue reports `Poll::Closed`,
    /// draining any partial batch unconditionally before returning
    /// (§4.5 `flush()`).
    pub async fn run(self) -> Result<(), PipelineError> {
        self.sink.validate_connection().await.map_err(|e| {
            PipelineError::sink(format!("sink connection validation failed, indexer cannot start: {e}"))
        })?;
        info!("indexer started");
        let mut batch: Vec<Document> = Vec::new();
        let mut batch_started_at: Option<Instant> = None;

        loop {
            if self.cancel.is_cancelled() {
                self.flush(&mut batch).await?;
                break;
            }

            match self.messenger.poll_completed(self.settings.poll_timeout).await? {
                Poll::Item(doc) => {
                    if batch.is_empty() {
                        batch_started_at = Some(Instant::now());
                    }
                    batch.push(doc);
                    if batch.len() >= self.settings.batch_size {
                        self.flush(&mut batch).await?;
                        batch_started_at = None;
                    }
                }
                Poll::Empty => {
                    let timed_out = batch_started_at.map(|t| t.elapsed() >= self.settings.batch_timeout).unwrap_or(false);
                    if !batch.is_empty() && timed_out {
                        self.flush(&mut batch).await?;
                        batch_started_at = None;
                    }
                }
                Poll::Closed => {
                    debug!("completed-documents queue closed, flushing final batch");
                    self.flush(&mut batch).await?;
                    break;
                }
            }
        }

        self.messenger.close().await?;
        info!("indexer terminated");
        Ok(())
    }

    async fn flush(&self, batch: &mut Vec<Document>) -> Result<(), PipelineError> {
        if batch.is_empty() {
            return Ok(());
        }

        let docs = std::mem::take(batch);
        let run_ids: HashMap<_, RunId> = docs
            .iter()
            .filter_map(|d| d.run_id().map(|r| (d.id().clone(), r.clone())))
            .collect();
        let batch_size = docs.len();
        let options = SinkOptions {
            routing_field: self.settings.routing_field.clone(),
            versioning: self.settings.versioning,
        };

        match self.sink.index_batch(docs, &options).await {
            Err(transport_err) => {
                warn!(batch_size, error = %transport_err, "sink transport failure, failing entire batch");
                for (id, run_id) in &run_ids {
                    self.messenger
                        .send_event(Event::fail(id.clone(), run_id.clone(), transport_err.to_string()))
                        .await?;
                }
            }
            Ok(BatchOutcome { succeeded, failed }) => {
                if !failed.is_empty() {
                    warn!(batch_size, failed = failed.len(), "sink reported partial batch failure");
                }
                for (id, reason) in failed {
                    if let Some(run_id) = run_ids.get(&id) {
                        self.messenger.send_event(Event::fail(id, run_id.clone(), reason)).await?;
                    }
                }
                for id in succeeded {
                    if let Some(run_id) = run_ids.get(&id) {
                        self.messenger.send_event(Event::finish(id, run_id.clone())).await?;
                    }
                }
            }
        }

        Ok(())
    }
}
