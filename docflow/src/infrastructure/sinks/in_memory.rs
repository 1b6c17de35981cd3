// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-memory IndexSink
//!
//! Accumulates every accepted document behind a mutex. Suitable for
//! tests and the bundled example binary; a real search-engine client
//! (Elasticsearch, OpenSearch, Solr) implements the same port.

use docflow_domain::{BatchOutcome, Document, DocumentId, IndexSink, PipelineError, SinkOptions};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory sink. `rejected_ids` lets tests simulate the partial-failure
/// branch of the batching policy (§4.5) without a real search engine.
/// Records the routing key and version (when the Indexer supplies them)
/// alongside each accepted document for tests to assert against.
#[derive(Default)]
pub struct InMemoryIndexSink {
    indexed: Arc<Mutex<Vec<Document>>>,
    rejected_ids: Arc<Mutex<HashSet<DocumentId>>>,
    routed: Arc<Mutex<Vec<(DocumentId, Option<String>, Option<u64>)>>>,
    connection_ok: AtomicBool,
}

impl Clone for InMemoryIndexSink {
    fn clone(&self) -> Self {
        Self {
            indexed: self.indexed.clone(),
            rejected_ids: self.rejected_ids.clone(),
            routed: self.routed.clone(),
            connection_ok: AtomicBool::new(self.connection_ok.load(Ordering::Relaxed)),
        }
    }
}

impl InMemoryIndexSink {
    pub fn new() -> Self {
        Self {
            connection_ok: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub async fn indexed_documents(&self) -> Vec<Document> {
        self.indexed.lock().await.clone()
    }

    pub async fn indexed_count(&self) -> usize {
        self.indexed.lock().await.len()
    }

    /// The `(id, routing_key, version)` recorded for each document this
    /// sink accepted, in arrival order.
    pub async fn routing_records(&self) -> Vec<(DocumentId, Option<String>, Option<u64>)> {
        self.routed.lock().await.clone()
    }

    /// Mark `id` to be rejected by every subsequent `index_batch` call
    /// that contains it, simulating a document-level indexing failure.
    pub async fn reject(&self, id: DocumentId) {
        self.rejected_ids.lock().await.insert(id);
    }

    /// Make `validate_connection` fail, simulating an unreachable sink.
    pub fn simulate_unreachable(&self) {
        self.connection_ok.store(false, Ordering::Relaxed);
    }
}

#[async_trait::async_trait]
impl IndexSink for InMemoryIndexSink {
    async fn validate_connection(&self) -> Result<(), PipelineError> {
        if self.connection_ok.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(PipelineError::sink("simulated unreachable sink"))
        }
    }

    async fn index_batch(&self, documents: Vec<Document>, options: &SinkOptions) -> Result<BatchOutcome, PipelineError> {
        if documents.is_empty() {
            return Ok(BatchOutcome::default());
        }
        debug!(batch_size = documents.len(), "indexing batch");

        let rejected = self.rejected_ids.lock().await;
        let mut outcome = BatchOutcome::default();
        let mut accepted = Vec::new();
        let mut routed = Vec::new();

        for doc in documents {
            if rejected.contains(doc.id()) {
                outcome.failed.push((doc.id().clone(), "rejected by sink".to_string()));
            } else {
                let routing_key = options.routing_field.as_deref().and_then(|field| doc.get_string(field));
                let version = options.versioning.then(|| doc.source_offset()).flatten();
                routed.push((doc.id().clone(), routing_key, version));
                outcome.succeeded.push(doc.id().clone());
                accepted.push(doc);
            }
        }
        drop(rejected);

        self.indexed.lock().await.extend(accepted);
        self.routed.lock().await.extend(routed);
        Ok(outcome)
    }
}
