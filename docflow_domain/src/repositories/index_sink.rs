// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # IndexSink port
//!
//! The destination a batch of enriched documents is shipped to (§4.5).
//! `docflow` ships one concrete in-memory implementation for tests and
//! the bundled example binary; a real search-engine client (Elasticsearch,
//! OpenSearch, Solr, ...) implements the same port.

use crate::entities::Document;
use crate::error::PipelineError;
use crate::value_objects::DocumentId;
use async_trait::async_trait;

/// The per-document result of shipping one batch.
///
/// A sink that cannot partially fail (most bulk APIs can) reports every
/// document it accepted in `succeeded` and leaves `failed` empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub succeeded: Vec<DocumentId>,
    pub failed: Vec<(DocumentId, String)>,
}

impl BatchOutcome {
    /// Every document in `documents` reported as succeeded.
    pub fn all_succeeded(documents: &[Document]) -> Self {
        Self {
            succeeded: documents.iter().map(|d| d.id().clone()).collect(),
            failed: Vec::new(),
        }
    }
}

/// Per-batch routing/versioning settings (§4.5, both optional).
#[derive(Debug, Clone, Default)]
pub struct SinkOptions {
    /// Name of the document field whose value is passed as the sink's
    /// routing key, if configured.
    pub routing_field: Option<String>,
    /// When set, each document's `source_offset` is passed as an
    /// external monotonic version so the sink can reject out-of-order
    /// overwrites.
    pub versioning: bool,
}

/// A destination that accepts batches of enriched documents.
#[async_trait]
pub trait IndexSink: Send + Sync {
    /// Check that the sink is reachable. Called once before the Indexer
    /// starts its poll loop; repeated failures here are terminal (§4.5).
    async fn validate_connection(&self) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Ship a non-empty batch.
    ///
    /// `Err` signals the transport itself is unreachable (the whole batch
    /// is unaccounted for); `Ok(BatchOutcome)` signals the sink was
    /// reached and reports which documents it accepted and which it
    /// rejected.
    async fn index_batch(&self, documents: Vec<Document>, options: &SinkOptions) -> Result<BatchOutcome, PipelineError>;
}
