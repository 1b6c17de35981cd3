// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Messenger ports
//!
//! Three capability sets a message transport must provide (§4.6). The
//! domain defines only the contracts; `docflow`'s infrastructure layer
//! supplies an in-memory loopback adapter for tests and the bundled
//! example binary, and production deployments are expected to supply a
//! real message-queue-backed adapter implementing the same traits — the
//! Worker, Indexer, and Publisher are transport-agnostic by construction.

use crate::entities::Document;
use crate::error::PipelineError;
use crate::events::Event;
use crate::value_objects::RunId;
use async_trait::async_trait;
use std::time::Duration;

/// The outcome of a timed poll against a Messenger queue.
///
/// `Closed` is distinct from `Empty`: it signals that the underlying
/// queue has no more items *and never will* (every producer has
/// disconnected), which is how this core learns "the event transport
/// reports no more events for runId" (§4.4) without a separate
/// out-of-band completion message.
#[derive(Debug, Clone, PartialEq)]
pub enum Poll<T> {
    Item(T),
    Empty,
    Closed,
}

impl<T> Poll<T> {
    pub fn is_closed(&self) -> bool {
        matches!(self, Poll::Closed)
    }

    pub fn into_item(self) -> Option<T> {
        match self {
            Poll::Item(item) => Some(item),
            Poll::Empty | Poll::Closed => None,
        }
    }
}

/// Capabilities a Worker needs from the transport.
#[async_trait]
pub trait WorkerMessenger: Send + Sync {
    /// Poll the source-documents queue, blocking up to `timeout`.
    async fn poll_doc_to_process(&self, timeout: Duration) -> Result<Poll<Document>, PipelineError>;

    /// Forward a non-dropped pipeline result to the completed-documents
    /// queue.
    async fn send_completed(&self, doc: Document) -> Result<(), PipelineError>;

    /// Emit a lifecycle event (CREATE for children, FAIL on stage/commit
    /// failure, FINISH for dropped documents).
    async fn send_event(&self, event: Event) -> Result<(), PipelineError>;

    /// Route a document whose retries are exhausted to the dead-letter
    /// destination.
    async fn send_failed(&self, doc: Document) -> Result<(), PipelineError>;

    /// Commit the offsets of documents processed since the last commit.
    async fn commit_pending_doc_offsets(&self) -> Result<(), PipelineError>;

    async fn close(&self) -> Result<(), PipelineError>;
}

/// Capabilities the Indexer needs from the transport.
#[async_trait]
pub trait IndexerMessenger: Send + Sync {
    /// Poll the completed-documents queue, blocking up to `timeout`.
    async fn poll_completed(&self, timeout: Duration) -> Result<Poll<Document>, PipelineError>;

    async fn send_event(&self, event: Event) -> Result<(), PipelineError>;

    async fn close(&self) -> Result<(), PipelineError>;
}

/// Capabilities the Publisher / Run Coordinator needs from the transport.
#[async_trait]
pub trait PublisherMessenger: Send + Sync {
    /// Bind this messenger to a run, creating/selecting the per-run,
    /// per-pipeline events topic (§6).
    async fn initialize(&self, run_id: &RunId, pipeline_name: &str) -> Result<(), PipelineError>;

    /// Publish `doc` (already stamped with `run_id`) to the source queue.
    async fn send_for_processing(&self, doc: Document) -> Result<(), PipelineError>;

    /// Poll the run's events queue, blocking up to `timeout`.
    async fn poll_event(&self, timeout: Duration) -> Result<Poll<Event>, PipelineError>;

    async fn close(&self) -> Result<(), PipelineError>;
}
