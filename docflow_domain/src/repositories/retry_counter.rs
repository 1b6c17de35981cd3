// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # RetryCounter port
//!
//! The retry counter is presented as a capability (§9 Design Notes):
//! production deployments back it with a coordination service, tests use
//! an in-memory implementation. The Worker treats it as opaque and the
//! domain layer defines only the contract; infrastructure provides the
//! adapters (dependency inversion, matching the teacher's
//! `PipelineRepository`/`StageExecutor` port pattern).

use crate::entities::Document;
use crate::error::PipelineError;
use async_trait::async_trait;

/// Tracks how many times a document has been redelivered to a Worker.
///
/// Implementations must serialize their own access: per §5, the retry
/// counter is "the only process-wide mutable resource shared between
/// Workers".
#[async_trait]
pub trait RetryCounter: Send + Sync {
    /// Increment the counter for `doc.id()` and report whether the
    /// configured maximum has now been reached or exceeded.
    async fn add(&self, doc: &Document) -> Result<bool, PipelineError>;

    /// Clear the counter entry for `doc.id()` (called on successful
    /// processing or after routing to the dead-letter destination).
    async fn remove(&self, doc: &Document) -> Result<(), PipelineError>;
}
