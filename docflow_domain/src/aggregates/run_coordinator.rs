// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # RunCoordinator
//!
//! The pure reconciliation algorithm behind the Publisher / Run
//! Coordinator (§4.4): a per-document counter that must settle to ≤ 0 for
//! every id before a run can be declared complete. This type owns no I/O
//! — it is deliberately transport-agnostic so the arithmetic can be
//! tested without a Messenger. The application-layer `Publisher` (in the
//! `docflow` crate) drives this aggregate from a real `PublisherMessenger`
//! and layers the two additional termination conditions from §4.4 (the
//! Connector having exited, and the transport reporting no more events).

use crate::events::{Event, EventKind};
use crate::value_objects::{DocumentId, RunId};
use std::collections::HashMap;

/// Tracks the authoritative view of outstanding work for a single run.
#[derive(Debug, Clone)]
pub struct RunCoordinator {
    run_id: RunId,
    pending: HashMap<DocumentId, i64>,
    has_errors: bool,
    num_published: u64,
    num_succeeded: u64,
    num_failed: u64,
}

impl RunCoordinator {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            pending: HashMap::new(),
            has_errors: false,
            num_published: 0,
            num_succeeded: 0,
            num_failed: 0,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Record that `document_id` was published for processing, stamped
    /// with this run's id. Increments `pending[document_id]`.
    pub fn record_publish(&mut self, document_id: DocumentId) {
        *self.pending.entry(document_id).or_insert(0) += 1;
        self.num_published += 1;
    }

    /// Fold a lifecycle Event into the pending counters.
    ///
    /// Panics are never raised for an event referencing a run other than
    /// this coordinator's own; callers are expected to have already
    /// routed events by `run_id` (the transport partitions the events
    /// topic per run, §6).
    pub fn handle_event(&mut self, event: &Event) {
        let counter = self.pending.entry(event.document_id.clone()).or_insert(0);
        match event.kind {
            EventKind::Create => *counter += 1,
            EventKind::Finish => {
                *counter -= 1;
                self.num_succeeded += 1;
            }
            EventKind::Fail => {
                *counter -= 1;
                self.num_failed += 1;
                self.has_errors = true;
            }
        }
    }

    /// True iff every tracked document id's counter has settled to ≤ 0.
    pub fn is_reconciled(&self) -> bool {
        self.pending.values().all(|&count| count <= 0)
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn num_published(&self) -> u64 {
        self.num_published
    }

    pub fn num_succeeded(&self) -> u64 {
        self.num_succeeded
    }

    pub fn num_failed(&self) -> u64 {
        self.num_failed
    }

    /// Current counter value for `document_id`, 0 if never observed.
    /// Exposed primarily for tests and diagnostics.
    pub fn pending_count(&self, document_id: &DocumentId) -> i64 {
        self.pending.get(document_id).copied().unwrap_or(0)
    }
}
