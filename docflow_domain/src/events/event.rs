// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event
//!
//! An immutable lifecycle notification correlated by document id and run
//! id. See §3/§6.

use crate::value_objects::{DocumentId, RunId};
use serde::{Deserialize, Serialize};

/// Message sent when a document redelivered past the retry limit is
/// routed to the dead-letter destination (§4.3).
pub const SENT_TO_DLQ: &str = "SENT_TO_DLQ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    /// A child document was discovered mid-pipeline.
    Create,
    /// The document reached a successful terminal state.
    Finish,
    /// The document reached a failed terminal state.
    Fail,
}

/// An immutable `(document_id, run_id, kind, message)` lifecycle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub document_id: DocumentId,
    pub run_id: RunId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Event {
    pub fn create(document_id: DocumentId, run_id: RunId) -> Self {
        Self {
            document_id,
            run_id,
            kind: EventKind::Create,
            message: None,
        }
    }

    pub fn finish(document_id: DocumentId, run_id: RunId) -> Self {
        Self {
            document_id,
            run_id,
            kind: EventKind::Finish,
            message: None,
        }
    }

    pub fn fail(document_id: DocumentId, run_id: RunId, message: impl Into<String>) -> Self {
        Self {
            document_id,
            run_id,
            kind: EventKind::Fail,
            message: Some(message.into()),
        }
    }

    /// An Event::fail carrying the `SENT_TO_DLQ` message used on retry
    /// exhaustion (§4.3, §8 scenario 4).
    pub fn sent_to_dlq(document_id: DocumentId, run_id: RunId) -> Self {
        Self::fail(document_id, run_id, SENT_TO_DLQ)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Finish | EventKind::Fail)
    }
}
