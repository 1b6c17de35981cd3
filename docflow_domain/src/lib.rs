// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # docflow-domain
//!
//! The domain layer of a distributed document-enrichment pipeline: pure,
//! reusable business logic with no I/O.
//!
//! ## Core Concepts
//!
//! - [`Document`] — the mutable record that flows through a pipeline,
//!   with a reserved-field guard, typed payload accessors, and a deep
//!   child tree.
//! - [`Stage`] / [`Pipeline`] — an opaque, ordered enrichment chain;
//!   a Stage mutates its input document and may emit children.
//! - [`Event`] — the immutable CREATE/FINISH/FAIL lifecycle notification
//!   correlating a document id with a run id.
//! - [`RunCoordinator`] — the reconciliation algorithm that decides when
//!   every document published (and every child discovered mid-flight)
//!   during a run has reached a terminal state.
//!
//! Everything that touches a real queue, search index, or coordination
//! service lives in the `docflow` crate's infrastructure layer, which
//! implements the ports this crate defines: [`RetryCounter`],
//! [`IndexSink`], and the [`WorkerMessenger`]/[`IndexerMessenger`]/
//! [`PublisherMessenger`] transport capability sets.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod value_objects;

pub use aggregates::RunCoordinator;
pub use entities::{Document, Pipeline, Stage, StageCondition};
pub use error::PipelineError;
pub use events::{Event, EventKind, SENT_TO_DLQ};
pub use repositories::{
    BatchOutcome, IndexSink, IndexerMessenger, Poll, PublisherMessenger, RetryCounter, SinkOptions, WorkerMessenger,
};
pub use value_objects::{ConditionalOperator, DocumentId, FieldValue, RenameMode, RunId, ScalarValue};
