// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application layer
//!
//! The three transport-agnostic execution contexts that drive a run
//! (§4.3-§4.5): [`Worker`] runs one Pipeline over each source document,
//! [`Indexer`] batches completed documents into the search sink, and
//! [`Publisher`] stamps and publishes source documents then reconciles
//! the run via [`docflow_domain::RunCoordinator`]. Each depends only on
//! the domain's port traits, never on a concrete transport.

pub mod indexer;
pub mod publisher;
pub mod worker;

pub use indexer::{Indexer, IndexerSettings};
pub use publisher::{Publisher, RunOutcome};
pub use worker::{Worker, WorkerSettings};
