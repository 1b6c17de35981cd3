// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # docflow
//!
//! A distributed document-enrichment pipeline. Connectors (external,
//! out of scope for this crate) emit [`docflow_domain::Document`]s onto
//! a message transport; this crate's [`application::Worker`] pool runs
//! each one through a [`docflow_domain::Pipeline`] of
//! [`docflow_domain::Stage`]s, the [`application::Indexer`] batches the
//! enriched results into a search sink, and the
//! [`application::Publisher`] reconciles a run via
//! [`docflow_domain::RunCoordinator`] once every document published (and
//! every child discovered mid-flight) has reached a terminal state.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Presentation Layer                      │
//! │  (CLI command handlers)                                    │
//! └────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Application Layer                        │
//! │  (Worker, Indexer, Publisher)                               │
//! └────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Domain Layer (docflow-domain)           │
//! │  (Document, Stage/Pipeline, Event, RunCoordinator)          │
//! └────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────────────────────────────────────────────────────┐
//! │                 Infrastructure Layer                        │
//! │  (Messenger transport, IndexSink, RetryCounter, Config)     │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use docflow_domain::{Document, Event, Pipeline, PipelineError, RunCoordinator, Stage};
