// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Presentation layer
//!
//! CLI command handlers wiring the application layer's `Worker`,
//! `Indexer`, and `Publisher` to a concrete, in-process `Transport` and
//! sink. A real deployment runs workers and the indexer as separate
//! processes against a shared message-queue transport; this layer's
//! single-process wiring is the one this repo ships for tests and the
//! bundled example binary (§4.6).

pub mod commands;
pub mod connector;
pub mod pipelines;

pub use commands::{run_once, run_worker_pool, RunOptions, WorkerPoolOptions};
