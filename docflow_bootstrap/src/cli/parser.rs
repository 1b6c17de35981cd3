// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI parser
//!
//! Command-line structure via `clap`. Security validation happens
//! afterwards in [`crate::cli::validator`].

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI structure.
#[derive(Parser, Debug, Clone)]
#[command(name = "docflow")]
#[command(about = concat!("docflow document enrichment pipeline v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (overrides `config/default.toml`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a pool of Worker instances for a named pipeline and keep them
    /// running until shutdown (signal or transport close).
    WorkerPool {
        /// Pipeline name to run
        #[arg(short, long)]
        pipeline: String,

        /// Number of concurrent Worker instances
        #[arg(long)]
        pool_size: Option<usize>,

        /// Override the number of retries before a document is dead-lettered
        #[arg(long)]
        max_retries: Option<u32>,

        /// Poll timeout in milliseconds before an idle tick
        #[arg(long)]
        poll_timeout_ms: Option<u64>,
    },

    /// Start a full run (connector, worker pool, indexer, publisher) for a
    /// named pipeline and exit once the run is reconciled.
    Run {
        /// Pipeline name to run
        #[arg(short, long)]
        pipeline: String,

        /// Override the number of retries before a document is dead-lettered
        #[arg(long)]
        max_retries: Option<u32>,
    },
}

/// Parse CLI arguments.
///
/// # Panics
///
/// `clap` exits the process directly on `--help`/`--version` or a parse error.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
