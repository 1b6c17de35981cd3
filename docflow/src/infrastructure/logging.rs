// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging initialization
//!
//! Structured logging via `tracing` + `tracing-subscriber` (§6 Ambient
//! stack), initialized once at process start from the bootstrap layer's
//! validated `LogLevel`. Workers, the Indexer, and the Publisher log
//! lifecycle transitions at `info` and per-document/per-batch detail at
//! `debug`; the periodic rate-meter readings required by §4.3 are
//! emitted as structured `info` log events rather than a separate
//! metrics service, since metrics export is out of scope (§1).

use docflow_bootstrap::config::LogLevel;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber. Safe to call once; a second
/// call is a logic error in the caller, not handled here, matching the
/// teacher's bootstrap initialization pattern of a single composition
/// root.
pub fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().as_str().to_lowercase()));

    fmt().with_env_filter(filter).with_target(true).compact().init();
}
