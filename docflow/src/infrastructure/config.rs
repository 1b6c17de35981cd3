// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline configuration
//!
//! Layered configuration via the `config` crate (§6 Ambient stack): a
//! base file (`config/default.toml`, or an explicit path) overridden by
//! `DOCFLOW_`-prefixed environment variables, e.g.
//! `DOCFLOW_INDEXER__BATCH_SIZE=200`. Validated eagerly at startup;
//! a `PipelineError::ConfigError` surfaces before any component runs.

use docflow_domain::PipelineError;
use serde::Deserialize;
use std::path::Path;

fn default_batch_size() -> usize {
    100
}

fn default_batch_timeout_ms() -> u64 {
    100
}

fn default_pool_size() -> usize {
    1
}

fn default_poll_timeout_ms() -> u64 {
    500
}

/// `indexer.*` configuration (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,
    pub routing_field: Option<String>,
    #[serde(default)]
    pub versioning: bool,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_timeout_ms: default_batch_timeout_ms(),
            routing_field: None,
            versioning: false,
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

/// `worker.*` configuration (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub pipeline: String,
    pub max_retries: Option<u32>,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

/// The fully layered, validated pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub worker: WorkerConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
}

impl PipelineConfig {
    /// Load `config/default.toml` (or `path`, if given), layer
    /// `DOCFLOW_`-prefixed environment variables on top, deserialize,
    /// and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::with_name("config/default").required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("DOCFLOW").separator("__"));

        let raw = builder
            .build()
            .map_err(|e| PipelineError::config(format!("failed to assemble configuration: {e}")))?;
        let parsed: Self = raw
            .try_deserialize()
            .map_err(|e| PipelineError::config(format!("failed to deserialize configuration: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.worker.pipeline.trim().is_empty() {
            return Err(PipelineError::config("worker.pipeline must not be empty"));
        }
        if !(1..=128).contains(&self.worker.pool_size) {
            return Err(PipelineError::config("worker.pool_size must be within 1..=128"));
        }
        if self.worker.poll_timeout_ms == 0 {
            return Err(PipelineError::config("worker.poll_timeout_ms must be > 0"));
        }
        if self.indexer.batch_size == 0 {
            return Err(PipelineError::config("indexer.batch_size must be > 0"));
        }
        if self.indexer.batch_timeout_ms == 0 {
            return Err(PipelineError::config("indexer.batch_timeout_ms must be > 0"));
        }
        if self.indexer.poll_timeout_ms == 0 {
            return Err(PipelineError::config("indexer.poll_timeout_ms must be > 0"));
        }
        Ok(())
    }
}
