// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # docflow entry point
//!
//! Composition root: parse and validate CLI arguments, initialize
//! structured logging, load layered configuration, dispatch to the
//! selected command, and map the outcome to a process exit code.

use std::time::Duration;

use docflow_bootstrap::config::{AppConfig, LogLevel};
use docflow_bootstrap::{result_to_exit_code, ValidatedCommand};
use docflow_domain::PipelineError;

use docflow::application::IndexerSettings;
use docflow::infrastructure::config::PipelineConfig;
use docflow::infrastructure::logging::init_tracing;
use docflow::presentation::{run_once, run_worker_pool, RunOptions, WorkerPoolOptions};

fn indexer_settings(config: &Option<PipelineConfig>) -> IndexerSettings {
    match config {
        Some(c) => IndexerSettings {
            batch_size: c.indexer.batch_size,
            batch_timeout: Duration::from_millis(c.indexer.batch_timeout_ms),
            poll_timeout: Duration::from_millis(c.indexer.poll_timeout_ms),
            routing_field: c.indexer.routing_field.clone(),
            versioning: c.indexer.versioning,
        },
        None => IndexerSettings::default(),
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated = match docflow_bootstrap::parse_and_validate() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("argument error: {e}");
            return std::process::ExitCode::from(64); // EX_USAGE
        }
    };

    let log_level = if validated.verbose { LogLevel::Debug } else { LogLevel::Info };
    init_tracing(log_level);
    let _app_config = AppConfig::builder().app_name("docflow").log_level(log_level).verbose(validated.verbose).build();

    let pipeline_config = match PipelineConfig::load(validated.config.as_deref()) {
        Ok(config) => Some(config),
        Err(_) => None, // absent config/default.toml is fine; CLI args stand alone
    };

    result_to_exit_code(dispatch(validated.command, pipeline_config).await)
}

async fn dispatch(command: ValidatedCommand, config: Option<PipelineConfig>) -> Result<(), PipelineError> {
    match command {
        ValidatedCommand::WorkerPool {
            pipeline,
            pool_size,
            max_retries,
            poll_timeout_ms,
        } => {
            let opts = WorkerPoolOptions {
                pipeline,
                pool_size: pool_size.unwrap_or_else(|| config.as_ref().map(|c| c.worker.pool_size).unwrap_or(1)),
                max_retries: max_retries
                    .or_else(|| config.as_ref().and_then(|c| c.worker.max_retries))
                    .unwrap_or(3),
                poll_timeout: Duration::from_millis(
                    poll_timeout_ms.unwrap_or_else(|| config.as_ref().map(|c| c.worker.poll_timeout_ms).unwrap_or(500)),
                ),
                indexer: indexer_settings(&config),
            };
            run_worker_pool(opts).await
        }
        ValidatedCommand::Run { pipeline, max_retries } => {
            let opts = RunOptions {
                pipeline,
                max_retries: max_retries
                    .or_else(|| config.as_ref().and_then(|c| c.worker.max_retries))
                    .unwrap_or(3),
                indexer: indexer_settings(&config),
            };
            let outcome = run_once(opts).await?;
            tracing::info!(
                run_id = %outcome.run_id,
                published = outcome.num_published,
                succeeded = outcome.num_succeeded,
                failed = outcome.num_failed,
                "run complete"
            );
            if outcome.has_errors() {
                return Err(PipelineError::internal(format!(
                    "run {} completed with {} failed document(s)",
                    outcome.run_id, outcome.num_failed
                )));
            }
            Ok(())
        }
    }
}
