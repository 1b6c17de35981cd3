// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI command handlers
//!
//! Wires the application layer's `Worker`, `Indexer`, and `Publisher` to
//! an in-memory `Transport`, an in-memory retry counter, and an
//! in-memory sink — the concrete adapters this repo ships. Each handler
//! corresponds to one of the CLI's two entry points (§6).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docflow_bootstrap::signals::create_signal_handler;
use docflow_bootstrap::shutdown::ShutdownCoordinator;
use docflow_domain::{PipelineError, RetryCounter};

use crate::application::{Indexer, IndexerSettings, Publisher, RunOutcome, Worker, WorkerSettings};
use crate::infrastructure::messenger::in_memory::Transport;
use crate::infrastructure::retry::in_memory::InMemoryRetryCounter;
use crate::infrastructure::sinks::in_memory::InMemoryIndexSink;
use crate::presentation::connector::LineDelimitedJsonConnector;
use crate::presentation::pipelines::build_pipeline;

/// `worker-pool` command options, assembled from `ValidatedCommand::WorkerPool`.
#[derive(Debug, Clone)]
pub struct WorkerPoolOptions {
    pub pipeline: String,
    pub pool_size: usize,
    pub max_retries: u32,
    pub poll_timeout: Duration,
    pub indexer: IndexerSettings,
}

/// `run` command options, assembled from `ValidatedCommand::Run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pipeline: String,
    pub max_retries: u32,
    pub indexer: IndexerSettings,
}

/// Start a worker pool for `opts.pipeline` and block until an OS signal
/// (SIGTERM/SIGINT/SIGHUP on Unix, Ctrl+C on Windows) requests shutdown;
/// every Worker and the Indexer then drain their current document/batch
/// and exit (§4.3, §5 cancellation token).
pub async fn run_worker_pool(opts: WorkerPoolOptions) -> Result<(), PipelineError> {
    let transport = Transport::new(1024);
    let retry_counter: Arc<dyn RetryCounter> = Arc::new(InMemoryRetryCounter::new(opts.max_retries));
    let sink = Arc::new(InMemoryIndexSink::new());
    let shutdown = ShutdownCoordinator::default();

    let mut worker_handles = Vec::with_capacity(opts.pool_size);
    for _ in 0..opts.pool_size {
        let pipeline = build_pipeline(&opts.pipeline)?;
        let messenger = Arc::new(transport.worker_messenger());
        let worker = Worker::new(
            messenger,
            Some(retry_counter.clone()),
            pipeline,
            WorkerSettings {
                poll_timeout: opts.poll_timeout,
                ..WorkerSettings::default()
            },
            shutdown.token(),
        );
        worker_handles.push(tokio::spawn(worker.run()));
    }

    let indexer = Indexer::new(Arc::new(transport.indexer_messenger()), sink, opts.indexer.clone(), shutdown.token());
    let indexer_handle = tokio::spawn(indexer.run());

    let signal_handler = create_signal_handler();
    let shutdown_for_signal = shutdown.clone();
    signal_handler
        .wait_for_signal(Box::new(move || shutdown_for_signal.initiate_shutdown()))
        .await;

    for handle in worker_handles {
        join_worker(handle).await?;
    }
    join_worker(indexer_handle).await?;

    // `transport` is kept alive (not dropped) for the duration of the
    // pool's run so the source/completed/events senders it still holds
    // don't close the corresponding queues out from under the workers.
    drop(transport);
    Ok(())
}

async fn join_worker(handle: tokio::task::JoinHandle<Result<(), PipelineError>>) -> Result<(), PipelineError> {
    handle.await.map_err(|e| PipelineError::internal(format!("worker task panicked: {e}")))?
}

/// Run one pipeline to completion: publish every document read from
/// standard input, reconcile the run, then return its outcome (§4.4).
/// Exits once the connector (stdin) reaches EOF and every document (and
/// every child discovered mid-flight) has reached a terminal state.
pub async fn run_once(opts: RunOptions) -> Result<RunOutcome, PipelineError> {
    let transport = Transport::new(1024);
    let retry_counter: Arc<dyn RetryCounter> = Arc::new(InMemoryRetryCounter::new(opts.max_retries));
    let sink = Arc::new(InMemoryIndexSink::new());
    let shutdown = ShutdownCoordinator::default();

    let pipeline = build_pipeline(&opts.pipeline)?;
    let worker = Worker::new(
        Arc::new(transport.worker_messenger()),
        Some(retry_counter),
        pipeline,
        WorkerSettings::default(),
        shutdown.token(),
    );
    let worker_handle = tokio::spawn(worker.run());

    let indexer = Indexer::new(Arc::new(transport.indexer_messenger()), sink, opts.indexer.clone(), shutdown.token());
    let indexer_handle = tokio::spawn(indexer.run());

    let mut publisher = Publisher::initialize(Arc::new(transport.publisher_messenger()), &opts.pipeline, Duration::from_millis(200)).await?;

    let connector_exited = Arc::new(AtomicBool::new(false));
    let connector = LineDelimitedJsonConnector::new(tokio::io::stdin());
    connector.run(&mut publisher, connector_exited.clone()).await?;

    let outcome = publisher.reconcile(|| connector_exited.load(Ordering::SeqCst)).await?;

    shutdown.initiate_shutdown();
    join_worker(worker_handle).await?;
    join_worker(indexer_handle).await?;
    drop(transport);

    Ok(outcome)
}
