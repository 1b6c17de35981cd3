// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worker
//!
//! Runs one [`docflow_domain::Pipeline`] over each document it polls
//! from the source queue (§4.3). A named pipeline runs behind a pool of
//! `N` independently scheduled `Worker`s (§5), each owning its own
//! `Pipeline` instance — stages are never shared mutable state across
//! workers. The one resource workers do share is the retry counter.

use docflow_bootstrap::shutdown::CancellationToken;
use docflow_domain::{Document, Event, Pipeline, PipelineError, Poll, RetryCounter, WorkerMessenger};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Tunables for a single `Worker` (`worker.*` configuration, §6).
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub poll_timeout: Duration,
    /// How many documents between rate-meter log lines. `0` disables
    /// periodic rate logging.
    pub rate_log_every: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(500),
            rate_log_every: 100,
        }
    }
}

/// Documents-per-second meter, logged periodically per §4.3 ("maintain a
/// rate meter ... logged periodically via structured logging").
struct RateMeter {
    started_at: Instant,
    processed: u64,
}

impl RateMeter {
    fn new() -> Self {
        Self {
            started_at: Instant::now(),
            processed: 0,
        }
    }

    fn record(&mut self) -> f64 {
        self.processed += 1;
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.processed as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Runs a single Pipeline against the documents a `WorkerMessenger`
/// yields until the source queue closes or `terminate()` is called.
pub struct Worker<M: WorkerMessenger> {
    messenger: Arc<M>,
    retry_counter: Option<Arc<dyn RetryCounter>>,
    pipeline: Pipeline,
    settings: WorkerSettings,
    cancel: CancellationToken,
    rate_meter: RateMeter,
}

impl<M: WorkerMessenger> Worker<M> {
    pub fn new(
        messenger: Arc<M>,
        retry_counter: Option<Arc<dyn RetryCounter>>,
        pipeline: Pipeline,
        settings: WorkerSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            messenger,
            retry_counter,
            pipeline,
            settings,
            cancel,
            rate_meter: RateMeter::new(),
        }
    }

    /// Run until the source queue reports `Poll::Closed`, `terminate()`
    /// fires, or a stage raises an error the Worker cannot recover from.
    pub async fn run(mut self) -> Result<(), PipelineError> {
        self.pipeline.start()?;
        info!(pipeline = self.pipeline.name(), "worker started");

        let outcome = self.run_loop().await;

        self.pipeline.stop()?;
        self.messenger.close().await?;
        info!(pipeline = self.pipeline.name(), ?outcome, "worker terminated");
        outcome
    }

    async fn run_loop(&mut self) -> Result<(), PipelineError> {
        loop {
            if self.cancel.is_cancelled() {
                debug!("worker cancelled, in-progress document allowed to finish before this check");
                return Ok(());
            }

            match self.messenger.poll_doc_to_process(self.settings.poll_timeout).await? {
                Poll::Closed => {
                    debug!("source queue closed, worker exiting");
                    return Ok(());
                }
                Poll::Empty => continue,
                Poll::Item(doc) => self.process_one(doc).await?,
            }
        }
    }

    async fn process_one(&mut self, doc: Document) -> Result<(), PipelineError> {
        let run_id = doc
            .run_id()
            .cloned()
            .ok_or_else(|| PipelineError::invalid_state("a document reaching the Worker must already carry a run_id"))?;

        if let Some(retry_counter) = self.retry_counter.clone() {
            if retry_counter.add(&doc).await? {
                warn!(document_id = %doc.id(), "retry limit exhausted, routing to dead letter");
                retry_counter.remove(&doc).await?;
                let doc_id = doc.id().clone();
                self.messenger.send_failed(doc).await?;
                self.messenger.send_event(Event::sent_to_dlq(doc_id, run_id)).await?;
                self.messenger.commit_pending_doc_offsets().await?;
                return Ok(());
            }
        }

        let retry_doc = self.retry_counter.as_ref().map(|_| doc.clone());
        let doc_id = doc.id().clone();

        match self.pipeline.process_document(doc) {
            Err((_partial, err)) => {
                warn!(document_id = %doc_id, error = %err, "stage failed, terminating worker");
                self.messenger.send_event(Event::fail(doc_id, run_id, err.to_string())).await?;
                self.messenger.commit_pending_doc_offsets().await?;
                Err(err)
            }
            Ok(results) => {
                for mut result in results {
                    if result.id() != &doc_id {
                        result.assign_run_id(run_id.clone())?;
                        self.messenger.send_event(Event::create(result.id().clone(), run_id.clone())).await?;
                    }

                    if result.is_dropped() {
                        self.messenger.send_event(Event::finish(result.id().clone(), run_id.clone())).await?;
                    } else {
                        self.messenger.send_completed(result).await?;
                    }
                }

                self.messenger.commit_pending_doc_offsets().await?;

                if let (Some(retry_counter), Some(retry_doc)) = (&self.retry_counter, &retry_doc) {
                    retry_counter.remove(retry_doc).await?;
                }

                let rate = self.rate_meter.record();
                if self.settings.rate_log_every > 0 && self.rate_meter.processed % self.settings.rate_log_every == 0 {
                    info!(
                        pipeline = self.pipeline.name(),
                        processed = self.rate_meter.processed,
                        docs_per_sec = format!("{rate:.1}"),
                        "worker throughput"
                    );
                }

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_domain::{DocumentId, EventKind, RunId, Stage, StageCondition};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Mutex;

    fn fresh_token() -> CancellationToken {
        docflow_bootstrap::shutdown::ShutdownCoordinator::default().token()
    }

    struct ChildEmittingStage;

    impl Stage for ChildEmittingStage {
        fn name(&self) -> &str {
            "child-emitting"
        }

        fn condition(&self) -> Option<&StageCondition> {
            None
        }

        fn process_document(&mut self, doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
            doc.set_field("enriched", true)?;
            Ok(vec![Document::new(format!("{}-child", doc.id().as_str()))?])
        }
    }

    struct DroppingStage;

    impl Stage for DroppingStage {
        fn name(&self) -> &str {
            "dropping"
        }

        fn condition(&self) -> Option<&StageCondition> {
            None
        }

        fn process_document(&mut self, doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
            doc.set_dropped();
            Ok(Vec::new())
        }
    }

    struct FailingStage;

    impl Stage for FailingStage {
        fn name(&self) -> &str {
            "failing"
        }

        fn condition(&self) -> Option<&StageCondition> {
            None
        }

        fn process_document(&mut self, _doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
            Err(PipelineError::stage("boom"))
        }
    }

    #[derive(Default)]
    struct RecordingMessenger {
        source: Mutex<Vec<Document>>,
        completed: StdMutex<Vec<Document>>,
        events: StdMutex<Vec<Event>>,
        failed: StdMutex<Vec<Document>>,
        commits: StdMutex<u32>,
    }

    impl RecordingMessenger {
        fn with_queue(docs: Vec<Document>) -> Self {
            Self {
                source: Mutex::new(docs),
                ..Default::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl WorkerMessenger for RecordingMessenger {
        async fn poll_doc_to_process(&self, _timeout: Duration) -> Result<Poll<Document>, PipelineError> {
            let mut queue = self.source.lock().await;
            Ok(match queue.pop() {
                Some(doc) => Poll::Item(doc),
                None => Poll::Closed,
            })
        }

        async fn send_completed(&self, doc: Document) -> Result<(), PipelineError> {
            self.completed.lock().unwrap().push(doc);
            Ok(())
        }

        async fn send_event(&self, event: Event) -> Result<(), PipelineError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }

        async fn send_failed(&self, doc: Document) -> Result<(), PipelineError> {
            self.failed.lock().unwrap().push(doc);
            Ok(())
        }

        async fn commit_pending_doc_offsets(&self) -> Result<(), PipelineError> {
            *self.commits.lock().unwrap() += 1;
            Ok(())
        }

        async fn close(&self) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    fn doc_with_run(id: &str, run_id: &RunId) -> Document {
        let mut doc = Document::new(id).unwrap();
        doc.assign_run_id(run_id.clone()).unwrap();
        doc
    }

    #[tokio::test]
    async fn child_documents_emit_create_before_parent_finishes() {
        let run_id = RunId::generate();
        let messenger = Arc::new(RecordingMessenger::with_queue(vec![doc_with_run("parent", &run_id)]));
        let pipeline = Pipeline::new("enrich", vec![Box::new(ChildEmittingStage)]);
        let worker = Worker::new(messenger.clone(), None, pipeline, WorkerSettings::default(), fresh_token());

        worker.run().await.unwrap();

        let events = messenger.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Create);
        assert_eq!(events[0].document_id, DocumentId::new("parent-child").unwrap());

        let completed = messenger.completed.lock().unwrap();
        assert_eq!(completed.len(), 2);
    }

    #[tokio::test]
    async fn dropped_documents_emit_finish_instead_of_forwarding() {
        let run_id = RunId::generate();
        let messenger = Arc::new(RecordingMessenger::with_queue(vec![doc_with_run("d1", &run_id)]));
        let pipeline = Pipeline::new("drop", vec![Box::new(DroppingStage)]);
        let worker = Worker::new(messenger.clone(), None, pipeline, WorkerSettings::default(), fresh_token());

        worker.run().await.unwrap();

        let events = messenger.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Finish);
        assert!(messenger.completed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stage_failure_emits_fail_and_terminates_the_worker() {
        let run_id = RunId::generate();
        let messenger = Arc::new(RecordingMessenger::with_queue(vec![doc_with_run("d1", &run_id)]));
        let pipeline = Pipeline::new("failing", vec![Box::new(FailingStage)]);
        let worker = Worker::new(messenger.clone(), None, pipeline, WorkerSettings::default(), fresh_token());

        let result = worker.run().await;
        assert!(result.is_err());

        let events = messenger.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Fail);
    }

    struct AlwaysExhaustedRetryCounter;

    #[async_trait::async_trait]
    impl RetryCounter for AlwaysExhaustedRetryCounter {
        async fn add(&self, _doc: &Document) -> Result<bool, PipelineError> {
            Ok(true)
        }

        async fn remove(&self, _doc: &Document) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn exhausted_retries_route_to_dead_letter_with_sent_to_dlq() {
        let run_id = RunId::generate();
        let messenger = Arc::new(RecordingMessenger::with_queue(vec![doc_with_run("poison", &run_id)]));
        let pipeline = Pipeline::new("noop", vec![Box::new(ChildEmittingStage)]);
        let worker = Worker::new(
            messenger.clone(),
            Some(Arc::new(AlwaysExhaustedRetryCounter)),
            pipeline,
            WorkerSettings::default(),
            fresh_token(),
        );

        worker.run().await.unwrap();

        assert_eq!(messenger.failed.lock().unwrap().len(), 1);
        let events = messenger.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Fail);
        assert_eq!(events[0].message.as_deref(), Some(docflow_domain::SENT_TO_DLQ));
    }
}
