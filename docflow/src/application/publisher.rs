// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Publisher / Run Coordinator
//!
//! Stamps and publishes source documents for one run, then drives
//! [`docflow_domain::RunCoordinator`]'s reconciliation loop (§4.4). A run
//! is complete only once all three conditions hold: the connector thread
//! has exited, the coordinator is reconciled, and the event transport
//! reports no more events.

use docflow_domain::{Document, Event, PipelineError, Poll, PublisherMessenger, RunCoordinator, RunId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// The final tally of a completed run, handed back to the CLI layer for
/// exit-code mapping (§6: "non-zero if any document ended in FAIL").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub num_published: u64,
    pub num_succeeded: u64,
    pub num_failed: u64,
}

impl RunOutcome {
    pub fn has_errors(&self) -> bool {
        self.num_failed > 0
    }
}

/// Owns the authoritative view of outstanding work for one run.
pub struct Publisher<M: PublisherMessenger> {
    messenger: Arc<M>,
    coordinator: RunCoordinator,
    poll_timeout: Duration,
}

impl<M: PublisherMessenger> Publisher<M> {
    /// Bind `messenger` to a fresh run for `pipeline_name`.
    pub async fn initialize(messenger: Arc<M>, pipeline_name: &str, poll_timeout: Duration) -> Result<Self, PipelineError> {
        let run_id = RunId::generate();
        messenger.initialize(&run_id, pipeline_name).await?;
        info!(run_id = %run_id, pipeline = pipeline_name, "run initialized");
        Ok(Self {
            messenger,
            coordinator: RunCoordinator::new(run_id),
            poll_timeout,
        })
    }

    pub fn run_id(&self) -> &RunId {
        self.coordinator.run_id()
    }

    /// Stamp `doc` with this run's id and publish it to the source
    /// queue, recording it as outstanding work.
    pub async fn publish(&mut self, mut doc: Document) -> Result<(), PipelineError> {
        doc.assign_run_id(self.coordinator.run_id().clone())?;
        let id = doc.id().clone();
        self.messenger.send_for_processing(doc).await?;
        self.coordinator.record_publish(id);
        Ok(())
    }

    /// Drain events and reconcile until the run is complete.
    ///
    /// `connector_exited` observes whether the connector thread that
    /// feeds `publish` has finished; per §4.4 this is required in
    /// addition to `is_reconciled()` because a transient counter-zero
    /// can occur between a publish call and the transport's delivery of
    /// the corresponding CREATE.
    pub async fn reconcile(mut self, connector_exited: impl Fn() -> bool) -> Result<RunOutcome, PipelineError> {
        loop {
            match self.messenger.poll_event(self.poll_timeout).await? {
                Poll::Item(event) => self.handle_event(&event),
                Poll::Empty => {}
                Poll::Closed => {
                    debug!(run_id = %self.run_id(), "event transport closed");
                    break;
                }
            }

            if connector_exited() && self.coordinator.is_reconciled() {
                debug!(run_id = %self.run_id(), "connector exited and coordinator is reconciled");
                break;
            }
        }

        self.messenger.close().await?;
        let outcome = RunOutcome {
            run_id: self.coordinator.run_id().clone(),
            num_published: self.coordinator.num_published(),
            num_succeeded: self.coordinator.num_succeeded(),
            num_failed: self.coordinator.num_failed(),
        };
        info!(run_id = %outcome.run_id, succeeded = outcome.num_succeeded, failed = outcome.num_failed, "run complete");
        Ok(outcome)
    }

    fn handle_event(&mut self, event: &Event) {
        self.coordinator.handle_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_domain::EventKind;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisherMessenger {
        sent: Mutex<Vec<Document>>,
        events: Mutex<Vec<Event>>,
        poll_index: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl PublisherMessenger for RecordingPublisherMessenger {
        async fn initialize(&self, _run_id: &RunId, _pipeline_name: &str) -> Result<(), PipelineError> {
            Ok(())
        }

        async fn send_for_processing(&self, doc: Document) -> Result<(), PipelineError> {
            self.sent.lock().await.push(doc);
            Ok(())
        }

        async fn poll_event(&self, _timeout: Duration) -> Result<Poll<Event>, PipelineError> {
            let mut events = self.events.lock().await;
            if events.is_empty() {
                return Ok(Poll::Closed);
            }
            let idx = self.poll_index.fetch_add(1, Ordering::SeqCst);
            if idx < events.len() {
                Ok(Poll::Item(events[idx].clone()))
            } else {
                Ok(Poll::Empty)
            }
        }

        async fn close(&self) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_stamps_run_id_before_sending() {
        let messenger = Arc::new(RecordingPublisherMessenger::default());
        let mut publisher = Publisher::initialize(messenger.clone(), "invoices", Duration::from_millis(10))
            .await
            .unwrap();

        let run_id = publisher.run_id().clone();
        publisher.publish(Document::new("d1").unwrap()).await.unwrap();

        let sent = messenger.sent.lock().await;
        assert_eq!(sent[0].run_id(), Some(&run_id));
    }

    #[tokio::test]
    async fn reconciles_once_finish_observed_and_connector_exited() {
        let messenger = Arc::new(RecordingPublisherMessenger::default());
        let mut publisher = Publisher::initialize(messenger.clone(), "invoices", Duration::from_millis(10))
            .await
            .unwrap();

        let run_id = publisher.run_id().clone();
        publisher.publish(Document::new("d1").unwrap()).await.unwrap();
        messenger
            .events
            .lock()
            .await
            .push(Event::finish(docflow_domain::DocumentId::new("d1").unwrap(), run_id));

        let connector_exited = AtomicBool::new(true);
        let outcome = publisher.reconcile(|| connector_exited.load(Ordering::SeqCst)).await.unwrap();

        assert_eq!(outcome.num_succeeded, 1);
        assert!(!outcome.has_errors());
    }

    #[tokio::test]
    async fn a_fail_event_marks_the_outcome_as_errored() {
        let messenger = Arc::new(RecordingPublisherMessenger::default());
        let mut publisher = Publisher::initialize(messenger.clone(), "invoices", Duration::from_millis(10))
            .await
            .unwrap();

        let run_id = publisher.run_id().clone();
        publisher.publish(Document::new("d1").unwrap()).await.unwrap();
        messenger
            .events
            .lock()
            .await
            .push(Event::fail(docflow_domain::DocumentId::new("d1").unwrap(), run_id, "boom"));

        let connector_exited = AtomicBool::new(true);
        let outcome = publisher.reconcile(|| connector_exited.load(Ordering::SeqCst)).await.unwrap();

        assert_eq!(outcome.num_failed, 1);
        assert!(outcome.has_errors());
    }

    #[tokio::test]
    async fn closed_transport_with_no_outstanding_work_reconciles_immediately() {
        let messenger = Arc::new(RecordingPublisherMessenger::default());
        let publisher = Publisher::initialize(messenger.clone(), "invoices", Duration::from_millis(10))
            .await
            .unwrap();

        let outcome = publisher.reconcile(|| true).await.unwrap();
        assert_eq!(outcome.num_published, 0);
        assert!(!outcome.has_errors());
    }
}
