// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-memory Messenger
//!
//! A `tokio::sync::mpsc`-backed loopback transport implementing the
//! `WorkerMessenger`/`IndexerMessenger`/`PublisherMessenger` capability
//! sets on a single shared hub. Suitable for tests and the bundled
//! example binary; a production deployment swaps this module for a real
//! message-queue client without touching the application layer, since
//! `Worker`/`Indexer`/`Publisher` depend only on the domain ports.
//!
//! Channel closure (every `Sender` for a queue dropped) is how this
//! transport reports "no more items, ever" (`Poll::Closed`) — there is no
//! separate completion message. Each handle below is given only the
//! channel ends its capability set actually needs, so that dropping the
//! `Transport` hub (or the one component meant to own a given `Sender`)
//! is what lets the corresponding `Receiver` observe closure; handles
//! never carry a spare clone of a `Sender` they don't themselves use.

use docflow_domain::{Document, Event, IndexerMessenger, PipelineError, Poll, PublisherMessenger, RunId, WorkerMessenger};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

async fn recv_with_timeout<T>(rx: &Mutex<mpsc::Receiver<T>>, timeout: Duration) -> Poll<T> {
    let mut guard = rx.lock().await;
    match tokio::time::timeout(timeout, guard.recv()).await {
        Ok(Some(item)) => Poll::Item(item),
        Ok(None) => Poll::Closed,
        Err(_) => Poll::Empty,
    }
}

/// The shared hub backing all three messenger handles. One run (or one
/// test) owns a `Transport`.
pub struct Transport {
    source_tx: mpsc::Sender<Document>,
    source_rx: Arc<Mutex<mpsc::Receiver<Document>>>,
    completed_tx: mpsc::Sender<Document>,
    completed_rx: Arc<Mutex<mpsc::Receiver<Document>>>,
    events_tx: mpsc::Sender<Event>,
    events_rx: Arc<Mutex<mpsc::Receiver<Event>>>,
    dead_letter_tx: mpsc::Sender<Document>,
    dead_letter_rx: Arc<Mutex<mpsc::Receiver<Document>>>,
    committed_offsets: Arc<AtomicU64>,
}

impl Transport {
    pub fn new(capacity: usize) -> Self {
        let (source_tx, source_rx) = mpsc::channel(capacity);
        let (completed_tx, completed_rx) = mpsc::channel(capacity);
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let (dead_letter_tx, dead_letter_rx) = mpsc::channel(capacity);
        Self {
            source_tx,
            source_rx: Arc::new(Mutex::new(source_rx)),
            completed_tx,
            completed_rx: Arc::new(Mutex::new(completed_rx)),
            events_tx,
            events_rx: Arc::new(Mutex::new(events_rx)),
            dead_letter_tx,
            dead_letter_rx: Arc::new(Mutex::new(dead_letter_rx)),
            committed_offsets: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A handle usable by a Worker. Several workers in a pool (§4.3) each
    /// get their own handle over the same shared source receiver.
    pub fn worker_messenger(&self) -> InMemoryWorkerMessenger {
        InMemoryWorkerMessenger {
            source_rx: self.source_rx.clone(),
            completed_tx: self.completed_tx.clone(),
            events_tx: self.events_tx.clone(),
            dead_letter_tx: self.dead_letter_tx.clone(),
            committed_offsets: self.committed_offsets.clone(),
        }
    }

    pub fn indexer_messenger(&self) -> InMemoryIndexerMessenger {
        InMemoryIndexerMessenger {
            completed_rx: self.completed_rx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }

    pub fn publisher_messenger(&self) -> InMemoryPublisherMessenger {
        InMemoryPublisherMessenger {
            source_tx: self.source_tx.clone(),
            events_rx: self.events_rx.clone(),
            next_offset: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Drain whatever has landed in the dead-letter queue without
    /// blocking. Used by tests and the CLI's status reporting.
    pub async fn drain_dead_letters(&self) -> Vec<Document> {
        let mut rx = self.dead_letter_rx.lock().await;
        let mut drained = Vec::new();
        while let Ok(doc) = rx.try_recv() {
            drained.push(doc);
        }
        drained
    }

    pub fn committed_offset_count(&self) -> u64 {
        self.committed_offsets.load(Ordering::Relaxed)
    }
}

pub struct InMemoryWorkerMessenger {
    source_rx: Arc<Mutex<mpsc::Receiver<Document>>>,
    completed_tx: mpsc::Sender<Document>,
    events_tx: mpsc::Sender<Event>,
    dead_letter_tx: mpsc::Sender<Document>,
    committed_offsets: Arc<AtomicU64>,
}

#[async_trait::async_trait]
impl WorkerMessenger for InMemoryWorkerMessenger {
    async fn poll_doc_to_process(&self, timeout: Duration) -> Result<Poll<Document>, PipelineError> {
        Ok(recv_with_timeout(&self.source_rx, timeout).await)
    }

    async fn send_completed(&self, doc: Document) -> Result<(), PipelineError> {
        self.completed_tx
            .send(doc)
            .await
            .map_err(|_| PipelineError::transport("completed-documents queue is closed"))
    }

    async fn send_event(&self, event: Event) -> Result<(), PipelineError> {
        self.events_tx
            .send(event)
            .await
            .map_err(|_| PipelineError::transport("events queue is closed"))
    }

    async fn send_failed(&self, doc: Document) -> Result<(), PipelineError> {
        self.dead_letter_tx
            .send(doc)
            .await
            .map_err(|_| PipelineError::transport("dead-letter queue is closed"))
    }

    async fn commit_pending_doc_offsets(&self) -> Result<(), PipelineError> {
        self.committed_offsets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn close(&self) -> Result<(), PipelineError> {
        Ok(())
    }
}

pub struct InMemoryIndexerMessenger {
    completed_rx: Arc<Mutex<mpsc::Receiver<Document>>>,
    events_tx: mpsc::Sender<Event>,
}

#[async_trait::async_trait]
impl IndexerMessenger for InMemoryIndexerMessenger {
    async fn poll_completed(&self, timeout: Duration) -> Result<Poll<Document>, PipelineError> {
        Ok(recv_with_timeout(&self.completed_rx, timeout).await)
    }

    async fn send_event(&self, event: Event) -> Result<(), PipelineError> {
        self.events_tx
            .send(event)
            .await
            .map_err(|_| PipelineError::transport("events queue is closed"))
    }

    async fn close(&self) -> Result<(), PipelineError> {
        Ok(())
    }
}

pub struct InMemoryPublisherMessenger {
    source_tx: mpsc::Sender<Document>,
    events_rx: Arc<Mutex<mpsc::Receiver<Event>>>,
    next_offset: Arc<AtomicU64>,
}

#[async_trait::async_trait]
impl PublisherMessenger for InMemoryPublisherMessenger {
    async fn initialize(&self, _run_id: &RunId, _pipeline_name: &str) -> Result<(), PipelineError> {
        // An in-memory hub has no per-run topic to provision; a real
        // transport would create/select the run's events topic here.
        Ok(())
    }

    async fn send_for_processing(&self, mut doc: Document) -> Result<(), PipelineError> {
        doc.assign_source_offset(self.next_offset.fetch_add(1, Ordering::Relaxed));
        self.source_tx
            .send(doc)
            .await
            .map_err(|_| PipelineError::transport("source-documents queue is closed"))
    }

    async fn poll_event(&self, timeout: Duration) -> Result<Poll<Event>, PipelineError> {
        Ok(recv_with_timeout(&self.events_rx, timeout).await)
    }

    async fn close(&self) -> Result<(), PipelineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_domain::{DocumentId, EventKind};

    #[tokio::test]
    async fn publish_then_worker_receives() {
        let transport = Transport::new(8);
        let publisher = transport.publisher_messenger();
        let worker = transport.worker_messenger();

        let doc = Document::new("doc-1").unwrap();
        publisher.send_for_processing(doc.clone()).await.unwrap();

        match worker.poll_doc_to_process(Duration::from_millis(100)).await.unwrap() {
            Poll::Item(received) => assert_eq!(received.id(), doc.id()),
            other => panic!("expected Item, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_queue_times_out() {
        let transport = Transport::new(8);
        let worker = transport.worker_messenger();
        let outcome = worker.poll_doc_to_process(Duration::from_millis(20)).await.unwrap();
        assert_eq!(outcome, Poll::Empty);
    }

    #[tokio::test]
    async fn dropping_the_hub_closes_the_source_queue_for_workers() {
        let transport = Transport::new(8);
        let worker = transport.worker_messenger();
        drop(transport);

        let outcome = worker.poll_doc_to_process(Duration::from_millis(50)).await.unwrap();
        assert_eq!(outcome, Poll::Closed);
    }

    #[tokio::test]
    async fn events_round_trip_between_worker_and_publisher() {
        let transport = Transport::new(8);
        let worker = transport.worker_messenger();
        let publisher = transport.publisher_messenger();

        let run_id = RunId::generate();
        let event = Event::create(DocumentId::new("child-1").unwrap(), run_id);
        worker.send_event(event.clone()).await.unwrap();

        match publisher.poll_event(Duration::from_millis(100)).await.unwrap() {
            Poll::Item(received) => assert_eq!(received.kind, EventKind::Create),
            other => panic!("expected Item, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_documents_land_in_dead_letter_queue() {
        let transport = Transport::new(8);
        let worker = transport.worker_messenger();
        let doc = Document::new("exhausted").unwrap();

        worker.send_failed(doc.clone()).await.unwrap();
        let dead = transport.drain_dead_letters().await;
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id(), doc.id());
    }
}
