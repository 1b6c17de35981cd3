// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bundled demo connector
//!
//! Connectors are external collaborators, specified only where they
//! touch the core (§1 Out of scope): a JDBC poller, a filesystem
//! watcher, a Kafka consumer. This module ships one minimal connector
//! so the `run` CLI command and the integration tests have a concrete
//! document source: it reads newline-delimited JSON documents from an
//! async reader (stdin in the CLI, an in-memory buffer in tests) and
//! publishes each one before signalling its own exhaustion.

use docflow_domain::{Document, PipelineError, PublisherMessenger};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::application::Publisher;

/// Reads one JSON document per line until EOF, publishing each through
/// `publisher`. A malformed line is logged and skipped rather than
/// aborting the run, matching the specification's boundary behaviors
/// for document construction (missing/invalid `id` is a validation
/// error, not a fatal one).
pub struct LineDelimitedJsonConnector<R> {
    reader: BufReader<R>,
}

impl<R: AsyncRead + Unpin> LineDelimitedJsonConnector<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Publish every well-formed document line found, then flip
    /// `exited` to `true`. `exited` is the flag the Publisher's
    /// `reconcile` loop polls for the "connector thread has exited"
    /// condition (§4.4).
    pub async fn run<M: PublisherMessenger>(mut self, publisher: &mut Publisher<M>, exited: Arc<AtomicBool>) -> Result<usize, PipelineError> {
        let mut published = 0;
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .await
                .map_err(|e| PipelineError::transport(format!("failed reading from document source: {e}")))?;

            if bytes_read == 0 {
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<serde_json::Value>(trimmed).map_err(PipelineError::from).and_then(Document::from_json) {
                Ok(doc) => {
                    publisher.publish(doc).await?;
                    published += 1;
                }
                Err(err) => {
                    tracing::warn!(error = %err, line = trimmed, "skipping malformed document line");
                }
            }
        }

        exited.store(true, Ordering::SeqCst);
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_domain::{Event, Poll, RunId};
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisherMessenger {
        sent: Mutex<Vec<Document>>,
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
            Ok(Poll::Closed)
        }

        async fn close(&self) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn publishes_one_document_per_well_formed_line() {
        let input = "{\"id\":\"a\"}\n{\"id\":\"b\"}\n";
        let messenger = Arc::new(RecordingPublisherMessenger::default());
        let mut publisher = Publisher::initialize(messenger.clone(), "demo", Duration::from_millis(10))
            .await
            .unwrap();

        let connector = LineDelimitedJsonConnector::new(input.as_bytes());
        let exited = Arc::new(AtomicBool::new(false));
        let published = connector.run(&mut publisher, exited.clone()).await.unwrap();

        assert_eq!(published, 2);
        assert!(exited.load(Ordering::SeqCst));
        assert_eq!(messenger.sent.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped_not_fatal() {
        let input = "not json\n{\"id\":\"a\"}\n";
        let messenger = Arc::new(RecordingPublisherMessenger::default());
        let mut publisher = Publisher::initialize(messenger.clone(), "demo", Duration::from_millis(10))
            .await
            .unwrap();

        let connector = LineDelimitedJsonConnector::new(input.as_bytes());
        let exited = Arc::new(AtomicBool::new(false));
        let published = connector.run(&mut publisher, exited).await.unwrap();

        assert_eq!(published, 1);
    }

    #[tokio::test]
    async fn empty_input_publishes_nothing_and_still_signals_exit() {
        let messenger = Arc::new(RecordingPublisherMessenger::default());
        let mut publisher = Publisher::initialize(messenger.clone(), "demo", Duration::from_millis(10))
            .await
            .unwrap();

        let connector = LineDelimitedJsonConnector::new("".as_bytes());
        let exited = Arc::new(AtomicBool::new(false));
        let published = connector.run(&mut publisher, exited.clone()).await.unwrap();

        assert_eq!(published, 0);
        assert!(exited.load(Ordering::SeqCst));
    }
}
