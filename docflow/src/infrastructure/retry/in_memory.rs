// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-memory RetryCounter
//!
//! Production deployments back the retry counter with a coordination
//! service (§9 Design Notes); this in-memory implementation is the one
//! reference implementation this repo ships, behind a `std::sync::Mutex`
//! since it is the one resource the Worker pool shares (§5).

use docflow_domain::{Document, PipelineError, RetryCounter};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct InMemoryRetryCounter {
    max_retries: u32,
    counts: Mutex<HashMap<String, u32>>,
}

impl InMemoryRetryCounter {
    /// `max_retries` is the configured threshold (`worker.maxRetries`);
    /// `add` reports the threshold reached once a document's count is
    /// `>= max_retries`.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            counts: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl RetryCounter for InMemoryRetryCounter {
    async fn add(&self, doc: &Document) -> Result<bool, PipelineError> {
        let mut counts = self.counts.lock().map_err(|_| PipelineError::internal("retry counter poisoned"))?;
        let entry = counts.entry(doc.id().as_str().to_string()).or_insert(0);
        *entry += 1;
        Ok(*entry >= self.max_retries)
    }

    async fn remove(&self, doc: &Document) -> Result<(), PipelineError> {
        let mut counts = self.counts.lock().map_err(|_| PipelineError::internal("retry counter poisoned"))?;
        counts.remove(doc.id().as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document::new(id).unwrap()
    }

    #[tokio::test]
    async fn reaching_max_retries_reports_true() {
        let counter = InMemoryRetryCounter::new(2);
        let d = doc("poison");
        assert!(!counter.add(&d).await.unwrap());
        assert!(counter.add(&d).await.unwrap());
    }

    #[tokio::test]
    async fn remove_clears_the_entry() {
        let counter = InMemoryRetryCounter::new(2);
        let d = doc("poison");
        counter.add(&d).await.unwrap();
        counter.remove(&d).await.unwrap();
        assert!(!counter.add(&d).await.unwrap());
    }

    #[tokio::test]
    async fn counters_are_independent_per_document() {
        let counter = InMemoryRetryCounter::new(1);
        assert!(counter.add(&doc("a")).await.unwrap());
        assert!(!counter.add(&doc("b")).await.unwrap());
    }
}
