// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline
//!
//! An ordered list of Stages executed per Document. See §4.2.

use crate::entities::document::Document;
use crate::entities::stage::Stage;
use crate::error::PipelineError;

/// An ordered sequence of Stages, owned exclusively by one Worker (§5:
/// "each Worker owns its own Pipeline instance").
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, stages: Vec<Box<dyn Stage>>) -> Self {
        Self { name: name.into(), stages }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Start every stage; called once before the owning Worker begins
    /// polling.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        for stage in &mut self.stages {
            stage.start()?;
        }
        Ok(())
    }

    /// Stop every stage; called once when the owning Worker terminates.
    pub fn stop(&mut self) -> Result<(), PipelineError> {
        for stage in &mut self.stages {
            stage.stop()?;
        }
        Ok(())
    }

    /// Run every stage on `doc` in order. Children produced by stage *k*
    /// are emitted as-is and are NOT themselves run through stages
    /// *k+1..n*. Returns `[doc, child_1, child_2, ...]`: the (possibly
    /// mutated and/or dropped) input first, followed by children in
    /// generation order.
    ///
    /// Any stage raising an error aborts processing for this document;
    /// the partially-mutated `doc` is returned alongside the error so
    /// the caller (the Worker) can still inspect/log it.
    pub fn process_document(&mut self, mut doc: Document) -> Result<Vec<Document>, (Document, PipelineError)> {
        let mut children = Vec::new();

        for stage in &mut self.stages {
            match stage.process_conditional(&mut doc) {
                Ok(Some(emitted)) => children.extend(emitted),
                Ok(None) => {}
                Err(err) => return Err((doc, err)),
            }
        }

        let mut results = Vec::with_capacity(1 + children.len());
        results.push(doc);
        results.extend(children);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::stage::StageCondition;

    struct PassThrough;

    impl Stage for PassThrough {
        fn name(&self) -> &str {
            "pass-through"
        }

        fn process_document(&mut self, _doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
            Ok(vec![])
        }
    }

    struct ChildSpawningStage {
        child_id: String,
    }

    impl Stage for ChildSpawningStage {
        fn name(&self) -> &str {
            "spawns-child"
        }

        fn process_document(&mut self, doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
            doc.set_field("visited", true)?;
            Ok(vec![Document::new(self.child_id.clone())?])
        }
    }

    struct FailingStage;

    impl Stage for FailingStage {
        fn name(&self) -> &str {
            "fails"
        }

        fn process_document(&mut self, _doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
            Err(PipelineError::stage("boom"))
        }
    }

    #[test]
    fn empty_pipeline_returns_input_unchanged() {
        let mut pipeline = Pipeline::new("empty", vec![]);
        let doc = Document::new("d1").unwrap();
        let results = pipeline.process_document(doc).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id().as_str(), "d1");
    }

    #[test]
    fn children_are_returned_after_the_input_in_generation_order() {
        let mut pipeline = Pipeline::new("spawn", vec![Box::new(ChildSpawningStage { child_id: "c1".into() })]);
        let doc = Document::new("p1").unwrap();
        let results = pipeline.process_document(doc).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id().as_str(), "p1");
        assert_eq!(results[1].id().as_str(), "c1");
    }

    #[test]
    fn children_from_an_earlier_stage_skip_later_stages() {
        struct CountingStage {
            calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
        }
        impl Stage for CountingStage {
            fn name(&self) -> &str {
                "counter"
            }
            fn process_document(&mut self, _doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
                self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(vec![])
            }
        }

        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let pipeline_stages: Vec<Box<dyn Stage>> = vec![
            Box::new(ChildSpawningStage { child_id: "c1".into() }),
            Box::new(CountingStage { calls: calls.clone() }),
        ];
        let mut pipeline = Pipeline::new("two-stage", pipeline_stages);
        let doc = Document::new("p1").unwrap();
        let results = pipeline.process_document(doc).unwrap();

        // Only the original document passes through the second stage;
        // the child is emitted as-is.
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn stage_error_aborts_and_returns_partial_document() {
        let mut pipeline = Pipeline::new("failing", vec![Box::new(FailingStage)]);
        let doc = Document::new("p1").unwrap();
        let (partial, err) = pipeline.process_document(doc).unwrap_err();
        assert_eq!(partial.id().as_str(), "p1");
        assert!(matches!(err, PipelineError::StageError(_)));
    }

    #[test]
    fn dropped_document_is_still_returned() {
        struct DroppingStage;
        impl Stage for DroppingStage {
            fn name(&self) -> &str {
                "drops"
            }
            fn process_document(&mut self, doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
                doc.set_dropped();
                Ok(vec![])
            }
        }

        let mut pipeline = Pipeline::new("drop", vec![Box::new(DroppingStage)]);
        let doc = Document::new("p1").unwrap();
        let results = pipeline.process_document(doc).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_dropped());
    }

    #[test]
    fn skipped_conditional_stage_leaves_document_unmodified() {
        struct GuardedStage {
            condition: StageCondition,
        }
        impl Stage for GuardedStage {
            fn name(&self) -> &str {
                "guarded"
            }
            fn condition(&self) -> Option<&StageCondition> {
                Some(&self.condition)
            }
            fn process_document(&mut self, doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
                doc.set_field("ran", true)?;
                Ok(vec![])
            }
        }

        let condition = StageCondition::new(
            vec!["kind".into()],
            vec!["invoice".into()],
            crate::value_objects::ConditionalOperator::Must,
        );
        let mut pipeline = Pipeline::new("guarded", vec![Box::new(GuardedStage { condition })]);
        let mut doc = Document::new("p1").unwrap();
        doc.set_field("kind", "receipt").unwrap();

        let results = pipeline.process_document(doc).unwrap();
        assert!(!results[0].has("ran"));
    }
}
