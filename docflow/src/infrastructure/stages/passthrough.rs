// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # PassThrough stage
//!
//! A no-op Stage that applies its conditional predicate (if any) and
//! otherwise leaves the document untouched (§4.2). It is not a stand-in
//! for real enrichment stages (dictionary lookup, regex extraction, JDBC
//! joins); it exists purely to exercise the Pipeline/Worker machinery in
//! tests and the bundled example binary. Downstream crates supply real
//! Stage implementations by implementing `docflow_domain::Stage`.

use docflow_domain::{Document, PipelineError, Stage, StageCondition};

pub struct PassThroughStage {
    name: String,
    condition: Option<StageCondition>,
}

impl PassThroughStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: StageCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl Stage for PassThroughStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn condition(&self) -> Option<&StageCondition> {
        self.condition.as_ref()
    }

    fn process_document(&mut self, _doc: &mut Document) -> Result<Vec<Document>, PipelineError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_domain::ConditionalOperator;

    #[test]
    fn leaves_document_unchanged() {
        let mut stage = PassThroughStage::new("noop");
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("kind", "invoice").unwrap();
        let before = doc.clone();

        let children = stage.process_conditional(&mut doc).unwrap().unwrap();
        assert!(children.is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn respects_its_condition() {
        let condition = StageCondition::new(vec!["kind".into()], vec!["invoice".into()], ConditionalOperator::Must);
        let mut stage = PassThroughStage::new("conditional-noop").with_condition(condition);
        let mut doc = Document::new("d1").unwrap();
        doc.set_field("kind", "receipt").unwrap();

        assert!(stage.process_conditional(&mut doc).unwrap().is_none());
    }
}
