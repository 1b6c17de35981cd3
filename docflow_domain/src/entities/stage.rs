// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage
//!
//! A Stage is an opaque `Document -> [Document]` enrichment unit: it
//! mutates its input document in place and may emit child documents as a
//! side effect. See §4.2.

use crate::entities::document::Document;
use crate::error::PipelineError;
use crate::value_objects::ConditionalOperator;

/// A Stage's optional execution guard: the stage only runs when every
/// `conditional_fields[i]` on the candidate document matches (or, under
/// `MustNot`, fails to match) `conditional_values[i]`.
#[derive(Debug, Clone)]
pub struct StageCondition {
    pub fields: Vec<String>,
    pub values: Vec<String>,
    pub operator: ConditionalOperator,
}

impl StageCondition {
    pub fn new(fields: Vec<String>, values: Vec<String>, operator: ConditionalOperator) -> Self {
        Self { fields, values, operator }
    }

    /// Evaluate the predicate against `doc`. Returns `true` when the
    /// stage should run.
    fn evaluate(&self, doc: &Document) -> bool {
        let matches_all = self
            .fields
            .iter()
            .zip(&self.values)
            .all(|(field, expected)| doc.get_string(field).as_deref() == Some(expected.as_str()));

        match self.operator {
            ConditionalOperator::Must => matches_all,
            ConditionalOperator::MustNot => !matches_all,
        }
    }
}

/// An in-place Document transformation that may emit child documents.
///
/// Implementations own no shared mutable state across Workers: §5
/// requires that each Worker construct its own `Pipeline` (and therefore
/// its own Stage instances), so a Stage only needs to be safe to invoke
/// repeatedly from a single owner, not safe to share.
pub trait Stage: Send {
    /// Stable, human-readable stage name, used in logs and error
    /// messages.
    fn name(&self) -> &str;

    /// Called once before the owning Worker begins polling.
    fn start(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Called once when the owning Worker terminates.
    fn stop(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    /// The stage's optional conditional guard; `None` means "always run".
    fn condition(&self) -> Option<&StageCondition> {
        None
    }

    /// Mutate `doc` in place and return any child documents discovered
    /// as a side effect (possibly empty). Raising an error aborts the
    /// pipeline for this document (§4.2 Failure).
    fn process_document(&mut self, doc: &mut Document) -> Result<Vec<Document>, PipelineError>;

    /// Evaluate `condition()` against `doc` and run `process_document`
    /// only if it passes; returns `Ok(None)` (the `processConditional`
    /// "skipped" case) otherwise.
    fn process_conditional(&mut self, doc: &mut Document) -> Result<Option<Vec<Document>>, PipelineError> {
        if let Some(condition) = self.condition() {
            if !condition.evaluate(doc) {
                return Ok(None);
            }
        }
        self.process_document(doc).map(Some)
    }
}
