// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline registry
//!
//! Builds a fresh [`Pipeline`] instance by name. Each Worker owns its
//! own `Pipeline` (§5), so this is a factory, not a cache: every call
//! constructs new `Stage` instances. Production deployments register
//! real Stage implementations (dictionary lookup, regex, JDBC, ...)
//! here; this repo ships only the pass-through stage (§1 Out of scope).

use crate::infrastructure::stages::PassThroughStage;
use docflow_domain::{Pipeline, PipelineError};

/// Construct a fresh `Pipeline` for `name`.
///
/// Every registered pipeline currently runs the same single
/// pass-through stage; the name still selects independently
/// constructed `Stage` instances so that adding real, per-pipeline
/// stage chains later does not change this function's signature.
pub fn build_pipeline(name: &str) -> Result<Pipeline, PipelineError> {
    if name.trim().is_empty() {
        return Err(PipelineError::config("pipeline name must not be empty"));
    }
    Ok(Pipeline::new(name, vec![Box::new(PassThroughStage::new("pass-through"))]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_named_pipeline_with_at_least_one_stage() {
        let pipeline = build_pipeline("invoices").unwrap();
        assert_eq!(pipeline.name(), "invoices");
        assert_eq!(pipeline.stage_count(), 1);
    }

    #[test]
    fn rejects_an_empty_pipeline_name() {
        assert!(build_pipeline("  ").is_err());
    }
}
