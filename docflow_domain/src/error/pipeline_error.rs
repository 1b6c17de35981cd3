// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error Taxonomy
//!
//! `PipelineError` is the single error type that flows through domain and
//! application code. It mirrors the taxonomy in the error-handling design:
//! validation errors are raised synchronously to the caller, stage/transport/
//! sink errors become `Event::fail` messages, and configuration errors are
//! raised before any component starts.

use thiserror::Error;

/// Errors raised by the document pipeline core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A caller attempted to mutate a reserved field (`id`, `run_id`,
    /// `.children`) through a general-purpose mutator.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A caller attempted an operation that is only valid once per
    /// lifecycle (e.g. setting `run_id` twice during construction).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Document construction from JSON failed (missing/empty/non-textual
    /// `id`, or malformed payload).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A Stage raised an error while processing a document.
    #[error("stage processing failed: {0}")]
    StageError(String),

    /// A Messenger send or poll failed.
    #[error("transport error: {0}")]
    TransportError(String),

    /// The index sink rejected a batch or individual document.
    #[error("sink error: {0}")]
    SinkError(String),

    /// A document's retry count reached the configured maximum.
    #[error("retry exhausted: {0}")]
    RetryExhausted(String),

    /// Configuration failed validation before startup.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Catch-all for conditions that should be unreachable.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl PipelineError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn stage(msg: impl Into<String>) -> Self {
        Self::StageError(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::SinkError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn retry_exhausted(msg: impl Into<String>) -> Self {
        Self::RetryExhausted(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether this error category represents a transient condition a
    /// retry (redelivery) might resolve.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TransportError(_) | Self::SinkError(_))
    }

    /// Short category tag, used in log fields and metrics dimensions.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidState(_) => "invalid_state",
            Self::ValidationError(_) => "validation",
            Self::StageError(_) => "stage",
            Self::TransportError(_) => "transport",
            Self::SinkError(_) => "sink",
            Self::RetryExhausted(_) => "retry_exhausted",
            Self::ConfigError(_) => "config",
            Self::InternalError(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_matches_variant() {
        assert_eq!(PipelineError::invalid_argument("x").category(), "invalid_argument");
        assert_eq!(PipelineError::sink("x").category(), "sink");
    }

    #[test]
    fn transport_and_sink_errors_are_recoverable() {
        assert!(PipelineError::transport("timeout").is_recoverable());
        assert!(PipelineError::sink("partial failure").is_recoverable());
        assert!(!PipelineError::stage("boom").is_recoverable());
    }
}
