// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Document identity value object.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A document's identity: a non-empty string, immutable after construction.
///
/// `DocumentId` is intentionally a thin wrapper rather than a UUID: the
/// specification allows arbitrary non-empty textual ids assigned by
/// upstream Connectors (row keys, JDBC primary keys, etc.), so validation
/// is limited to "present, textual, non-empty".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Construct a new `DocumentId`, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> Result<Self, PipelineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PipelineError::validation("document id must be non-empty"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_id() {
        assert!(DocumentId::new("").is_err());
        assert!(DocumentId::new("   ").is_err());
    }

    #[test]
    fn accepts_non_empty_id() {
        let id = DocumentId::new("doc-1").unwrap();
        assert_eq!(id.as_str(), "doc-1");
    }

    #[test]
    fn displays_as_raw_string() {
        let id = DocumentId::new("abc").unwrap();
        assert_eq!(id.to_string(), "abc");
    }
}
