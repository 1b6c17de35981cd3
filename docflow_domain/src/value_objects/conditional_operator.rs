// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Predicate operator for a Stage's conditional execution guard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a Stage's `conditional_fields`/`conditional_values` are combined
/// into a pass/fail decision for `process_conditional`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionalOperator {
    /// The document's field values must match the configured values.
    Must,
    /// The document's field values must NOT match the configured values.
    MustNot,
}

impl fmt::Display for ConditionalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Must => write!(f, "must"),
            Self::MustNot => write!(f, "must_not"),
        }
    }
}

impl FromStr for ConditionalOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "must" => Ok(Self::Must),
            "must_not" => Ok(Self::MustNot),
            other => Err(format!("unknown conditional operator: {other}")),
        }
    }
}
