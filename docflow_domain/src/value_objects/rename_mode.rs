// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Merge semantics for `Document::rename_field`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How `rename_field` should combine the source value with any value
/// already present at the destination field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenameMode {
    /// Replace the destination's value entirely.
    Overwrite,
    /// Convert the destination to a sequence and append the source's
    /// value(s), unpacking the source if it is itself a sequence.
    Append,
    /// Leave an existing destination value untouched.
    Skip,
}

impl fmt::Display for RenameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "OVERWRITE"),
            Self::Append => write!(f, "APPEND"),
            Self::Skip => write!(f, "SKIP"),
        }
    }
}

impl FromStr for RenameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OVERWRITE" => Ok(Self::Overwrite),
            "APPEND" => Ok(Self::Append),
            "SKIP" => Ok(Self::Skip),
            other => Err(format!("unknown rename mode: {other}")),
        }
    }
}
