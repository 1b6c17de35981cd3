// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Immutable value objects used throughout the document pipeline domain.

pub mod conditional_operator;
pub mod datetime_serde;
pub mod document_id;
pub mod field_value;
pub mod rename_mode;
pub mod run_id;

pub use conditional_operator::ConditionalOperator;
pub use document_id::DocumentId;
pub use field_value::{FieldValue, ScalarValue};
pub use rename_mode::RenameMode;
pub use run_id::RunId;
