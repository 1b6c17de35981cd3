// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Lifecycle events emitted by the Worker and Indexer, consumed by the
//! Publisher.

pub mod event;

pub use event::{Event, EventKind, SENT_TO_DLQ};
