// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Message transport adapters implementing the domain's Messenger ports.

pub mod in_memory;

pub use in_memory::{InMemoryIndexerMessenger, InMemoryPublisherMessenger, InMemoryWorkerMessenger, Transport};
