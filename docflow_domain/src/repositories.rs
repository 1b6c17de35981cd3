// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Ports the domain defines and infrastructure implements (Dependency
//! Inversion Principle).

pub mod index_sink;
pub mod messenger;
pub mod retry_counter;

pub use index_sink::{BatchOutcome, IndexSink, SinkOptions};
pub use messenger::{IndexerMessenger, Poll, PublisherMessenger, WorkerMessenger};
pub use retry_counter::RetryCounter;
