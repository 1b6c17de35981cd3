// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure layer
//!
//! Concrete adapters for the ports defined in `docflow_domain`: message
//! transport, retry counter, index sink, Stage implementations, layered
//! configuration, and logging initialization. The application layer
//! never names these types directly — it is generic over the domain
//! traits they implement.

pub mod config;
pub mod logging;
pub mod messenger;
pub mod retry;
pub mod sinks;
pub mod stages;
