// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod batch;
pub mod gateway;
pub mod prompt;
pub mod relay;

pub use batch::{BatchIngestor, BatchRows};
pub use gateway::{BatchResult, PlanGateway};
pub use prompt::build_prompt;
pub use relay::RelayClient;
