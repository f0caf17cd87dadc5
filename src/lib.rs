// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Diet-Gateway: relay diet-plan requests to an AI completion service
//!
//! This crate provides the HTTP gateway that authenticates callers, loads
//! profiles from the document store, builds prompts, relays them upstream
//! and stores the generated plans.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ProfileStore;
use services::PlanGateway;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ProfileStore>,
    pub gateway: PlanGateway,
}

impl AppState {
    /// Wire the gateway to `store` using the relay settings in `config`.
    pub fn new(config: Config, store: Arc<dyn ProfileStore>) -> error::Result<Self> {
        let gateway = PlanGateway::from_config(&config, store.clone())?;
        Ok(Self {
            config,
            store,
            gateway,
        })
    }
}
