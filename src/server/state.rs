//! Server shared state
//!
//! Holds configuration and the running address pipeline.

use crate::config::Config;
use crate::pipeline::AddressPipeline;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Pipeline driven by `/api/events` and observed by `/api/state`
    pub pipeline: AddressPipeline,

    started: Instant,
}

impl AppState {
    pub fn new(config: Config, pipeline: AddressPipeline) -> Self {
        Self {
            config,
            pipeline,
            started: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
