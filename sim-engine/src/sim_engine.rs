// src/sim_engine.rs
// High-level simulation engine wrapper around the Kernel. Scenarios create a
// SimEngine, register agents, and run it; this is where logging and config
// get wired in so scenarios themselves stay about agents and messages.

use crate::config::SimConfig;
use crate::kernel::Kernel;
use crate::logging::init_tracing;

/// Thin wrapper around `Kernel` that wires up `tracing` from a `SimConfig`.
/// Kept deliberately small: the kernel is the real engine, this is just the
/// entry point a driver program constructs.
pub struct SimEngine {
    pub kernel: Kernel,
    pub config: SimConfig,
}

impl SimEngine {
    /// Create an engine with the given config, initializing the global
    /// `tracing` subscriber from `config.log_filter`.
    pub fn new(config: SimConfig) -> Self {
        init_tracing(&config.log_filter);
        Self { kernel: Kernel::new(), config }
    }

    /// Create an engine with `SimConfig::default()`.
    pub fn with_default_config() -> Self {
        Self::new(SimConfig::default())
    }
}
