use serde::{Deserialize, Serialize};
use crate::config::EngineModel;

/// Simulation parameters derived from the configuration, used frequently during simulation steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // Time
    pub dt: f64,
    pub total_steps: u64,
    pub record_interval_steps: u64,

    // Engine
    pub model: EngineModel,
    pub gravitational_constant: f64,
    pub softening: f64,
    pub softening_sq: f64,
    pub parallel_forces: bool,

    // Output
    pub record_trails: bool,
}

impl SimParams {
    /// Parameters for a model with SI gravity, no softening and a unit time step.
    pub fn for_model(model: EngineModel) -> Self {
        SimParams {
            dt: 1.0,
            total_steps: 0,
            record_interval_steps: 1,
            model,
            gravitational_constant: crate::config::GRAVITATIONAL_CONSTANT,
            softening: 0.0,
            softening_sq: 0.0,
            parallel_forces: false,
            record_trails: false,
        }
    }

    /// Returns a copy with the given softening length.
    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening = softening;
        self.softening_sq = softening * softening;
        self
    }
}
