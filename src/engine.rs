//! Common interface for the simulation strategies.

use crate::body::Scene;
use crate::direct::DirectGravity;
use crate::error::EngineError;
use crate::kinematic::KinematicOrbits;
use orbit_common::{EngineModel, SimParams};

/// Something that can move a scene forward by `dt`.
///
/// `advance` either applies the whole step or returns an error with the
/// scene left exactly as it was.
pub trait Engine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Checks that `scene` satisfies this engine's preconditions.
    fn validate(&self, scene: &Scene) -> Result<(), EngineError>;

    fn advance(&self, scene: &mut Scene, dt: f64) -> Result<(), EngineError>;

    /// Gravitational potential energy of the scene, where the model has one.
    fn potential_energy(&self, _scene: &Scene) -> f64 {
        0.0
    }
}

/// Builds the engine selected by the configuration.
pub fn build_engine(params: &SimParams) -> Box<dyn Engine> {
    match params.model {
        EngineModel::Direct => Box::new(DirectGravity::from_params(params)),
        EngineModel::Kinematic => Box::new(KinematicOrbits::new()),
    }
}
