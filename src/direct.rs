//! Direct O(N²) Newtonian gravity with a semi-implicit Euler step.

use crate::body::Scene;
use crate::engine::Engine;
use crate::error::EngineError;
use log::trace;
use orbit_common::{SimParams, Vec2, GRAVITATIONAL_CONSTANT};
use rayon::prelude::*;

/// Pairwise gravity between every ordered pair of bodies.
///
/// Each tick runs in two phases: all forces are computed from the current
/// positions, then every body is moved. No body ever sees a neighbour's
/// updated position within the same tick.
#[derive(Debug, Clone)]
pub struct DirectGravity {
    pub gravitational_constant: f64,
    /// Squared softening length ε², added to r² in the force denominator.
    pub softening_sq: f64,
    /// Compute per-body forces on the rayon thread pool.
    pub parallel: bool,
}

impl Default for DirectGravity {
    fn default() -> Self {
        Self::new(GRAVITATIONAL_CONSTANT)
    }
}

impl DirectGravity {
    /// Unsoftened, serial gravity with the given constant.
    pub fn new(gravitational_constant: f64) -> Self {
        DirectGravity { gravitational_constant, softening_sq: 0.0, parallel: false }
    }

    pub fn from_params(params: &SimParams) -> Self {
        DirectGravity {
            gravitational_constant: params.gravitational_constant,
            softening_sq: params.softening_sq,
            parallel: params.parallel_forces,
        }
    }

    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening_sq = softening * softening;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Net force on every body, in scene order, without touching the scene.
    ///
    /// Fails with `UnboundedForce` when two distinct bodies share a position:
    /// the direction term divides by the unsoftened distance.
    pub fn compute_forces(&self, scene: &Scene) -> Result<Vec<Vec2>, EngineError> {
        let positions: Vec<Vec2> = scene.iter().map(|b| b.position).collect();
        let masses: Vec<f64> = scene.iter().map(|b| b.mass).collect();
        let n = positions.len();

        if self.parallel {
            (0..n)
                .into_par_iter()
                .map(|i| self.force_on(i, &positions, &masses))
                .collect()
        } else {
            (0..n).map(|i| self.force_on(i, &positions, &masses)).collect()
        }
    }

    fn force_on(&self, i: usize, positions: &[Vec2], masses: &[f64]) -> Result<Vec2, EngineError> {
        let mut force = Vec2::zero();
        for (j, (&pos_j, &mass_j)) in positions.iter().zip(masses).enumerate() {
            if j == i {
                continue; // no self-interaction
            }
            let d = pos_j - positions[i];
            let r_sq = d.length_squared();
            if r_sq == 0.0 {
                return Err(EngineError::UnboundedForce { body: i, other: j });
            }
            let r = r_sq.sqrt();
            let f = self.gravitational_constant * masses[i] * mass_j / (r_sq + self.softening_sq);
            force += d * (f / r);
        }
        Ok(force)
    }
}

impl Engine for DirectGravity {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn validate(&self, scene: &Scene) -> Result<(), EngineError> {
        for (i, body) in scene.iter().enumerate() {
            if !(body.mass.is_finite() && body.mass > 0.0) {
                return Err(EngineError::NonPositiveMass { body: i, mass: body.mass });
            }
            if !(body.position.is_finite() && body.velocity.is_finite()) {
                return Err(EngineError::NonFiniteState { body: i });
            }
        }
        Ok(())
    }

    fn advance(&self, scene: &mut Scene, dt: f64) -> Result<(), EngineError> {
        self.validate(scene)?;
        let forces = self.compute_forces(scene)?;

        // Stage every update first so a failure leaves the scene untouched
        let mut staged = Vec::with_capacity(forces.len());
        for (i, (body, &force)) in scene.iter().zip(&forces).enumerate() {
            let accel = force / body.mass;
            let velocity = body.velocity + accel * dt;
            let position = body.position + velocity * dt;
            if !(force.is_finite() && velocity.is_finite() && position.is_finite()) {
                return Err(EngineError::NonFiniteState { body: i });
            }
            staged.push((force, velocity, position));
        }

        for (body, (force, velocity, position)) in scene.bodies_mut().iter_mut().zip(staged) {
            body.force = force;
            body.velocity = velocity;
            body.position = position;
        }
        trace!("direct: advanced {} bodies by dt={}", forces.len(), dt);
        Ok(())
    }

    fn potential_energy(&self, scene: &Scene) -> f64 {
        let bodies = scene.bodies();
        let mut energy = 0.0;
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                let r_sq = a.position.distance_squared(b.position) + self.softening_sq;
                if r_sq > 0.0 {
                    energy -= self.gravitational_constant * a.mass * b.mass / r_sq.sqrt();
                }
            }
        }
        energy
    }
}
