use crate::body::Scene;
use crate::engine::{build_engine, Engine};
use crate::error::EngineError;
use log::{debug, info};
use orbit_common::{SimParams, Snapshot};

/// Owns the scene, the active engine and the physical-time counter.
///
/// Nothing here runs on its own: the caller decides when to `tick`.
pub struct Simulation {
    /// Runtime parameters derived from the configuration.
    params: SimParams,
    /// The bodies being simulated.
    scene: Scene,
    /// Strategy selected once from `params.model`.
    engine: Box<dyn Engine>,
    /// Sum of every applied `dt` since the last reset.
    physical_time: f64,
    /// Number of ticks applied since the last reset.
    current_step: u64,
    running: bool,
    /// Stores collected simulation data snapshots at record intervals.
    recorded_snapshots: Vec<Snapshot>,
}

impl Simulation {
    /// Creates a simulation, checking the scene against the selected engine.
    pub fn new(params: SimParams, scene: Scene) -> Result<Self, EngineError> {
        let engine = build_engine(&params);
        Self::with_engine(params, scene, engine)
    }

    /// Creates a simulation driving a caller-supplied engine.
    pub fn with_engine(params: SimParams, scene: Scene, engine: Box<dyn Engine>) -> Result<Self, EngineError> {
        engine.validate(&scene)?;
        info!("Simulation ready: {} bodies, {} engine", scene.len(), engine.name());
        Ok(Self {
            params,
            scene,
            engine,
            physical_time: 0.0,
            current_step: 0,
            running: false,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Advances the scene by `dt`. On error nothing changes, time included.
    pub fn tick(&mut self, dt: f64) -> Result<(), EngineError> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(EngineError::InvalidTimeStep { dt });
        }
        self.engine.advance(&mut self.scene, dt)?;
        self.physical_time += dt;
        self.current_step += 1;

        if self.params.record_trails {
            for body in self.scene.bodies_mut() {
                let position = body.position;
                body.trail.push(position);
            }
        }
        Ok(())
    }

    /// Advances by the configured time step.
    pub fn step(&mut self) -> Result<(), EngineError> {
        self.tick(self.params.dt)
    }

    /// Replaces the whole scene and restarts the clock. An invalid scene is
    /// rejected and the current one kept.
    pub fn reset(&mut self, scene: Scene) -> Result<(), EngineError> {
        self.engine.validate(&scene)?;
        debug!("Resetting simulation with {} bodies", scene.len());
        self.scene = scene;
        self.physical_time = 0.0;
        self.current_step = 0;
        self.recorded_snapshots.clear();
        Ok(())
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn physical_time(&self) -> f64 {
        self.physical_time
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Provides access to the simulation parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Current positions of all bodies, in scene order.
    pub fn get_results(&self) -> Vec<(f64, f64)> {
        self.scene.positions()
    }

    /// Collects the current metrics and stores them as a Snapshot.
    pub fn record_snapshot(&mut self, include_positions: bool) {
        let com = self.scene.center_of_mass();
        let snapshot = Snapshot {
            time: self.physical_time,
            step: self.current_step,
            body_count: self.scene.len() as u32,
            kinetic_energy: self.scene.kinetic_energy(),
            potential_energy: self.engine.potential_energy(&self.scene),
            center_of_mass: (com.x, com.y),
            positions: include_positions.then(|| self.get_results()),
        };
        debug!(
            "Snapshot at t={:.3}: KE={:.4e} PE={:.4e}",
            snapshot.time, snapshot.kinetic_energy, snapshot.potential_energy
        );
        self.recorded_snapshots.push(snapshot);
    }

    /// Provides access to the recorded snapshots.
    pub fn get_recorded_snapshots(&self) -> &[Snapshot] {
        &self.recorded_snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyKind, SpaceObject, TRAIL_CAPACITY};
    use crate::scene_codec::decode;
    use orbit_common::{EngineModel, Vec2};

    fn pair() -> Scene {
        decode("Star 10 yellow 1e20 0 0 0 0\nPlanet 5 green 1e10 1000 0 0 2 1\n").unwrap().scene
    }

    #[test]
    fn tick_accumulates_physical_time() {
        let mut sim = Simulation::new(SimParams::for_model(EngineModel::Direct), pair()).unwrap();
        sim.tick(0.25).unwrap();
        sim.tick(0.5).unwrap();
        assert_eq!(sim.physical_time(), 0.75);
        assert_eq!(sim.current_step(), 2);
        sim.step().unwrap();
        assert_eq!(sim.physical_time(), 1.75);
    }

    #[test]
    fn failed_tick_keeps_time_and_state() {
        let mut scene = pair();
        scene.push(SpaceObject::with_state(BodyKind::Planet, 1.0, Vec2::new(1000.0, 0.0), Vec2::zero()));
        let mut sim = Simulation::new(SimParams::for_model(EngineModel::Direct), scene).unwrap();
        let before = sim.get_results();
        assert!(matches!(sim.tick(1.0), Err(EngineError::UnboundedForce { .. })));
        assert_eq!(sim.physical_time(), 0.0);
        assert_eq!(sim.current_step(), 0);
        assert_eq!(sim.get_results(), before);
    }

    #[test]
    fn rejects_invalid_time_step() {
        let mut sim = Simulation::new(SimParams::for_model(EngineModel::Kinematic), pair()).unwrap();
        assert_eq!(sim.tick(-1.0), Err(EngineError::InvalidTimeStep { dt: -1.0 }));
        assert!(sim.tick(f64::NAN).is_err());
        assert_eq!(sim.physical_time(), 0.0);
    }

    #[test]
    fn reset_replaces_scene_and_clock() {
        let mut sim = Simulation::new(SimParams::for_model(EngineModel::Kinematic), pair()).unwrap();
        sim.tick(3.0).unwrap();
        sim.record_snapshot(true);

        // Orbitless planet cannot run kinematically: keep the old scene
        let mut bad = Scene::new();
        bad.push(SpaceObject::with_state(BodyKind::Planet, 1.0, Vec2::zero(), Vec2::zero()));
        assert!(sim.reset(bad).is_err());
        assert_eq!(sim.scene().len(), 2);
        assert_eq!(sim.physical_time(), 3.0);

        sim.reset(pair()).unwrap();
        assert_eq!(sim.physical_time(), 0.0);
        assert_eq!(sim.current_step(), 0);
        assert!(sim.get_recorded_snapshots().is_empty());
        assert_eq!(sim.get_results()[1], (1000.0, 0.0));
    }

    #[test]
    fn run_flag_toggles() {
        let mut sim = Simulation::new(SimParams::for_model(EngineModel::Kinematic), pair()).unwrap();
        assert!(!sim.is_running());
        sim.start();
        assert!(sim.is_running());
        sim.stop();
        assert!(!sim.is_running());
    }

    #[test]
    fn trails_are_recorded_when_enabled() {
        let mut params = SimParams::for_model(EngineModel::Kinematic);
        params.record_trails = true;
        let mut sim = Simulation::new(params, pair()).unwrap();
        for _ in 0..(TRAIL_CAPACITY + 10) {
            sim.tick(1.0).unwrap();
        }
        assert_eq!(sim.scene().get(1).unwrap().trail.len(), TRAIL_CAPACITY);
    }

    #[test]
    fn snapshot_reports_energy() {
        let mut sim = Simulation::new(SimParams::for_model(EngineModel::Direct), pair()).unwrap();
        sim.record_snapshot(false);
        let snap = &sim.get_recorded_snapshots()[0];
        assert_eq!(snap.body_count, 2);
        assert!((snap.kinetic_energy - 0.5 * 1e10 * 4.0).abs() < 1e-3);
        assert!(snap.potential_energy < 0.0);
        assert!(snap.positions.is_none());
    }
}
