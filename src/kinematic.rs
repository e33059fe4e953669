//! Hierarchical circular-orbit model.
//!
//! Planets circle their star and satellites circle their planet on the
//! orbits derived at load time. Positions are rebuilt from radius and angle
//! every tick, so the model cannot drift or blow up.

use crate::body::{BodyKind, Scene};
use crate::engine::Engine;
use crate::error::EngineError;
use log::trace;
use orbit_common::{angle_to_vec, wrap_angle};

/// Update order by hierarchy depth. Stars are roots and never move here.
const DEPTH_ORDER: [BodyKind; 2] = [BodyKind::Planet, BodyKind::Satellite];

#[derive(Debug, Clone, Default)]
pub struct KinematicOrbits;

impl KinematicOrbits {
    pub fn new() -> Self {
        KinematicOrbits
    }
}

fn expected_parent(kind: BodyKind) -> Option<BodyKind> {
    match kind {
        BodyKind::Star => None,
        BodyKind::Planet => Some(BodyKind::Star),
        BodyKind::Satellite => Some(BodyKind::Planet),
    }
}

impl Engine for KinematicOrbits {
    fn name(&self) -> &'static str {
        "kinematic"
    }

    fn validate(&self, scene: &Scene) -> Result<(), EngineError> {
        for (i, body) in scene.iter().enumerate() {
            let Some(parent_kind) = expected_parent(body.kind()) else {
                continue;
            };
            let orbit = body.orbit.ok_or(EngineError::MissingOrbit { body: i })?;
            let parent = scene
                .get(orbit.parent)
                .ok_or(EngineError::DanglingParent { body: i, parent: orbit.parent })?;
            if orbit.parent >= i || parent.kind() != parent_kind {
                return Err(EngineError::InvalidParent { body: i, parent: orbit.parent });
            }
            let finite = orbit.radius.is_finite() && orbit.angle.is_finite() && orbit.angular_speed.is_finite();
            if !finite || orbit.radius <= 0.0 {
                return Err(EngineError::NonFiniteState { body: i });
            }
        }
        Ok(())
    }

    fn advance(&self, scene: &mut Scene, dt: f64) -> Result<(), EngineError> {
        if !dt.is_finite() {
            return Err(EngineError::InvalidTimeStep { dt });
        }
        self.validate(scene)?;

        let mut moved = 0usize;
        for level in DEPTH_ORDER {
            for i in 0..scene.len() {
                let bodies = scene.bodies_mut();
                if bodies[i].kind() != level {
                    continue;
                }
                let Some(mut orbit) = bodies[i].orbit else {
                    continue;
                };
                // Parent is already at its position for this tick
                let center = bodies[orbit.parent].position;
                orbit.angle = wrap_angle(orbit.angle + orbit.direction.sign() * orbit.angular_speed * dt);
                bodies[i].position = center + angle_to_vec(orbit.angle) * orbit.radius;
                bodies[i].orbit = Some(orbit);
                moved += 1;
            }
        }
        trace!("kinematic: repositioned {} bodies by dt={}", moved, dt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Orbit, OrbitDirection, SpaceObject};
    use crate::scene_codec::decode;
    use orbit_common::Vec2;
    use std::f64::consts::{FRAC_PI_2, TAU};

    const SYSTEM: &str = "\
Star 10 yellow 1e30 0 0 0 0
Planet 5 green 1e24 100 0 0 10 1 moon
Planet 5 blue 1e24 0 250 5 0 2
";

    fn load() -> Scene {
        decode(SYSTEM).unwrap().scene
    }

    #[test]
    fn planets_keep_their_orbit_radius() {
        let mut scene = load();
        let engine = KinematicOrbits::new();
        for (step, dt) in [0.3, 7.0, 1e3, 0.01].iter().cycle().take(400).enumerate() {
            engine.advance(&mut scene, *dt).unwrap();
            for body in scene.iter() {
                if let Some(orbit) = body.orbit {
                    let center = scene.get(orbit.parent).unwrap().position;
                    let r = body.position.distance(center);
                    assert!((r - orbit.radius).abs() < 1e-9 * orbit.radius, "step {}: {} vs {}", step, r, orbit.radius);
                    assert!((0.0..TAU).contains(&orbit.angle));
                }
            }
        }
    }

    #[test]
    fn direction_follows_orbit_index() {
        let mut scene = load();
        KinematicOrbits::new().advance(&mut scene, 1.0).unwrap();
        // index 1 is prograde: angle grows from 0 by 0.1 rad
        let prograde = scene.get(1).unwrap().orbit.unwrap();
        assert!((prograde.angle - 0.1).abs() < 1e-12);
        // index 2 is retrograde: angle shrinks from π/2 by 0.02 rad
        let retro_body = scene.get(3).unwrap();
        let retro = retro_body.orbit.unwrap();
        assert_eq!(retro.direction, OrbitDirection::Retrograde);
        assert!((retro.angle - (FRAC_PI_2 - 0.02)).abs() < 1e-12);
    }

    #[test]
    fn satellite_tracks_current_planet_position() {
        let mut scene = load();
        let engine = KinematicOrbits::new();
        // Drag the star; planet and moon must follow within the same tick
        scene.get_mut(0).unwrap().position = Vec2::new(1000.0, -500.0);
        engine.advance(&mut scene, 2.0).unwrap();

        let star = scene.get(0).unwrap().position;
        let planet = scene.get(1).unwrap();
        let moon = scene.get(2).unwrap();
        assert!((planet.position.distance(star) - 100.0).abs() < 1e-9);
        let moon_orbit = moon.orbit.unwrap();
        assert!((moon.position.distance(planet.position) - moon_orbit.radius).abs() < 1e-9);
        let expected = planet.position + angle_to_vec(moon_orbit.angle) * moon_orbit.radius;
        assert!(moon.position.distance(expected) < 1e-9);
    }

    #[test]
    fn leaves_dynamics_untouched() {
        let mut scene = load();
        let before: Vec<_> = scene.iter().map(|b| (b.mass, b.velocity, b.force)).collect();
        KinematicOrbits::new().advance(&mut scene, 5.0).unwrap();
        let after: Vec<_> = scene.iter().map(|b| (b.mass, b.velocity, b.force)).collect();
        assert_eq!(before, after);
        assert_eq!(scene.get(0).unwrap().position, Vec2::zero());
    }

    #[test]
    fn planet_without_orbit_is_rejected() {
        let mut scene = Scene::new();
        scene.push(SpaceObject::with_state(BodyKind::Star, 1.0, Vec2::zero(), Vec2::zero()));
        scene.push(SpaceObject::with_state(BodyKind::Planet, 1.0, Vec2::new(1.0, 0.0), Vec2::zero()));
        let err = KinematicOrbits::new().advance(&mut scene, 1.0).unwrap_err();
        assert_eq!(err, EngineError::MissingOrbit { body: 1 });
    }

    #[test]
    fn parent_rules_are_enforced() {
        let orbit = |parent| Orbit { parent, radius: 1.0, angle: 0.0, angular_speed: 1.0, direction: OrbitDirection::Prograde };
        let mut scene = Scene::new();
        scene.push(SpaceObject::with_state(BodyKind::Star, 1.0, Vec2::zero(), Vec2::zero()));
        let mut moon = SpaceObject::new(BodyKind::Satellite);
        moon.orbit = Some(orbit(0));
        scene.push(moon);
        let engine = KinematicOrbits::new();
        assert_eq!(engine.validate(&scene), Err(EngineError::InvalidParent { body: 1, parent: 0 }));

        scene.get_mut(1).unwrap().orbit = Some(orbit(9));
        assert_eq!(engine.validate(&scene), Err(EngineError::DanglingParent { body: 1, parent: 9 }));
    }
}
