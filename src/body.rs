use orbit_common::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of points kept in an orbit trail.
pub const TRAIL_CAPACITY: usize = 500;

/// The closed set of body kinds. Kind only selects construction defaults
/// and the codec keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Star,
    Planet,
    Satellite,
}

impl BodyKind {
    /// Capitalized keyword used when writing scene text.
    pub fn keyword(self) -> &'static str {
        match self {
            BodyKind::Star => "Star",
            BodyKind::Planet => "Planet",
            BodyKind::Satellite => "Satellite",
        }
    }

    /// Case-insensitive lookup of the kinds a scene file may declare.
    /// Satellites are never read directly, only synthesized from a planet line.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "star" => Some(BodyKind::Star),
            "planet" => Some(BodyKind::Planet),
            _ => None,
        }
    }

    pub fn default_radius(self) -> f64 {
        match self {
            BodyKind::Star => 10.0,
            BodyKind::Planet => 5.0,
            BodyKind::Satellite => 2.0,
        }
    }

    pub fn default_color(self) -> &'static str {
        match self {
            BodyKind::Star => "yellow",
            BodyKind::Planet => "green",
            BodyKind::Satellite => "gray",
        }
    }
}

/// Sense of rotation along a kinematic orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitDirection {
    Prograde,
    Retrograde,
}

impl OrbitDirection {
    /// Even orbit indices run retrograde, odd ones prograde.
    pub fn from_index(index: u64) -> Self {
        if index % 2 == 0 {
            OrbitDirection::Retrograde
        } else {
            OrbitDirection::Prograde
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            OrbitDirection::Prograde => 1.0,
            OrbitDirection::Retrograde => -1.0,
        }
    }
}

/// Circular orbit parameters, fixed when the scene is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    /// Index of the parent body in the owning scene.
    pub parent: usize,
    pub radius: f64,
    /// Current angular position in radians, kept in [0, 2π).
    pub angle: f64,
    /// Radians per unit time.
    pub angular_speed: f64,
    pub direction: OrbitDirection,
}

/// Bounded history of recent positions, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<Vec2>,
}

impl Trail {
    pub fn push(&mut self, point: Vec2) {
        if self.points.len() == TRAIL_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }
}

/// A simulated body. `kind` is fixed at construction; everything else is
/// plain state mutated by the engines.
#[derive(Debug, Clone)]
pub struct SpaceObject {
    kind: BodyKind,
    pub mass: f64,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Scratch accumulator, rewritten on every direct-model tick.
    pub force: Vec2,
    pub radius: f64,
    pub color: String,
    pub orbit: Option<Orbit>,
    pub trail: Trail,
}

impl SpaceObject {
    /// Creates a body at rest at the origin with the kind's rendering defaults.
    pub fn new(kind: BodyKind) -> Self {
        SpaceObject {
            kind,
            mass: 0.0,
            position: Vec2::zero(),
            velocity: Vec2::zero(),
            force: Vec2::zero(),
            radius: kind.default_radius(),
            color: kind.default_color().to_string(),
            orbit: None,
            trail: Trail::default(),
        }
    }

    /// Convenience constructor used by tests and the generator.
    pub fn with_state(kind: BodyKind, mass: f64, position: Vec2, velocity: Vec2) -> Self {
        SpaceObject { mass, position, velocity, ..SpaceObject::new(kind) }
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn parent(&self) -> Option<usize> {
        self.orbit.map(|o| o.parent)
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}

/// Ordered collection of bodies. Orbit parents are indices into this list,
/// so the whole scene is replaced at once rather than edited piecemeal.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    bodies: Vec<SpaceObject>,
}

impl Scene {
    pub fn new() -> Self {
        Scene { bodies: Vec::new() }
    }

    /// Appends a body and returns its index.
    pub fn push(&mut self, body: SpaceObject) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SpaceObject> {
        self.bodies.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SpaceObject> {
        self.bodies.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpaceObject> {
        self.bodies.iter()
    }

    pub fn bodies(&self) -> &[SpaceObject] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [SpaceObject] {
        &mut self.bodies
    }

    /// Number of bodies of the given kind.
    pub fn count(&self, kind: BodyKind) -> usize {
        self.bodies.iter().filter(|b| b.kind() == kind).count()
    }

    /// Resolves the orbit parent of body `index`, if both exist.
    pub fn parent_of(&self, index: usize) -> Option<&SpaceObject> {
        self.bodies.get(index)?.parent().and_then(|p| self.bodies.get(p))
    }

    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.bodies.iter().map(|b| (b.position.x, b.position.y)).collect()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(SpaceObject::kinetic_energy).sum()
    }

    /// Mass-weighted mean position; zero when the scene carries no mass.
    pub fn center_of_mass(&self) -> Vec2 {
        let total: f64 = self.bodies.iter().map(|b| b.mass).sum();
        if total <= 0.0 {
            return Vec2::zero();
        }
        let weighted = self
            .bodies
            .iter()
            .fold(Vec2::zero(), |acc, b| acc + b.position * b.mass);
        weighted / total
    }
}
