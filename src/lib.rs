//! Two-dimensional star system simulation: scene text codec, a direct
//! Newtonian N-body engine, a hierarchical kinematic orbit engine and the
//! driver that ticks whichever one a scene is configured for.

pub mod body;
pub mod direct;
pub mod engine;
pub mod error;
pub mod generator;
pub mod kinematic;
pub mod scene_codec;
pub mod simulation;
pub mod viewport;

pub use body::{BodyKind, Orbit, OrbitDirection, Scene, SpaceObject, Trail, TRAIL_CAPACITY};
pub use direct::DirectGravity;
pub use engine::{build_engine, Engine};
pub use error::{EngineError, SceneError, SceneWarning};
pub use kinematic::KinematicOrbits;
pub use scene_codec::{decode, encode, LoadedScene};
pub use simulation::Simulation;
pub use viewport::Viewport;
