use serde::{Serialize, Deserialize};

/// A snapshot of the simulation state and metrics at a specific time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Physical time at which the snapshot was taken.
    pub time: f64,
    /// Number of ticks applied since the scene was loaded.
    pub step: u64,
    /// Number of bodies in the scene.
    pub body_count: u32,
    /// Sum of 0.5 * m * |v|^2 over all bodies.
    pub kinetic_energy: f64,
    /// Pairwise gravitational potential energy. Zero for the kinematic model.
    pub potential_energy: f64,
    /// Mass-weighted mean position, (0, 0) for a massless scene.
    pub center_of_mass: (f64, f64),
    /// Optional: raw [x, y] positions of all bodies at the snapshot time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<(f64, f64)>>,
}
