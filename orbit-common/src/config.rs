use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::sim_params::SimParams;
use std::path::{Path, PathBuf};

/// Newton's gravitational constant in SI units.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67408e-11;

// Configuration for timing, all values in physical-time units
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub dt: f64,
    pub total_time: f64,
    pub record_interval: f64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineModel {
    /// Pairwise Newtonian gravity integrated with semi-implicit Euler.
    Direct,
    /// Circular orbits around a parent body, no force evaluation.
    Kinematic,
}

// Engine selection and force-law parameters
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EngineConfig {
    pub model: EngineModel,
    #[serde(default = "default_gravitational_constant")]
    pub gravitational_constant: f64,
    // Softening length added in quadrature to r in the force denominator
    #[serde(default)]
    pub softening: f64,
    #[serde(default)]
    pub parallel_forces: bool,
}

// Parameters for synthesizing a star system instead of reading a file
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub star_mass: f64,
    #[serde(default = "default_star_radius")]
    pub star_radius: f64,
    pub planet_count: u32,
    pub min_orbit: f64,
    pub max_orbit: f64,
    pub planet_mass_min: f64,
    pub planet_mass_max: f64,
    #[serde(default)]
    pub moon_fraction: f64,
}

// Where the initial scene comes from
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SceneConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub generate: Option<GeneratorConfig>,
}

// Configuration for output settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_positions: bool,
    pub save_stats: bool,
    #[serde(default)]
    pub save_scene: bool,
    #[serde(default)]
    pub save_positions_in_snapshot: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
    #[serde(default)]
    pub record_trails: bool,
}

// Screen size used to project world positions for a renderer
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub timing: TimingConfig,
    pub engine: EngineConfig,
    pub scene: SceneConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub viewport: Option<ViewportConfig>,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;

        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.timing.dt.is_finite() && self.timing.dt > 0.0) {
            anyhow::bail!("timing.dt must be positive and finite.");
        }
        if !(self.timing.total_time.is_finite() && self.timing.total_time >= 0.0) {
            anyhow::bail!("timing.total_time must be non-negative.");
        }
        if !(self.engine.gravitational_constant.is_finite() && self.engine.gravitational_constant > 0.0) {
            anyhow::bail!("engine.gravitational_constant must be positive.");
        }
        if !(self.engine.softening.is_finite() && self.engine.softening >= 0.0) {
            anyhow::bail!("engine.softening must be non-negative.");
        }
        match (&self.scene.path, &self.scene.generate) {
            (Some(_), Some(_)) => anyhow::bail!("scene.path and scene.generate are mutually exclusive."),
            (None, None) => anyhow::bail!("Either scene.path or scene.generate must be set."),
            (None, Some(generate)) => generate.validate()?,
            (Some(_), None) => {}
        }
        if let Some(vp) = &self.viewport {
            if vp.width == 0 || vp.height == 0 {
                anyhow::bail!("viewport dimensions must be non-zero.");
            }
        }
        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let dt = self.timing.dt;
        let total_steps = (self.timing.total_time / dt).ceil() as u64;
        // Never record less often than every step
        let record_interval_steps = (self.timing.record_interval.max(0.0) / dt).round().max(1.0) as u64;
        let softening = self.engine.softening;

        SimParams {
            dt,
            total_steps,
            record_interval_steps,
            model: self.engine.model,
            gravitational_constant: self.engine.gravitational_constant,
            softening,
            softening_sq: softening * softening,
            parallel_forces: self.engine.parallel_forces,
            record_trails: self.output.record_trails,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<()> {
        if self.star_mass <= 0.0 {
            anyhow::bail!("generate.star_mass must be positive.");
        }
        if !(self.min_orbit > 0.0 && self.min_orbit <= self.max_orbit) {
            anyhow::bail!("generate orbit range must satisfy 0 < min_orbit <= max_orbit.");
        }
        if !(self.planet_mass_min > 0.0 && self.planet_mass_min <= self.planet_mass_max) {
            anyhow::bail!("generate mass range must satisfy 0 < planet_mass_min <= planet_mass_max.");
        }
        if !(0.0..=1.0).contains(&self.moon_fraction) {
            anyhow::bail!("generate.moon_fraction must lie in [0, 1].");
        }
        Ok(())
    }
}

fn default_gravitational_constant() -> f64 {
    GRAVITATIONAL_CONSTANT
}

fn default_star_radius() -> f64 {
    10.0
}
