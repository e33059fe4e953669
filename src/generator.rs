use crate::scene_codec::{decode, LoadedScene};
use anyhow::Result;
use log::info;
use orbit_common::GeneratorConfig;
use rand::distr::Uniform;
use rand::prelude::*;
use rand_distr::Normal;
use std::fmt::Write as _;

const PLANET_COLORS: [&str; 6] = ["green", "blue", "red", "orange", "cyan", "white"];

/// Synthesizes scene text for one star with planets on circular orbits.
///
/// Orbit radii and phases are uniform, masses are log-uniform between the
/// configured bounds. Every planet carries an explicit orbit index so the
/// kinematic model alternates directions; some also get a moon marker.
pub fn generate_scene_text(config: &GeneratorConfig, gravitational_constant: f64) -> Result<String> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let orbit_dist = Uniform::new_inclusive(config.min_orbit, config.max_orbit)?;
    let phase_dist = Uniform::new(0.0f64, std::f64::consts::TAU)?;
    let log_mass_dist = Uniform::new_inclusive(config.planet_mass_min.ln(), config.planet_mass_max.ln())?;
    let size_dist = Normal::new(5.0f64, 1.0)
        .map_err(|e| anyhow::anyhow!("Invalid planet size distribution: {}", e))?;

    let mut text = String::new();
    writeln!(text, "# generated, seed {}", config.seed)?;
    writeln!(text, "Star {} yellow {} 0 0 0 0", config.star_radius, config.star_mass)?;

    for i in 0..config.planet_count {
        let r = rng.sample(&orbit_dist);
        let phase = rng.sample(&phase_dist);
        let mass = rng.sample(&log_mass_dist).exp();
        let size = rng.sample(&size_dist).clamp(3.0, 8.0);
        // Circular speed, tangential to the radius vector
        let v = (gravitational_constant * config.star_mass / r).sqrt();
        let (sin, cos) = phase.sin_cos();
        let color = PLANET_COLORS[i as usize % PLANET_COLORS.len()];
        write!(
            text,
            "Planet {} {} {} {} {} {} {} {}",
            size,
            color,
            mass,
            r * cos,
            r * sin,
            -v * sin,
            v * cos,
            i + 1
        )?;
        if rng.random_bool(config.moon_fraction) {
            text.push_str(" moon");
        }
        text.push('\n');
    }

    Ok(text)
}

/// Generates a scene and decodes it through the regular scene codec.
pub fn generate_scene(config: &GeneratorConfig, gravitational_constant: f64) -> Result<LoadedScene> {
    let text = generate_scene_text(config, gravitational_constant)?;
    let loaded = decode(&text).map_err(|e| anyhow::anyhow!("Generated scene is invalid: {}", e))?;
    info!(
        "Generated scene with {} bodies (seed {})",
        loaded.scene.len(),
        config.seed
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use orbit_common::GRAVITATIONAL_CONSTANT;

    fn config(moon_fraction: f64) -> GeneratorConfig {
        GeneratorConfig {
            seed: 42,
            star_mass: 1.989e30,
            star_radius: 10.0,
            planet_count: 8,
            min_orbit: 5e10,
            max_orbit: 5e11,
            planet_mass_min: 1e22,
            planet_mass_max: 1e27,
            moon_fraction,
        }
    }

    #[test]
    fn same_seed_same_scene() {
        let a = generate_scene_text(&config(0.5), GRAVITATIONAL_CONSTANT).unwrap();
        let b = generate_scene_text(&config(0.5), GRAVITATIONAL_CONSTANT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn planets_start_on_circular_orbits() {
        let cfg = config(0.0);
        let scene = generate_scene(&cfg, GRAVITATIONAL_CONSTANT).unwrap().scene;
        assert_eq!(scene.count(BodyKind::Star), 1);
        assert_eq!(scene.count(BodyKind::Planet), 8);
        for body in scene.iter().filter(|b| b.kind() == BodyKind::Planet) {
            let r = body.position.length();
            assert!(r >= cfg.min_orbit * 0.999 && r <= cfg.max_orbit * 1.001);
            assert!(body.mass >= cfg.planet_mass_min * 0.999 && body.mass <= cfg.planet_mass_max * 1.001);
            let v_circ = (GRAVITATIONAL_CONSTANT * cfg.star_mass / r).sqrt();
            assert!((body.velocity.length() - v_circ).abs() < 1e-6 * v_circ);
            // Velocity is perpendicular to the radius vector
            let radial = body.position.x * body.velocity.x + body.position.y * body.velocity.y;
            assert!(radial.abs() < 1e-6 * r * v_circ);
        }
    }

    #[test]
    fn moon_fraction_one_gives_every_planet_a_moon() {
        let scene = generate_scene(&config(1.0), GRAVITATIONAL_CONSTANT).unwrap().scene;
        assert_eq!(scene.count(BodyKind::Satellite), 8);
    }
}
