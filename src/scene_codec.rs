//! Line-oriented scene text format.
//!
//! ```text
//! Star   <radius> <color> <mass> <x> <y> <vx> <vy>
//! Planet <radius> <color> <mass> <x> <y> <vx> <vy> [orbit_index] [moon]
//! ```
//!
//! Blank lines and `#` comments are ignored. Every planet is attached to the
//! nearest preceding star, which is where its kinematic orbit is derived from.

use crate::body::{BodyKind, Orbit, OrbitDirection, Scene, SpaceObject};
use crate::error::{SceneError, SceneWarning};
use anyhow::Result;
use log::{debug, warn};
use orbit_common::{angle_to_vec, vec_to_angle, wrap_angle, Vec2};
use std::f64::consts::FRAC_PI_4;
use std::path::Path;

const BASE_FIELDS: usize = 8;
const MAX_PLANET_FIELDS: usize = 10;

/// Satellite orbit radius as a fraction of its planet's orbit radius.
const MOON_ORBIT_FRACTION: f64 = 0.2;
/// Satellites circle twice as fast as their planet.
const MOON_SPEED_FACTOR: f64 = 2.0;

/// Result of a successful decode.
#[derive(Debug, Clone, Default)]
pub struct LoadedScene {
    pub scene: Scene,
    pub warnings: Vec<SceneWarning>,
}

/// Decodes scene text. Unknown keywords are skipped with a warning; any
/// malformed `Star`/`Planet` line aborts the whole load.
pub fn decode(text: &str) -> Result<LoadedScene, SceneError> {
    let mut scene = Scene::new();
    let mut warnings = Vec::new();
    let mut current_star: Option<usize> = None;
    // Planets attached to the current star so far
    let mut attached: u64 = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let kind = match BodyKind::from_keyword(tokens[0]) {
            Some(kind) => kind,
            None => {
                let warning = SceneWarning::UnknownKind { line: line_no, keyword: tokens[0].to_string() };
                warn!("{}", warning);
                warnings.push(warning);
                continue;
            }
        };

        check_field_count(line_no, kind, tokens.len())?;
        let mut body = parse_body(line_no, kind, &tokens)?;

        match kind {
            BodyKind::Star => {
                current_star = Some(scene.push(body));
                attached = 0;
            }
            // Planet; satellites have no keyword of their own
            _ => {
                let Some(star_idx) = current_star else {
                    debug!("line {}: planet has no preceding star, no orbit derived", line_no);
                    scene.push(body);
                    continue;
                };
                let star_pos = scene.get(star_idx).map(|s| s.position).unwrap_or_default();
                let index = tokens.get(BASE_FIELDS).and_then(|t| orbit_index_digit(t)).unwrap_or(attached);
                let orbit = derive_orbit(line_no, star_idx, star_pos, &body, OrbitDirection::from_index(index))?;
                body.orbit = Some(orbit);
                let planet_pos = body.position;
                let planet_idx = scene.push(body);
                attached += 1;

                let has_moon = tokens
                    .get(BASE_FIELDS + 1)
                    .is_some_and(|t| t.to_lowercase().contains("moon"));
                if has_moon {
                    scene.push(synthesize_moon(planet_idx, planet_pos, &orbit));
                }
            }
        }
    }

    debug!(
        "Decoded scene: {} stars, {} planets, {} satellites, {} warnings",
        scene.count(BodyKind::Star),
        scene.count(BodyKind::Planet),
        scene.count(BodyKind::Satellite),
        warnings.len()
    );
    Ok(LoadedScene { scene, warnings })
}

/// Encodes every body in scene order. Orbit parameters are never written;
/// they are derived again on the next decode.
pub fn encode(scene: &Scene) -> String {
    let mut out = String::new();
    for body in scene.iter() {
        out.push_str(&format!(
            "{} {} {} {} {} {} {} {}\n",
            body.kind().keyword(),
            body.radius,
            color_token(body),
            body.mass,
            body.position.x,
            body.position.y,
            body.velocity.x,
            body.velocity.y
        ));
    }
    out
}

/// The color as a single field: inner whitespace becomes `_`, an empty
/// color falls back to the kind's default.
fn color_token(body: &SpaceObject) -> String {
    let color = body.color.trim();
    if color.is_empty() {
        return body.kind().default_color().to_string();
    }
    color.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Reads and decodes a scene file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadedScene> {
    let path_ref = path.as_ref();
    let text = std::fs::read_to_string(path_ref)
        .map_err(|e| anyhow::anyhow!("Failed to read scene file '{}': {}", path_ref.display(), e))?;
    decode(&text).map_err(|e| anyhow::anyhow!("Failed to load scene '{}': {}", path_ref.display(), e))
}

/// Writes the encoded scene to `path`, replacing any existing file.
pub fn save_file<P: AsRef<Path>>(path: P, scene: &Scene) -> Result<()> {
    let path_ref = path.as_ref();
    std::fs::write(path_ref, encode(scene))
        .map_err(|e| anyhow::anyhow!("Failed to write scene file '{}': {}", path_ref.display(), e))
}

fn check_field_count(line: usize, kind: BodyKind, got: usize) -> Result<(), SceneError> {
    let expected = match kind {
        BodyKind::Planet if got > MAX_PLANET_FIELDS => MAX_PLANET_FIELDS,
        BodyKind::Planet if got >= BASE_FIELDS => return Ok(()),
        _ if got == BASE_FIELDS => return Ok(()),
        _ => BASE_FIELDS,
    };
    Err(SceneError::FieldCount { line, kind: kind.keyword(), expected, got })
}

fn parse_body(line: usize, kind: BodyKind, tokens: &[&str]) -> Result<SpaceObject, SceneError> {
    let mut body = SpaceObject::new(kind);
    body.radius = parse_number(line, "radius", tokens[1])?;
    body.color = tokens[2].to_string();
    body.mass = parse_number(line, "mass", tokens[3])?;
    body.position = Vec2::new(parse_number(line, "x", tokens[4])?, parse_number(line, "y", tokens[5])?);
    body.velocity = Vec2::new(parse_number(line, "vx", tokens[6])?, parse_number(line, "vy", tokens[7])?);

    if body.mass <= 0.0 {
        return Err(SceneError::NonPositiveMass { line, mass: body.mass });
    }
    Ok(body)
}

fn parse_number(line: usize, field: &'static str, token: &str) -> Result<f64, SceneError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SceneError::InvalidNumber { line, field, token: token.to_string() }),
    }
}

/// Last digit of tokens such as `3`, `star1` or `planet12`. Only the
/// parity of an orbit index is used, so indices of any length are accepted.
fn orbit_index_digit(token: &str) -> Option<u64> {
    token.chars().rev().find_map(|c| c.to_digit(10)).map(u64::from)
}

fn derive_orbit(
    line: usize,
    parent: usize,
    parent_pos: Vec2,
    body: &SpaceObject,
    direction: OrbitDirection,
) -> Result<Orbit, SceneError> {
    let offset = body.position - parent_pos;
    let radius = body.position.distance(parent_pos);
    if radius == 0.0 {
        return Err(SceneError::DegenerateOrbit { line });
    }
    Ok(Orbit {
        parent,
        radius,
        angle: wrap_angle(vec_to_angle(offset)),
        angular_speed: body.velocity.length() / radius,
        direction,
    })
}

fn synthesize_moon(planet_idx: usize, planet_pos: Vec2, planet_orbit: &Orbit) -> SpaceObject {
    let orbit = Orbit {
        parent: planet_idx,
        radius: planet_orbit.radius * MOON_ORBIT_FRACTION,
        angle: wrap_angle(planet_orbit.angle + FRAC_PI_4),
        angular_speed: planet_orbit.angular_speed * MOON_SPEED_FACTOR,
        direction: planet_orbit.direction,
    };
    let mut moon = SpaceObject::new(BodyKind::Satellite);
    moon.position = planet_pos + angle_to_vec(orbit.angle) * orbit.radius;
    moon.orbit = Some(orbit);
    moon
}
