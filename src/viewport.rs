use crate::body::Scene;
use orbit_common::Vec2;

/// Fraction of the shorter screen side the widest orbit should span.
const FILL_FRACTION: f64 = 0.4;

/// Maps world coordinates onto a screen with the origin at its center and
/// y pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Pixels per world unit.
    pub scale_factor: f64,
}

impl Viewport {
    /// Picks a scale so the scene's widest orbit (or, without orbits, its
    /// farthest coordinate) fills 40% of the shorter screen side.
    pub fn fit(scene: &Scene, width: u32, height: u32) -> Self {
        let max_orbit = scene
            .iter()
            .filter_map(|b| b.orbit.map(|o| o.radius))
            .fold(0.0f64, f64::max);
        let extent = if max_orbit > 0.0 {
            max_orbit
        } else {
            scene
                .iter()
                .map(|b| b.position.x.abs().max(b.position.y.abs()))
                .fold(0.0f64, f64::max)
        };
        let extent = if extent > 0.0 { extent } else { 1.0 };

        Viewport {
            width,
            height,
            scale_factor: FILL_FRACTION * f64::from(width.min(height)) / extent,
        }
    }

    fn center(&self) -> (i64, i64) {
        (i64::from(self.width / 2), i64::from(self.height / 2))
    }

    /// Pixel coordinates of a world position.
    pub fn to_screen(&self, p: Vec2) -> (i64, i64) {
        let (cx, cy) = self.center();
        (cx + (p.x * self.scale_factor) as i64, cy - (p.y * self.scale_factor) as i64)
    }

    /// True if a disc of `radius` pixels at `p` overlaps the screen.
    pub fn is_visible(&self, p: Vec2, radius: f64) -> bool {
        let (x, y) = self.to_screen(p);
        let (x, y) = (x as f64, y as f64);
        x + radius >= 0.0
            && x - radius <= f64::from(self.width)
            && y + radius >= 0.0
            && y - radius <= f64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyKind, SpaceObject};
    use crate::scene_codec::decode;

    #[test]
    fn fits_widest_orbit() {
        let scene = decode("Star 10 red 1 0 0 0 0\nPlanet 5 green 1 100 0 0 1\nPlanet 5 green 1 0 300 1 0\n")
            .unwrap()
            .scene;
        let vp = Viewport::fit(&scene, 1200, 900);
        assert!((vp.scale_factor - 1.2).abs() < 1e-12);
        assert_eq!(vp.to_screen(Vec2::new(0.0, 0.0)), (600, 450));
        assert_eq!(vp.to_screen(Vec2::new(100.0, 100.0)), (720, 330));
    }

    #[test]
    fn falls_back_to_coordinates_without_orbits() {
        let mut scene = Scene::new();
        scene.push(SpaceObject::with_state(BodyKind::Star, 1.0, Vec2::new(-50.0, 20.0), Vec2::zero()));
        let vp = Viewport::fit(&scene, 100, 100);
        assert!((vp.scale_factor - 0.8).abs() < 1e-12);

        let empty = Viewport::fit(&Scene::new(), 100, 100);
        assert!((empty.scale_factor - 40.0).abs() < 1e-12);
    }

    #[test]
    fn visibility_accounts_for_radius() {
        let vp = Viewport { width: 100, height: 100, scale_factor: 1.0 };
        assert!(vp.is_visible(Vec2::new(0.0, 0.0), 1.0));
        assert!(!vp.is_visible(Vec2::new(60.0, 0.0), 5.0));
        assert!(vp.is_visible(Vec2::new(53.0, 0.0), 5.0));
    }
}
