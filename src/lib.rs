//! Sharp Objects - a rotating container full of falling shapes
//!
//! Core modules:
//! - `sim`: Container geometry, spawning, rotation and the scene lifecycle
//! - `engine`: Rigid-body engine seam and the rapier backend
//! - `renderer`: Frame extraction and the WebGPU pipeline
//! - `palette`: Color palettes applied live to a running scene
//! - `settings`: Structural and live configuration

pub mod engine;
pub mod error;
pub mod palette;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ColorError, ConfigError, GeometryError, RenderError};
pub use palette::{Color, Palette, PaletteId};
pub use settings::{LiveConfig, LiveConfigPatch, SceneConfig, SpeedLevel, StructuralConfig};

use glam::Vec2;

/// Scene configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one rotation tick per step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Delay before the first viewport measurement (seconds)
    pub const SETTLE_DELAY: f32 = 0.05;

    /// Downward gravity in pixels/s²
    pub const GRAVITY: f32 = 1000.0;

    /// Container size as a fraction of the smaller viewport side
    pub const SQUARE_SIZE_FRACTION: f32 = 0.6;
    /// Hexagon/circle containers lose apparent area, so they get more room
    pub const ROUND_SIZE_FRACTION: f32 = 0.75;
    /// Minimum wall thickness in pixels
    pub const MIN_WALL_THICKNESS: f32 = 20.0;
    /// Wall thickness as a fraction of container size
    pub const WALL_THICKNESS_FRACTION: f32 = 0.05;
    /// Extra visual weight for polygon walls
    pub const POLYGON_WALL_WEIGHT: f32 = 1.5;
    /// Triangles have little room, so their population is drawn smaller
    pub const TRIANGLE_SHAPE_SCALE: f32 = 0.5;
    /// Chord count approximating a circular container
    pub const CIRCLE_SEGMENTS: usize = 90;

    /// Population clamp
    pub const MIN_POPULATION: usize = 3;
    pub const MAX_POPULATION: usize = 10;

    /// Tangential drag factor for circular containers
    pub const TANGENTIAL_FORCE_FACTOR: f32 = 0.008;
    /// Floor for the radius in the tangential direction
    pub const TANGENT_EPSILON: f32 = 1.0e-4;
}

/// Rotate an offset vector by `angle` radians about the origin
#[inline]
pub fn rotate_offset(offset: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(offset.x * cos - offset.y * sin, offset.x * sin + offset.y * cos)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Vertices of a regular polygon centered on the origin, first vertex at the top
pub fn regular_polygon(sides: usize, circumradius: f32) -> Vec<Vec2> {
    use std::f32::consts::{FRAC_PI_2, TAU};
    (0..sides)
        .map(|i| polar_to_cartesian(circumradius, -FRAC_PI_2 + i as f32 * TAU / sides as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_offset_quarter_turn() {
        let rotated = rotate_offset(Vec2::new(1.0, 0.0), FRAC_PI_2);
        assert!(rotated.x.abs() < 1e-6);
        assert!((rotated.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_regular_polygon_starts_at_top() {
        let verts = regular_polygon(6, 10.0);
        assert_eq!(verts.len(), 6);
        assert!(verts[0].x.abs() < 1e-5);
        assert!((verts[0].y + 10.0).abs() < 1e-5);
        for v in &verts {
            assert!((v.length() - 10.0).abs() < 1e-4);
        }
    }
}
