//! Rigid-body engine seam
//!
//! Collision detection, contact solving and integration are delegated to an
//! engine behind [`PhysicsEngine`]. The scene only creates bodies, moves the
//! container's walls, nudges dynamic bodies with forces and steps the world.

pub mod rapier;

#[cfg(test)]
pub(crate) mod fake;

pub use rapier::RapierEngine;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;

/// Collision shape in body-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle { width: f32, height: f32 },
    Circle { radius: f32 },
    /// Convex polygon, vertices centered on the body origin
    Polygon { vertices: Vec<Vec2> },
}

impl Shape {
    pub fn area(&self) -> f32 {
        match self {
            Shape::Rectangle { width, height } => width * height,
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Polygon { vertices } => {
                // Shoelace
                let n = vertices.len();
                let twice: f32 = (0..n)
                    .map(|i| vertices[i].perp_dot(vertices[(i + 1) % n]))
                    .sum();
                twice.abs() / 2.0
            }
        }
    }

    /// Radius of a circle around the origin enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Shape::Rectangle { width, height } => Vec2::new(*width, *height).length() / 2.0,
            Shape::Circle { radius } => *radius,
            Shape::Polygon { vertices } => vertices
                .iter()
                .map(|v| v.length())
                .fold(0.0, f32::max),
        }
    }
}

/// How the engine treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moved by gravity, contacts and forces
    Dynamic,
    /// Immovable by contacts; repositioned explicitly each tick
    Static,
    /// Static and non-colliding (fill regions)
    Sensor,
}

/// Surface and mass parameters
///
/// Contacts use one friction coefficient for both sliding and sticking, so
/// there is no separate static friction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
    /// Per-tick fraction of velocity lost to air
    pub air_drag: f32,
    pub density: f32,
}

impl Material {
    /// Container walls
    pub const WALL: Material = Material {
        restitution: 0.1,
        friction: 0.8,
        air_drag: 0.0,
        density: 1.0,
    };

    /// Circular container chords grip harder so bodies are dragged along
    pub const GRIPPY_WALL: Material = Material {
        friction: 1.0,
        ..Material::WALL
    };

    /// The small bouncy accent body
    pub const ACCENT: Material = Material {
        restitution: 0.75,
        friction: 0.6,
        air_drag: 0.003,
        density: 0.8,
    };

    /// Regular population shapes
    pub const SHAPE: Material = Material {
        restitution: 0.75,
        friction: 0.4,
        air_drag: 0.003,
        density: 1.2 * 1.1,
    };

    /// Non-colliding regions
    pub const SENSOR: Material = Material {
        restitution: 0.0,
        friction: 0.0,
        air_drag: 0.0,
        density: 1.0,
    };
}

/// Everything the engine needs to create a body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub shape: Shape,
    pub position: Vec2,
    pub angle: f32,
    pub kind: BodyKind,
    pub material: Material,
}

/// Snapshot of a body's simulated state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub angle: f32,
    pub linvel: Vec2,
    pub angvel: f32,
    pub mass: f32,
    pub dynamic: bool,
}

/// World-wide engine parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    /// Acceleration in pixels/s²
    pub gravity: Vec2,
    /// Forces are given in mass·px/ms²; this converts them to mass·px/s²
    pub force_scale: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, GRAVITY),
            force_scale: 1.0e6,
        }
    }
}

/// The rigid-body engine as seen by the scene
pub trait PhysicsEngine {
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Create an empty world
    fn create(config: &WorldConfig) -> Self
    where
        Self: Sized;

    fn add_body(&mut self, desc: &BodyDesc) -> Self::Handle;

    /// Teleport a body to an absolute position and orientation
    fn set_pose(&mut self, handle: Self::Handle, position: Vec2, angle: f32);

    /// Apply a force at the body's center for the next step only
    fn apply_force(&mut self, handle: Self::Handle, force: Vec2);

    /// Advance the world by `dt` seconds
    fn step(&mut self, dt: f32);

    /// All bodies currently in the world
    fn bodies(&self) -> Vec<Self::Handle>;

    fn body_state(&self, handle: Self::Handle) -> Option<BodyState>;

    /// Remove every body
    fn clear(&mut self);
}
