//! Container rotation
//!
//! Walls are static bodies repositioned every tick. Poses are always derived
//! from the immutable build-time offsets and the accumulated angle, never from
//! the previous pose, so repeated ticks cannot drift the assembly apart.

use glam::Vec2;

use super::geometry::{ContainerGeometry, WallSegment};
use super::scene::SceneBodies;
use crate::consts::{TANGENT_EPSILON, TANGENTIAL_FORCE_FACTOR};
use crate::engine::PhysicsEngine;
use crate::rotate_offset;
use crate::settings::LiveConfig;

/// Rotation kinematics, mutated once per tick while running
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    /// Accumulated angle in radians (unbounded)
    pub angle: f32,
    pub running: bool,
    pub reversed: bool,
    pub speed_deg_per_tick: f32,
}

impl RotationState {
    pub fn from_live(live: &LiveConfig) -> Self {
        Self {
            angle: 0.0,
            running: live.running,
            reversed: live.reversed,
            speed_deg_per_tick: live.rotation_speed,
        }
    }

    /// Copy the live controls, keeping the accumulated angle
    pub fn sync(&mut self, live: &LiveConfig) {
        self.running = live.running;
        self.reversed = live.reversed;
        self.speed_deg_per_tick = live.rotation_speed;
    }

    #[inline]
    pub fn direction(&self) -> f32 {
        if self.reversed { -1.0 } else { 1.0 }
    }

    /// Angle increment per tick in radians
    #[inline]
    pub fn step(&self) -> f32 {
        self.speed_deg_per_tick.to_radians()
    }

    /// Advance the angle by one tick; false (and unchanged) while paused
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.angle += self.direction() * self.step();
        true
    }
}

/// Absolute pose of `wall` for a container rotated by `angle`
#[inline]
pub fn wall_pose(center: Vec2, wall: &WallSegment, angle: f32) -> (Vec2, f32) {
    (center + rotate_offset(wall.offset, angle), wall.base_angle + angle)
}

/// Force dragging a body along a spinning circular boundary
///
/// Perpendicular to the body's offset from `center`, magnitude
/// `mass * speed * 0.008`. A body exactly at the center gets no push.
pub fn tangential_force(
    center: Vec2,
    position: Vec2,
    mass: f32,
    speed: f32,
    reversed: bool,
) -> Vec2 {
    let d = position - center;
    let len = d.length().max(TANGENT_EPSILON);
    let direction = if reversed { -1.0 } else { 1.0 };
    let magnitude = mass * speed * TANGENTIAL_FORCE_FACTOR * direction;
    Vec2::new(-d.y, d.x) / len * magnitude
}

/// Per-tick rotation hook; returns false when paused
pub fn tick<E: PhysicsEngine>(
    state: &mut RotationState,
    geometry: &ContainerGeometry,
    bodies: &SceneBodies<E::Handle>,
    engine: &mut E,
) -> bool {
    if !state.advance() {
        return false;
    }

    let center = geometry.spec.center;
    engine.set_pose(bodies.background.handle, center, state.angle);

    for (wall, tracked) in geometry.walls.iter().zip(&bodies.walls) {
        let (position, angle) = wall_pose(center, wall, state.angle);
        engine.set_pose(tracked.handle, position, angle);
    }

    if geometry.spec.kind.is_curved() {
        for handle in engine.bodies() {
            let Some(body) = engine.body_state(handle) else {
                continue;
            };
            if !body.dynamic {
                continue;
            }
            let force = tangential_force(
                center,
                body.position,
                body.mass,
                state.speed_deg_per_tick,
                state.reversed,
            );
            engine.apply_force(handle, force);
        }
    }

    true
}
