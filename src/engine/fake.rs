//! Deterministic stand-in engine for tests
//!
//! Integrates gravity and applied forces with no collisions, and records every
//! call so tests can assert on exactly what the scene asked for.

use glam::Vec2;

use super::{BodyDesc, BodyKind, BodyState, PhysicsEngine, WorldConfig};

#[derive(Debug, Clone)]
pub struct FakeBody {
    pub desc: BodyDesc,
    pub position: Vec2,
    pub angle: f32,
    pub linvel: Vec2,
    pub mass: f32,
    pub pending_force: Vec2,
}

#[derive(Debug, Default)]
pub struct FakeEngine {
    pub config: WorldConfig,
    /// `None` marks a removed slot
    pub slots: Vec<Option<FakeBody>>,
    pub forces: Vec<(usize, Vec2)>,
    pub pose_writes: usize,
    pub steps: usize,
    pub clears: usize,
}

impl FakeEngine {
    /// Override a body's mass (mass is otherwise density × area)
    pub fn set_mass(&mut self, handle: usize, mass: f32) {
        if let Some(Some(body)) = self.slots.get_mut(handle) {
            body.mass = mass;
        }
    }
}

impl PhysicsEngine for FakeEngine {
    type Handle = usize;

    fn create(config: &WorldConfig) -> Self {
        Self {
            config: *config,
            ..Default::default()
        }
    }

    fn add_body(&mut self, desc: &BodyDesc) -> usize {
        self.slots.push(Some(FakeBody {
            desc: desc.clone(),
            position: desc.position,
            angle: desc.angle,
            linvel: Vec2::ZERO,
            mass: desc.material.density * desc.shape.area(),
            pending_force: Vec2::ZERO,
        }));
        self.slots.len() - 1
    }

    fn set_pose(&mut self, handle: usize, position: Vec2, angle: f32) {
        if let Some(Some(body)) = self.slots.get_mut(handle) {
            body.position = position;
            body.angle = angle;
            self.pose_writes += 1;
        }
    }

    fn apply_force(&mut self, handle: usize, force: Vec2) {
        if let Some(Some(body)) = self.slots.get_mut(handle) {
            body.pending_force += force;
            self.forces.push((handle, force));
        }
    }

    fn step(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        let scale = self.config.force_scale;
        for body in self.slots.iter_mut().flatten() {
            if body.desc.kind == BodyKind::Dynamic {
                let accel = gravity + body.pending_force * scale / body.mass;
                body.linvel += accel * dt;
                body.position += body.linvel * dt;
            }
            body.pending_force = Vec2::ZERO;
        }
        self.steps += 1;
    }

    fn bodies(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| i))
            .collect()
    }

    fn body_state(&self, handle: usize) -> Option<BodyState> {
        let body = self.slots.get(handle)?.as_ref()?;
        Some(BodyState {
            position: body.position,
            angle: body.angle,
            linvel: body.linvel,
            angvel: 0.0,
            mass: body.mass,
            dynamic: body.desc.kind == BodyKind::Dynamic,
        })
    }

    fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.clears += 1;
    }
}
