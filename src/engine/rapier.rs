//! rapier2d backend
//!
//! Walls and fill regions become kinematic position-based bodies so that
//! moving them drags resting shapes along instead of teleporting through them.
//! Forces arrive in the scene's per-millisecond units and are scaled here.

use std::num::NonZeroUsize;

use glam::Vec2;
use rapier2d::prelude::*;

use super::{BodyDesc, BodyKind, BodyState, PhysicsEngine, Shape, WorldConfig};
use crate::consts::SIM_DT;

/// Contact solver passes per step
const SOLVER_ITERATIONS: usize = 8;
/// Substeps a fast body may take against swept contacts
const CCD_SUBSTEPS: usize = 4;
/// Penetration tolerated before correction, in pixels
const ALLOWED_LINEAR_ERROR: f32 = 0.5;
/// Contact look-ahead, in pixels
const PREDICTION_DISTANCE: f32 = 2.0;

pub struct RapierEngine {
    config: WorldConfig,
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
}

impl RapierEngine {
    fn collider_for(shape: &Shape) -> ColliderBuilder {
        match shape {
            Shape::Rectangle { width, height } => {
                ColliderBuilder::cuboid(width / 2.0, height / 2.0)
            }
            Shape::Circle { radius } => ColliderBuilder::ball(*radius),
            Shape::Polygon { vertices } => {
                let points: Vec<Point<Real>> =
                    vertices.iter().map(|v| point![v.x, v.y]).collect();
                ColliderBuilder::convex_hull(&points).unwrap_or_else(|| {
                    log::warn!(
                        "Degenerate polygon with {} vertices, using its bounding circle",
                        vertices.len()
                    );
                    ColliderBuilder::ball(shape.bounding_radius())
                })
            }
        }
    }
}

impl PhysicsEngine for RapierEngine {
    type Handle = RigidBodyHandle;

    fn create(config: &WorldConfig) -> Self {
        // Defaults are tuned for meters; the world is in pixels
        let mut params = IntegrationParameters {
            dt: SIM_DT,
            allowed_linear_error: ALLOWED_LINEAR_ERROR,
            prediction_distance: PREDICTION_DISTANCE,
            max_ccd_substeps: CCD_SUBSTEPS,
            ..Default::default()
        };
        if let Some(iterations) = NonZeroUsize::new(SOLVER_ITERATIONS) {
            params.num_solver_iterations = iterations;
        }

        Self {
            config: *config,
            gravity: vector![config.gravity.x, config.gravity.y],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
        }
    }

    fn add_body(&mut self, desc: &BodyDesc) -> RigidBodyHandle {
        let builder = match desc.kind {
            BodyKind::Dynamic => {
                // Air drag is a per-tick velocity loss; rapier damping is per second
                let damping = desc.material.air_drag / SIM_DT;
                RigidBodyBuilder::dynamic()
                    .linear_damping(damping)
                    .angular_damping(damping)
                    .ccd_enabled(true)
            }
            BodyKind::Static | BodyKind::Sensor => RigidBodyBuilder::kinematic_position_based(),
        };
        let body = builder
            .translation(vector![desc.position.x, desc.position.y])
            .rotation(desc.angle)
            .build();
        let handle = self.bodies.insert(body);

        let collider = Self::collider_for(&desc.shape)
            .restitution(desc.material.restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .friction(desc.material.friction)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .density(desc.material.density)
            .sensor(desc.kind == BodyKind::Sensor)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        handle
    }

    fn set_pose(&mut self, handle: RigidBodyHandle, position: Vec2, angle: f32) {
        let Some(body) = self.bodies.get_mut(handle) else {
            return;
        };
        let pose = Isometry::new(vector![position.x, position.y], angle);
        if body.is_kinematic() {
            body.set_next_kinematic_position(pose);
        } else {
            body.set_position(pose, true);
        }
    }

    fn apply_force(&mut self, handle: RigidBodyHandle, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let scaled = force * self.config.force_scale;
            body.add_force(vector![scaled.x, scaled.y], true);
        }
    }

    fn step(&mut self, dt: f32) {
        self.params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );

        // Forces only last one step
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
        }
    }

    fn bodies(&self) -> Vec<RigidBodyHandle> {
        self.bodies.iter().map(|(handle, _)| handle).collect()
    }

    fn body_state(&self, handle: RigidBodyHandle) -> Option<BodyState> {
        let body = self.bodies.get(handle)?;
        let t = body.translation();
        let v = body.linvel();
        Some(BodyState {
            position: Vec2::new(t.x, t.y),
            angle: body.rotation().angle(),
            linvel: Vec2::new(v.x, v.y),
            angvel: body.angvel(),
            mass: body.mass(),
            dynamic: body.is_dynamic(),
        })
    }

    fn clear(&mut self) {
        let config = self.config;
        *self = Self::create(&config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Material;

    fn ball_at(y: f32) -> BodyDesc {
        BodyDesc {
            shape: Shape::Circle { radius: 5.0 },
            position: Vec2::new(0.0, y),
            angle: 0.0,
            kind: BodyKind::Dynamic,
            material: Material::SHAPE,
        }
    }

    #[test]
    fn test_dynamic_body_falls() {
        let mut engine = RapierEngine::create(&WorldConfig::default());
        let ball = engine.add_body(&ball_at(0.0));
        for _ in 0..10 {
            engine.step(SIM_DT);
        }
        let state = engine.body_state(ball).unwrap();
        assert!(state.dynamic);
        assert!(state.position.y > 0.0, "gravity points down the screen");
    }

    #[test]
    fn test_static_body_stays_put() {
        let mut engine = RapierEngine::create(&WorldConfig::default());
        let wall = engine.add_body(&BodyDesc {
            shape: Shape::Rectangle {
                width: 100.0,
                height: 20.0,
            },
            position: Vec2::new(50.0, 50.0),
            angle: 0.0,
            kind: BodyKind::Static,
            material: Material::WALL,
        });
        for _ in 0..10 {
            engine.step(SIM_DT);
        }
        let state = engine.body_state(wall).unwrap();
        assert!(!state.dynamic);
        assert_eq!(state.position, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut engine = RapierEngine::create(&WorldConfig::default());
        let ball = engine.add_body(&ball_at(0.0));
        engine.add_body(&ball_at(20.0));
        assert_eq!(engine.bodies().len(), 2);

        engine.clear();
        assert!(engine.bodies().is_empty());
        assert!(engine.body_state(ball).is_none());
    }
}
