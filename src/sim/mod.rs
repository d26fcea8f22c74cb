//! Scene simulation
//!
//! Everything between the config and the engine:
//! - Container geometry derived from the viewport
//! - Seeded population spawning
//! - Per-tick rotation of the container
//! - Live palette application
//! - The measure/mount/run/teardown lifecycle
//!
//! Nothing here touches the DOM or the GPU directly.

pub mod geometry;
pub mod palette_sync;
pub mod rotation;
pub mod scene;
pub mod spawn;

pub use geometry::{
    ContainerGeometry, ContainerKind, ContainerSpec, Viewport, WallSegment, build_container,
};
pub use palette_sync::apply_palette;
pub use rotation::{RotationState, tangential_force, wall_pose};
pub use scene::{BodySnapshot, Scene, SceneBodies, ScenePhase, Tracked};
pub use spawn::{BodyDescriptor, PopulationMode, ShapeKind, clamp_population, spawn_population};
