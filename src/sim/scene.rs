//! Scene lifecycle
//!
//! Owns the engine world, the display surface and the tracked bodies, and
//! drives them through measure -> mount -> run -> teardown. Structural config
//! changes tear the whole scene down and mount a fresh one; live config
//! changes are applied in place.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::{ContainerGeometry, build_container};
use super::palette_sync::apply_palette;
use super::rotation::{self, RotationState};
use super::spawn::{BodyDescriptor, spawn_population};
use crate::consts::{MAX_SUBSTEPS, SETTLE_DELAY, SIM_DT};
use crate::engine::{BodyDesc, BodyKind, BodyState, Material, PhysicsEngine, Shape, WorldConfig};
use crate::palette::{Color, Palette};
use crate::renderer::{DisplaySurface, build_frame};
use crate::settings::{LiveConfig, LiveConfigPatch, SceneConfig, StructuralConfig};

/// Largest frame delta fed into the fixed-step accumulator (seconds)
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenePhase {
    /// Created, never started
    Uninitialized,
    /// Waiting for layout to settle and the surface to report a size
    Measuring,
    Running,
    /// Stopped; only `start` or a config change brings it back
    TornDown,
}

/// An engine body plus what it takes to draw it
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<H> {
    pub handle: H,
    pub shape: Shape,
    pub fill: Color,
}

/// Every body the scene created, grouped by role
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBodies<H> {
    /// Canvas clear color
    pub canvas_fill: Color,
    /// Non-colliding fill region inside the walls
    pub background: Tracked<H>,
    pub walls: Vec<Tracked<H>>,
    /// Accent first, then the population in spawn order
    pub dynamic: Vec<Tracked<H>>,
}

impl<H: Copy> SceneBodies<H> {
    /// Create all bodies for one mount, in draw order
    pub fn populate<E>(
        engine: &mut E,
        geometry: &ContainerGeometry,
        population: &[BodyDescriptor],
        palette: &Palette,
    ) -> Self
    where
        E: PhysicsEngine<Handle = H>,
    {
        let center = geometry.spec.center;

        let background = Tracked {
            handle: engine.add_body(&BodyDesc {
                shape: geometry.background.clone(),
                position: center,
                angle: 0.0,
                kind: BodyKind::Sensor,
                material: Material::SENSOR,
            }),
            shape: geometry.background.clone(),
            fill: palette.container,
        };

        let walls = geometry
            .walls
            .iter()
            .map(|wall| {
                let (position, angle) = rotation::wall_pose(center, wall, 0.0);
                Tracked {
                    handle: engine.add_body(&BodyDesc {
                        // Backed by half the container so nothing is pushed through
                        shape: wall.collider_shape(geometry.spec.half()),
                        position,
                        angle,
                        kind: BodyKind::Static,
                        material: wall.material,
                    }),
                    shape: wall.shape(),
                    fill: palette.background,
                }
            })
            .collect();

        let dynamic = population
            .iter()
            .map(|body| Tracked {
                handle: engine.add_body(&body.body_desc()),
                shape: body.shape.clone(),
                fill: body.fill,
            })
            .collect();

        Self {
            canvas_fill: palette.background,
            background,
            walls,
            dynamic,
        }
    }
}

/// Physical state of one dynamic body plus its fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub state: BodyState,
    pub fill: Color,
}

/// Resources that exist only between mount and teardown
struct Mounted<E: PhysicsEngine> {
    engine: E,
    geometry: ContainerGeometry,
    bodies: SceneBodies<E::Handle>,
    rotation: RotationState,
    accumulator: f32,
    ticks: u64,
}

pub struct Scene<E: PhysicsEngine, S: DisplaySurface> {
    phase: ScenePhase,
    structural: StructuralConfig,
    live: LiveConfig,
    palette: Palette,
    world: WorldConfig,
    surface: S,
    settle_remaining: f32,
    /// Draws a fresh population seed for each mount
    seeds: Pcg32,
    mounted: Option<Mounted<E>>,
    mounts: u64,
}

impl<E: PhysicsEngine, S: DisplaySurface> Scene<E, S> {
    pub fn new(config: &SceneConfig, surface: S, seed: u64) -> Self {
        Self {
            phase: ScenePhase::Uninitialized,
            structural: config.structural,
            live: config.live,
            palette: config.live.palette.palette(),
            world: WorldConfig::default(),
            surface,
            settle_remaining: 0.0,
            seeds: Pcg32::seed_from_u64(seed),
            mounted: None,
            mounts: 0,
        }
    }

    pub fn with_world(mut self, world: WorldConfig) -> Self {
        self.world = world;
        self
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn structural(&self) -> &StructuralConfig {
        &self.structural
    }

    pub fn live(&self) -> &LiveConfig {
        &self.live
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// How many times a scene has been mounted since creation
    pub fn mounts(&self) -> u64 {
        self.mounts
    }

    pub fn engine(&self) -> Option<&E> {
        self.mounted.as_ref().map(|m| &m.engine)
    }

    pub fn geometry(&self) -> Option<&ContainerGeometry> {
        self.mounted.as_ref().map(|m| &m.geometry)
    }

    pub fn bodies(&self) -> Option<&SceneBodies<E::Handle>> {
        self.mounted.as_ref().map(|m| &m.bodies)
    }

    pub fn rotation(&self) -> Option<&RotationState> {
        self.mounted.as_ref().map(|m| &m.rotation)
    }

    /// Ticks simulated since the current mount
    pub fn ticks(&self) -> u64 {
        self.mounted.as_ref().map_or(0, |m| m.ticks)
    }

    /// Dynamic bodies in registry order (accent first)
    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        let Some(mounted) = &self.mounted else {
            return Vec::new();
        };
        mounted
            .bodies
            .dynamic
            .iter()
            .filter_map(|body| {
                let state = mounted.engine.body_state(body.handle)?;
                Some(BodySnapshot {
                    state,
                    fill: body.fill,
                })
            })
            .collect()
    }

    /// Begin measuring; no-op if already measuring or running
    pub fn start(&mut self) {
        match self.phase {
            ScenePhase::Uninitialized | ScenePhase::TornDown => self.begin_measuring(),
            ScenePhase::Measuring | ScenePhase::Running => {}
        }
    }

    /// Advance by `dt` seconds of wall-clock time and present one frame
    ///
    /// Non-finite deltas count as zero.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt } else { 0.0 };
        match self.phase {
            ScenePhase::Measuring => {
                self.settle_remaining -= dt;
                if self.settle_remaining > 0.0 {
                    return;
                }
                self.try_mount();
            }
            ScenePhase::Running => {
                let substeps = match &mut self.mounted {
                    Some(mounted) => {
                        mounted.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
                        let mut n = 0;
                        while mounted.accumulator >= SIM_DT && n < MAX_SUBSTEPS {
                            mounted.accumulator -= SIM_DT;
                            n += 1;
                        }
                        if n == MAX_SUBSTEPS {
                            mounted.accumulator = 0.0;
                        }
                        n
                    }
                    None => 0,
                };
                for _ in 0..substeps {
                    self.tick();
                }
                self.render();
            }
            ScenePhase::Uninitialized | ScenePhase::TornDown => {}
        }
    }

    /// One fixed step: engine first, then the rotation hook
    ///
    /// Returns false when no scene is mounted.
    pub fn tick(&mut self) -> bool {
        if self.phase != ScenePhase::Running {
            return false;
        }
        let Some(mounted) = &mut self.mounted else {
            return false;
        };
        mounted.engine.step(SIM_DT);
        rotation::tick(
            &mut mounted.rotation,
            &mounted.geometry,
            &mounted.bodies,
            &mut mounted.engine,
        );
        mounted.ticks += 1;
        true
    }

    /// Draw the current state; presentation failures are logged, not fatal
    pub fn render(&mut self) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        let frame = build_frame(&mounted.bodies, &mounted.engine);
        if let Err(e) = self.surface.present(&frame) {
            log::warn!("Frame dropped: {}", e);
        }
    }

    /// Apply speed, direction, running and palette changes in place
    pub fn apply_live_config(&mut self, patch: LiveConfigPatch) {
        let palette_changed = patch.apply_to(&mut self.live);
        if palette_changed {
            self.palette = self.live.palette.palette();
            log::info!("Palette: {}", self.palette.name);
        }

        if let Some(mounted) = &mut self.mounted {
            mounted.rotation.sync(&self.live);
            if palette_changed {
                apply_palette(&mut mounted.bodies, &self.palette);
            }
        }
    }

    /// Replace the structural config; rebuilds only if it actually changed
    pub fn rebuild(&mut self, structural: StructuralConfig) -> bool {
        if structural == self.structural {
            return false;
        }
        self.structural = structural;
        self.remount();
        true
    }

    /// Rebuild with the same parameters and a fresh population
    pub fn reset(&mut self) {
        self.structural.reset_token = self.structural.reset_token.wrapping_add(1);
        self.remount();
    }

    /// The host resized; geometry depends on the viewport, so rebuild
    pub fn notify_resize(&mut self) {
        if self.phase == ScenePhase::Running {
            self.remount();
        }
    }

    /// Tear everything down; safe to call repeatedly
    pub fn stop(&mut self) {
        self.teardown();
        self.phase = ScenePhase::TornDown;
    }

    fn begin_measuring(&mut self) {
        self.phase = ScenePhase::Measuring;
        self.settle_remaining = SETTLE_DELAY;
    }

    fn remount(&mut self) {
        let active = matches!(self.phase, ScenePhase::Measuring | ScenePhase::Running);
        self.teardown();
        if active {
            self.begin_measuring();
        }
    }

    fn try_mount(&mut self) {
        let Some(viewport) = self.surface.measure() else {
            log::debug!("Surface has no size yet, retrying");
            return;
        };
        let geometry = match build_container(self.structural.container, &viewport) {
            Ok(geometry) => geometry,
            Err(e) => {
                log::debug!("{}, retrying", e);
                return;
            }
        };

        let seed = self.seeds.next_u64();
        let mut rng = Pcg32::seed_from_u64(seed);
        let population = spawn_population(
            &geometry.spec,
            self.structural.population,
            self.structural.mode,
            &self.palette,
            &mut rng,
        );

        let mut engine = E::create(&self.world);
        let bodies = SceneBodies::populate(&mut engine, &geometry, &population, &self.palette);
        self.surface.attach(&viewport);

        log::info!(
            "Mounted {} container ({} shapes, {} walls, seed {:#x}) at {}x{}",
            geometry.spec.kind.as_str(),
            bodies.dynamic.len() - 1,
            bodies.walls.len(),
            seed,
            viewport.width,
            viewport.height
        );

        self.mounted = Some(Mounted {
            engine,
            geometry,
            bodies,
            rotation: RotationState::from_live(&self.live),
            accumulator: 0.0,
            ticks: 0,
        });
        self.mounts += 1;
        self.phase = ScenePhase::Running;
    }

    fn teardown(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.engine.clear();
            self.surface.detach();
            log::debug!("Scene torn down after {} ticks", mounted.ticks);
        }
    }
}

impl<E: PhysicsEngine, S: DisplaySurface> Drop for Scene<E, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RapierEngine;
    use crate::engine::fake::FakeEngine;
    use crate::palette::PaletteId;
    use crate::renderer::HeadlessSurface;
    use crate::sim::geometry::{ContainerKind, Viewport};

    type TestScene = Scene<FakeEngine, HeadlessSurface>;

    fn config(container: ContainerKind, population: i32) -> SceneConfig {
        SceneConfig {
            structural: StructuralConfig {
                container,
                population,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn mounted(container: ContainerKind, population: i32) -> TestScene {
        let surface = HeadlessSurface::new(Some(Viewport::new(1024.0, 768.0)));
        let mut scene = Scene::new(&config(container, population), surface, 42);
        scene.start();
        scene.update(SETTLE_DELAY);
        assert_eq!(scene.phase(), ScenePhase::Running);
        scene
    }

    fn positions(scene: &TestScene) -> Vec<glam::Vec2> {
        scene.snapshot().iter().map(|b| b.state.position).collect()
    }

    #[test]
    fn test_mount_waits_for_settle_delay() {
        let surface = HeadlessSurface::new(Some(Viewport::new(800.0, 600.0)));
        let mut scene: TestScene = Scene::new(&SceneConfig::default(), surface, 1);
        assert_eq!(scene.phase(), ScenePhase::Uninitialized);

        scene.start();
        scene.update(0.02);
        assert_eq!(scene.phase(), ScenePhase::Measuring);
        assert!(scene.engine().is_none());

        scene.update(0.04);
        assert_eq!(scene.phase(), ScenePhase::Running);
        assert_eq!(scene.surface().attach_count, 1);
    }

    #[test]
    fn test_mount_registers_every_body() {
        let scene = mounted(ContainerKind::Square, 6);
        let bodies = scene.bodies().unwrap();
        assert_eq!(bodies.walls.len(), 4);
        assert_eq!(bodies.dynamic.len(), 7);
        let tracked = 1 + bodies.walls.len() + bodies.dynamic.len();
        assert_eq!(scene.engine().unwrap().bodies().len(), tracked);
    }

    #[test]
    fn test_deferred_mount_retries() {
        let surface = HeadlessSurface::new(None);
        let mut scene: TestScene = Scene::new(&SceneConfig::default(), surface, 1);
        scene.start();
        scene.update(0.1);
        scene.update(0.1);
        assert_eq!(scene.phase(), ScenePhase::Measuring);
        assert_eq!(scene.surface().attach_count, 0);

        // Zero-sized layouts are also not ready
        scene.surface_mut().viewport = Some(Viewport::new(0.0, 600.0));
        scene.update(0.1);
        assert_eq!(scene.phase(), ScenePhase::Measuring);

        scene.surface_mut().viewport = Some(Viewport::new(800.0, 600.0));
        scene.update(0.016);
        assert_eq!(scene.phase(), ScenePhase::Running);
    }

    #[test]
    fn test_stop_during_settle_cancels_mount() {
        let surface = HeadlessSurface::new(Some(Viewport::new(800.0, 600.0)));
        let mut scene: TestScene = Scene::new(&SceneConfig::default(), surface, 1);
        scene.start();
        scene.update(0.01);
        scene.stop();
        scene.update(1.0);

        assert_eq!(scene.phase(), ScenePhase::TornDown);
        assert!(scene.engine().is_none());
        assert_eq!(scene.surface().attach_count, 0);
        assert_eq!(scene.surface().detach_count, 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut scene = mounted(ContainerKind::Hexagon, 4);
        scene.stop();
        scene.stop();
        assert_eq!(scene.phase(), ScenePhase::TornDown);
        assert!(scene.bodies().is_none());
        assert_eq!(scene.surface().detach_count, 1);
        assert!(!scene.surface().attached);
        assert!(!scene.tick());
    }

    #[test]
    fn test_restart_after_stop() {
        let mut scene = mounted(ContainerKind::Square, 4);
        scene.stop();
        scene.start();
        scene.update(SETTLE_DELAY);
        assert_eq!(scene.phase(), ScenePhase::Running);
        assert_eq!(scene.mounts(), 2);
    }

    #[test]
    fn test_live_config_keeps_bodies() {
        let mut scene = mounted(ContainerKind::Square, 5);
        for _ in 0..30 {
            scene.tick();
        }
        let handles: Vec<usize> =
            scene.bodies().unwrap().dynamic.iter().map(|b| b.handle).collect();

        scene.apply_live_config(LiveConfigPatch::speed(1.8));
        scene.apply_live_config(LiveConfigPatch::reversed(true));
        scene.apply_live_config(LiveConfigPatch::running(false));
        scene.apply_live_config(LiveConfigPatch::palette(PaletteId::Original));

        let after: Vec<usize> = scene.bodies().unwrap().dynamic.iter().map(|b| b.handle).collect();
        assert_eq!(handles, after);
        assert_eq!(scene.mounts(), 1);
        assert_eq!(scene.ticks(), 30);

        let rotation = scene.rotation().unwrap();
        assert_eq!(rotation.speed_deg_per_tick, 1.8);
        assert!(rotation.reversed);
        assert!(!rotation.running);
    }

    #[test]
    fn test_palette_swap_is_cosmetic() {
        let mut scene = mounted(ContainerKind::Circle, 7);
        for _ in 0..20 {
            scene.tick();
        }
        let before = scene.snapshot();

        scene.apply_live_config(LiveConfigPatch::palette(PaletteId::Ember));
        let after = scene.snapshot();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.state, b.state);
        }
        assert_ne!(before[1].fill, after[1].fill);

        let ember = Palette::builtin(PaletteId::Ember);
        let bodies = scene.bodies().unwrap();
        assert_eq!(bodies.canvas_fill, ember.background);
        assert_eq!(bodies.background.fill, ember.container);

        // Same palette again changes nothing
        scene.apply_live_config(LiveConfigPatch::palette(PaletteId::Ember));
        assert_eq!(scene.snapshot(), after);
    }

    #[test]
    fn test_structural_change_rebuilds() {
        let mut scene = mounted(ContainerKind::Square, 4);
        let first = positions(&scene);

        let mut next = *scene.structural();
        next.population = 8;
        assert!(scene.rebuild(next));
        assert_eq!(scene.phase(), ScenePhase::Measuring);
        assert!(scene.engine().is_none());
        assert_eq!(scene.surface().detach_count, 1);

        scene.update(SETTLE_DELAY);
        assert_eq!(scene.phase(), ScenePhase::Running);
        assert_eq!(scene.bodies().unwrap().dynamic.len(), 9);
        assert_eq!(scene.ticks(), 0);
        assert_ne!(positions(&scene)[1..5], first[1..5]);
    }

    #[test]
    fn test_container_change_rebuilds_geometry() {
        let mut scene = mounted(ContainerKind::Square, 4);
        let mut next = *scene.structural();
        next.container = ContainerKind::Circle;
        assert!(scene.rebuild(next));
        scene.update(SETTLE_DELAY);
        let geometry = scene.geometry().unwrap();
        assert_eq!(geometry.spec.kind, ContainerKind::Circle);
        assert_eq!(geometry.walls.len(), 90);
        assert!(matches!(geometry.background, Shape::Circle { .. }));

        let bodies = scene.bodies().unwrap();
        assert_eq!(bodies.walls.len(), 90);
        assert!(matches!(bodies.background.shape, Shape::Circle { .. }));
        // Circle size fraction differs from the square's
        let size = geometry.spec.size;
        assert!((size - 768.0 * 0.75).abs() < 1e-3);
        assert!(bodies.walls.iter().all(|w| {
            matches!(w.shape, Shape::Rectangle { width, .. } if width < size * 0.1)
        }));
    }

    #[test]
    fn test_identical_structural_config_is_ignored() {
        let mut scene = mounted(ContainerKind::Triangle, 4);
        let same = *scene.structural();
        assert!(!scene.rebuild(same));
        assert_eq!(scene.phase(), ScenePhase::Running);
        assert_eq!(scene.surface().detach_count, 0);
    }

    #[test]
    fn test_reset_respawns() {
        let mut scene = mounted(ContainerKind::Square, 4);
        let first = positions(&scene);
        scene.reset();
        assert_eq!(scene.structural().reset_token, 1);
        scene.update(SETTLE_DELAY);
        assert_eq!(scene.mounts(), 2);
        assert_eq!(scene.bodies().unwrap().dynamic.len(), 5);
        assert_ne!(positions(&scene)[1..], first[1..]);
    }

    #[test]
    fn test_config_change_before_start_only_stores() {
        let surface = HeadlessSurface::new(Some(Viewport::new(800.0, 600.0)));
        let mut scene: TestScene = Scene::new(&SceneConfig::default(), surface, 1);
        let mut next = *scene.structural();
        next.population = 3;
        assert!(scene.rebuild(next));
        assert_eq!(scene.phase(), ScenePhase::Uninitialized);
        scene.update(1.0);
        assert!(scene.engine().is_none());
    }

    #[test]
    fn test_resize_remounts() {
        let mut scene = mounted(ContainerKind::Square, 4);
        scene.surface_mut().viewport = Some(Viewport::new(400.0, 300.0));
        scene.notify_resize();
        scene.update(SETTLE_DELAY);
        let spec = scene.geometry().unwrap().spec;
        assert!((spec.size - 300.0 * 0.6).abs() < 1e-3);
        assert_eq!(scene.surface().attach_count, 2);
    }

    #[test]
    fn test_update_runs_fixed_steps_and_renders() {
        let mut scene = mounted(ContainerKind::Square, 4);
        scene.update(SIM_DT * 3.5);
        assert_eq!(scene.ticks(), 3);
        assert_eq!(scene.engine().unwrap().steps, 3);
        let surface = scene.surface();
        assert_eq!(surface.frames, 1);
        assert!(surface.last_vertex_count > 0);
        assert_eq!(surface.last_clear, Some(scene.palette().background));

        // A long stall is capped, not replayed
        scene.update(5.0);
        assert!(scene.ticks() <= 3 + MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_non_finite_dt_does_not_stall_the_clock() {
        let mut scene = mounted(ContainerKind::Square, 4);
        scene.update(f32::NAN);
        scene.update(f32::INFINITY);
        assert_eq!(scene.ticks(), 0);
        for _ in 0..60 {
            scene.update(SIM_DT);
        }
        assert!(scene.ticks() >= 59);
    }

    #[test]
    fn test_walls_collide_with_backed_slabs() {
        let scene = mounted(ContainerKind::Hexagon, 4);
        let geometry = scene.geometry().unwrap();
        let bodies = scene.bodies().unwrap();
        let engine = scene.engine().unwrap();
        for (wall, tracked) in geometry.walls.iter().zip(&bodies.walls) {
            assert_eq!(tracked.shape, wall.shape());
            let desc = &engine.slots[tracked.handle].as_ref().unwrap().desc;
            assert_eq!(desc.shape, wall.collider_shape(geometry.spec.half()));
        }
    }

    #[test]
    fn test_render_failure_is_not_fatal() {
        let mut scene = mounted(ContainerKind::Square, 4);
        scene.surface_mut().attached = false;
        scene.update(SIM_DT);
        assert_eq!(scene.phase(), ScenePhase::Running);
        assert_eq!(scene.surface().frames, 0);
    }

    #[test]
    fn test_tick_rotates_walls() {
        let mut scene = mounted(ContainerKind::Square, 4);
        scene.apply_live_config(LiveConfigPatch::speed(1.2));
        for _ in 0..10 {
            scene.tick();
        }
        let angle = scene.rotation().unwrap().angle;
        assert!((angle - 12.0_f32.to_radians()).abs() < 1e-5);

        let geometry = scene.geometry().unwrap();
        let bodies = scene.bodies().unwrap();
        let engine = scene.engine().unwrap();
        for (wall, tracked) in geometry.walls.iter().zip(&bodies.walls) {
            let expected = rotation::wall_pose(geometry.spec.center, wall, angle);
            let state = engine.body_state(tracked.handle).unwrap();
            assert_eq!((state.position, state.angle), expected);
        }
    }

    #[test]
    fn test_paused_square_scene_settles_with_rapier() {
        let mut config = config(ContainerKind::Square, 4);
        config.live.running = false;
        config.live.rotation_speed = 0.0;
        let surface = HeadlessSurface::new(Some(Viewport::new(800.0, 600.0)));
        let mut scene: Scene<RapierEngine, HeadlessSurface> = Scene::new(&config, surface, 9);
        scene.start();
        scene.update(SETTLE_DELAY);
        assert_eq!(scene.phase(), ScenePhase::Running);

        let walls_before: Vec<_> = {
            let engine = scene.engine().unwrap();
            scene
                .bodies()
                .unwrap()
                .walls
                .iter()
                .map(|w| engine.body_state(w.handle).unwrap().position)
                .collect()
        };

        for _ in 0..100 {
            scene.tick();
        }

        let engine = scene.engine().unwrap();
        let bodies = scene.bodies().unwrap();
        let walls_after: Vec<_> = bodies
            .walls
            .iter()
            .map(|w| engine.body_state(w.handle).unwrap().position)
            .collect();
        assert_eq!(walls_before, walls_after);

        let dynamic = engine
            .bodies()
            .into_iter()
            .filter(|h| engine.body_state(*h).is_some_and(|s| s.dynamic))
            .count();
        assert_eq!(dynamic, 5);

        // Nothing escaped the container
        let spec = scene.geometry().unwrap().spec;
        for body in scene.snapshot() {
            assert!((body.state.position - spec.center).length() < spec.size);
        }

        scene.stop();
        assert!(scene.engine().is_none());
    }

    /// Run a rotating rapier scene and return the farthest any body strayed
    fn farthest_excursion(container: ContainerKind, population: i32, seed: u64) -> (f32, f32) {
        let mut config = config(container, population);
        config.live.rotation_speed = 1.8;
        let surface = HeadlessSurface::new(Some(Viewport::new(1280.0, 800.0)));
        let mut scene: Scene<RapierEngine, HeadlessSurface> = Scene::new(&config, surface, seed);
        scene.start();
        scene.update(SETTLE_DELAY);
        assert_eq!(scene.phase(), ScenePhase::Running);

        let spec = scene.geometry().unwrap().spec;
        let mut farthest = 0.0_f32;
        for _ in 0..900 {
            scene.tick();
            for body in scene.snapshot() {
                farthest = farthest.max((body.state.position - spec.center).length());
            }
        }
        // Every interior point lies within the outer corners
        (farthest, spec.half() * std::f32::consts::SQRT_2)
    }

    #[test]
    fn test_rotating_containers_keep_bodies_inside() {
        let cases = [
            (ContainerKind::Square, 4, 4),
            (ContainerKind::Square, 10, 2),
            (ContainerKind::Hexagon, 10, 3),
            (ContainerKind::Circle, 10, 4),
            (ContainerKind::Triangle, 10, 5),
            (ContainerKind::Pentagon, 7, 6),
        ];
        for (container, population, seed) in cases {
            let (farthest, bound) = farthest_excursion(container, population, seed);
            assert!(
                farthest < bound,
                "{} seed {}: body reached {:.1} from center",
                container.as_str(),
                seed,
                farthest
            );
        }
    }
}
