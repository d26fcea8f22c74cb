//! Population spawning
//!
//! Produces body descriptors for a fresh scene: the accent body first, then the
//! requested number of shapes dropped into a band just under the top wall.
//! Every body's bounding circle starts inside the walls' inner faces. All
//! randomness comes from the caller's RNG so a seed reproduces a layout.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::geometry::{ContainerKind, ContainerSpec};
use crate::consts::{MAX_POPULATION, MIN_POPULATION};
use crate::engine::{BodyDesc, BodyKind, Material, Shape};
use crate::palette::{Color, ColorSlot, Palette, ShapeSlot};
use crate::regular_polygon;

/// Accent radius as a fraction of container size
const ACCENT_RADIUS: f32 = 0.03;
/// Spawn band offset below the top wall's inner edge
const SPAWN_BAND_OFFSET: f32 = 0.12;
/// Horizontal jitter either side of center
const HORIZONTAL_RANGE: f32 = 0.25;
/// Random per-instance scale range
const SCALE_MIN: f32 = 0.8;
const SCALE_MAX: f32 = 1.2;
/// Mixed-mode extent range
const MIXED_EXTENT_MIN: f32 = 0.08;
const MIXED_EXTENT_MAX: f32 = 0.18;
/// Rectangle aspect in mixed mode
const MIXED_RECT_ASPECT: f32 = 0.6;
/// Jitter retries per row before moving down
const SPAWN_ATTEMPTS: usize = 8;

/// How the population is composed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationMode {
    /// Square, bar, triangle, hexagon, repeating
    #[default]
    Classic,
    /// Circles and rectangles on a linear size gradient
    Mixed,
}

/// What a spawned body represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Accent,
    Square,
    Bar,
    Triangle,
    Hexagon,
    Circle,
    Rectangle,
}

impl ShapeKind {
    const CLASSIC: [ShapeKind; 4] = [
        ShapeKind::Square,
        ShapeKind::Bar,
        ShapeKind::Triangle,
        ShapeKind::Hexagon,
    ];
}

/// A dynamic body ready to hand to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDescriptor {
    pub kind: ShapeKind,
    pub shape: Shape,
    pub position: Vec2,
    pub angle: f32,
    pub material: Material,
    pub color_slot: ColorSlot,
    pub fill: Color,
    /// Size factor relative to nominal (1.0 when unscaled)
    pub scale: f32,
}

impl BodyDescriptor {
    pub fn body_desc(&self) -> BodyDesc {
        BodyDesc {
            shape: self.shape.clone(),
            position: self.position,
            angle: self.angle,
            kind: BodyKind::Dynamic,
            material: self.material,
        }
    }
}

/// Clamp a requested shape count into the supported range
pub fn clamp_population(requested: i32) -> usize {
    (requested.max(0) as usize).clamp(MIN_POPULATION, MAX_POPULATION)
}

/// Spawn the accent body followed by `clamp_population(requested)` shapes
pub fn spawn_population<R: Rng + ?Sized>(
    spec: &ContainerSpec,
    requested: i32,
    mode: PopulationMode,
    palette: &Palette,
    rng: &mut R,
) -> Vec<BodyDescriptor> {
    let count = clamp_population(requested);
    let mut placer = Placer::new(spec);

    let accent = accent_body(spec, palette);
    placer.reserve(accent.position, accent.shape.bounding_radius());

    let mut bodies = Vec::with_capacity(count + 1);
    bodies.push(accent);
    let shapes = match mode {
        PopulationMode::Classic => classic_shapes(spec, count, palette, &mut placer, rng),
        PopulationMode::Mixed => mixed_shapes(spec, count, palette, &mut placer, rng),
    };
    bodies.extend(shapes);

    log::debug!(
        "Spawned {} shapes ({:?}) plus accent",
        bodies.len() - 1,
        mode
    );
    bodies
}

fn accent_body(spec: &ContainerSpec, palette: &Palette) -> BodyDescriptor {
    let radius = spec.size * ACCENT_RADIUS;
    let below_wall = spec.center.y - spec.half() + spec.wall_thickness + radius * 2.0;
    // Pointed tops leave no room right under the top wall
    let highest = spec.center.y - SpawnRegion::of(spec).room(radius).max(0.0);
    let y = below_wall.max(highest);
    BodyDescriptor {
        kind: ShapeKind::Accent,
        shape: Shape::Circle { radius },
        position: Vec2::new(spec.center.x, y),
        angle: 0.0,
        material: Material::ACCENT,
        color_slot: ColorSlot::Accent,
        fill: palette.resolve(ColorSlot::Accent),
        scale: 1.0,
    }
}

fn random_angle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    (rng.random::<f32>() - 0.5) * PI * 0.5
}

fn classic_shapes<R: Rng + ?Sized>(
    spec: &ContainerSpec,
    count: usize,
    palette: &Palette,
    placer: &mut Placer,
    rng: &mut R,
) -> Vec<BodyDescriptor> {
    let base = spec.size * spec.kind.shape_scale();
    let mut shapes: Vec<BodyDescriptor> = (0..count)
        .map(|i| {
            let kind = ShapeKind::CLASSIC[i % ShapeKind::CLASSIC.len()];
            let scale = rng.random_range(SCALE_MIN..SCALE_MAX);
            let shape = match kind {
                ShapeKind::Square => {
                    let side = base * 0.14 * scale;
                    Shape::Rectangle {
                        width: side,
                        height: side,
                    }
                }
                ShapeKind::Bar => Shape::Rectangle {
                    width: base * 0.40 * scale,
                    height: base * 0.06 * scale,
                },
                ShapeKind::Triangle => Shape::Polygon {
                    vertices: regular_polygon(3, base * 0.16 * scale),
                },
                _ => Shape::Polygon {
                    vertices: regular_polygon(6, base * 0.24 * scale),
                },
            };
            let position = placer.place(shape.bounding_radius(), rng);
            BodyDescriptor {
                kind,
                shape,
                position,
                angle: random_angle(rng),
                material: Material::SHAPE,
                color_slot: ColorSlot::Shape(ShapeSlot::from_index(i)),
                fill: palette.shape(ShapeSlot::from_index(i)),
                scale,
            }
        })
        .collect();

    // Smaller instances take colors earlier in the palette
    let mut by_scale: Vec<usize> = (0..shapes.len()).collect();
    by_scale.sort_by(|&a, &b| shapes[a].scale.total_cmp(&shapes[b].scale));
    for (rank, &i) in by_scale.iter().enumerate() {
        let slot = ShapeSlot::from_index(rank);
        shapes[i].color_slot = ColorSlot::Shape(slot);
        shapes[i].fill = palette.shape(slot);
    }

    shapes
}

fn mixed_shapes<R: Rng + ?Sized>(
    spec: &ContainerSpec,
    count: usize,
    palette: &Palette,
    placer: &mut Placer,
    rng: &mut R,
) -> Vec<BodyDescriptor> {
    let mut kinds = vec![
        ShapeKind::Rectangle,
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Circle,
    ];
    kinds.shuffle(rng);
    while kinds.len() < count {
        kinds.push(if rng.random_bool(0.5) {
            ShapeKind::Rectangle
        } else {
            ShapeKind::Circle
        });
    }
    kinds.truncate(count);
    kinds.shuffle(rng);

    let min = spec.size * spec.kind.shape_scale() * MIXED_EXTENT_MIN;
    let max = spec.size * spec.kind.shape_scale() * MIXED_EXTENT_MAX;
    let mut extents: Vec<f32> = (0..count)
        .map(|i| min + (max - min) * i as f32 / (count - 1).max(1) as f32)
        .collect();
    extents.shuffle(rng);

    kinds
        .into_iter()
        .zip(extents)
        .enumerate()
        .map(|(i, (kind, extent))| {
            let shape = match kind {
                ShapeKind::Circle => Shape::Circle {
                    radius: extent / 2.0,
                },
                _ => Shape::Rectangle {
                    width: extent,
                    height: extent * MIXED_RECT_ASPECT,
                },
            };
            let position = placer.place(shape.bounding_radius(), rng);
            let slot = ShapeSlot::from_index(i);
            BodyDescriptor {
                kind,
                shape,
                position,
                angle: random_angle(rng),
                material: Material::SHAPE,
                color_slot: ColorSlot::Shape(slot),
                fill: palette.shape(slot),
                scale: 1.0,
            }
        })
        .collect()
}

/// Interior a body center may occupy, relative to the container center
#[derive(Debug, Clone, Copy, PartialEq)]
enum SpawnRegion {
    /// Axis-aligned square with the given half side
    Box { half: f32 },
    /// Disc inscribed in the walls' inner faces
    Disc { radius: f32 },
}

impl SpawnRegion {
    fn of(spec: &ContainerSpec) -> Self {
        let apothem = spec.inner_apothem();
        match spec.kind {
            ContainerKind::Square => SpawnRegion::Box { half: apothem },
            _ => SpawnRegion::Disc { radius: apothem },
        }
    }

    /// How far a body of `radius` may sit from the center along either axis
    fn room(&self, radius: f32) -> f32 {
        match *self {
            SpawnRegion::Box { half } => half - radius,
            SpawnRegion::Disc { radius: outer } => outer - radius,
        }
    }

    /// Horizontal half-span available at vertical offset `dy`
    fn half_span(&self, dy: f32, radius: f32) -> f32 {
        let room = self.room(radius).max(0.0);
        match *self {
            SpawnRegion::Box { .. } => room,
            SpawnRegion::Disc { .. } => {
                let dy = dy.abs().min(room);
                (room * room - dy * dy).sqrt()
            }
        }
    }
}

/// Picks spawn points whose bounding circles don't overlap earlier ones
#[derive(Debug)]
struct Placer {
    center: Vec2,
    range: f32,
    band_y: f32,
    region: SpawnRegion,
    placed: Vec<(Vec2, f32)>,
}

impl Placer {
    fn new(spec: &ContainerSpec) -> Self {
        let top_inner = spec.center.y - spec.half() + spec.wall_thickness;
        Self {
            center: spec.center,
            range: spec.size * HORIZONTAL_RANGE,
            band_y: top_inner + spec.size * SPAWN_BAND_OFFSET,
            region: SpawnRegion::of(spec),
            placed: Vec::new(),
        }
    }

    fn reserve(&mut self, position: Vec2, radius: f32) {
        self.placed.push((position, radius));
    }

    fn overlaps(&self, position: Vec2, radius: f32) -> bool {
        self.placed
            .iter()
            .any(|&(p, r)| p.distance(position) < r + radius)
    }

    fn place<R: Rng + ?Sized>(&mut self, radius: f32, rng: &mut R) -> Vec2 {
        let room = self.region.room(radius);
        if room <= 0.0 {
            log::debug!("Radius {:.1} leaves no room, spawning at center", radius);
            self.reserve(self.center, radius);
            return self.center;
        }

        let top = self.center.y - room;
        let bottom = self.center.y + room;
        let mut y = self.band_y.clamp(top, bottom);
        let mut fallback = self.center;
        loop {
            let span = self
                .region
                .half_span(y - self.center.y, radius)
                .min(self.range);
            for _ in 0..SPAWN_ATTEMPTS {
                let x = self.center.x + (rng.random::<f32>() * 2.0 - 1.0) * span;
                let candidate = Vec2::new(x, y);
                if !self.overlaps(candidate, radius) {
                    self.reserve(candidate, radius);
                    return candidate;
                }
                fallback = candidate;
            }

            let next = y + (radius * 2.0).max(1.0);
            if next > bottom {
                // Out of room: let the engine push them apart
                log::debug!("No free spawn slot for radius {:.1}, overlapping", radius);
                self.reserve(fallback, radius);
                return fallback;
            }
            y = next;
        }
    }
}
