//! Container geometry
//!
//! Everything is derived from one size parameter: the smaller viewport side.
//! Wall offsets are relative to the container center and never change after
//! construction; rotation only ever re-derives poses from them.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::engine::{Material, Shape};
use crate::error::GeometryError;
use crate::{polar_to_cartesian, regular_polygon, rotate_offset};

/// Container shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    #[default]
    Square,
    Hexagon,
    Circle,
    Triangle,
    Pentagon,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 5] = [
        ContainerKind::Square,
        ContainerKind::Hexagon,
        ContainerKind::Circle,
        ContainerKind::Triangle,
        ContainerKind::Pentagon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Square => "square",
            ContainerKind::Hexagon => "hexagon",
            ContainerKind::Circle => "circle",
            ContainerKind::Triangle => "triangle",
            ContainerKind::Pentagon => "pentagon",
        }
    }

    /// Number of wall segments around the full turn
    pub fn segment_count(&self) -> usize {
        match self {
            ContainerKind::Square => 4,
            ContainerKind::Hexagon => 6,
            ContainerKind::Circle => CIRCLE_SEGMENTS,
            ContainerKind::Triangle => 3,
            ContainerKind::Pentagon => 5,
        }
    }

    /// Fraction of the smaller viewport side used as container size
    pub fn size_fraction(&self) -> f32 {
        match self {
            ContainerKind::Square => SQUARE_SIZE_FRACTION,
            _ => ROUND_SIZE_FRACTION,
        }
    }

    /// Wall thickness multiplier; polygon walls carry extra visual weight
    pub fn wall_weight(&self) -> f32 {
        match self {
            ContainerKind::Hexagon | ContainerKind::Triangle | ContainerKind::Pentagon => {
                POLYGON_WALL_WEIGHT
            }
            ContainerKind::Square | ContainerKind::Circle => 1.0,
        }
    }

    /// Population size multiplier so every shape fits the interior
    pub fn shape_scale(&self) -> f32 {
        match self {
            ContainerKind::Triangle => TRIANGLE_SHAPE_SCALE,
            _ => 1.0,
        }
    }

    /// Whether bodies need the tangential force field to follow the rotation
    pub fn is_curved(&self) -> bool {
        matches!(self, ContainerKind::Circle)
    }
}

/// Host surface size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Device pixels per CSS pixel
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Backing-store size in device pixels
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = if self.pixel_ratio > 0.0 { self.pixel_ratio } else { 1.0 };
        (
            (self.width * ratio).round().max(1.0) as u32,
            (self.height * ratio).round().max(1.0) as u32,
        )
    }
}

/// Placement and scale of the container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSpec {
    pub kind: ContainerKind,
    pub center: Vec2,
    pub size: f32,
    pub wall_thickness: f32,
}

impl ContainerSpec {
    pub fn from_viewport(kind: ContainerKind, viewport: &Viewport) -> Result<Self, GeometryError> {
        if !viewport.is_valid() {
            return Err(GeometryError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let size = kind.size_fraction() * viewport.width.min(viewport.height);
        Ok(Self {
            kind,
            center: Vec2::new(viewport.width / 2.0, viewport.height / 2.0),
            size,
            wall_thickness: MIN_WALL_THICKNESS.max(size * WALL_THICKNESS_FRACTION),
        })
    }

    #[inline]
    pub fn half(&self) -> f32 {
        self.size / 2.0
    }

    /// Distance from the center to the nearest point of the walls' inner faces
    pub fn inner_apothem(&self) -> f32 {
        let wall = self.wall_thickness * self.kind.wall_weight();
        match self.kind {
            ContainerKind::Square => self.half() - wall / 2.0,
            kind => self.half() * (PI / kind.segment_count() as f32).cos() - wall / 2.0,
        }
    }
}

/// One static edge of the container
#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    /// Midpoint relative to the container center at zero rotation
    pub offset: Vec2,
    /// Orientation at zero rotation
    pub base_angle: f32,
    /// Extent along the edge
    pub length: f32,
    /// Extent across the edge
    pub thickness: f32,
    /// Edge runs along the local y axis (square side walls)
    pub upright: bool,
    pub material: Material,
}

impl WallSegment {
    /// Local (width, height) of the slab
    fn extents(&self) -> (f32, f32) {
        if self.upright {
            (self.thickness, self.length)
        } else {
            (self.length, self.thickness)
        }
    }

    /// The visible slab, centered on the body origin
    pub fn shape(&self) -> Shape {
        let (width, height) = self.extents();
        Shape::Rectangle { width, height }
    }

    /// Local axis pointing away from the container center
    pub fn outward(&self) -> Vec2 {
        let n = rotate_offset(self.offset.normalize_or_zero(), -self.base_angle);
        if n.x.abs() > n.y.abs() {
            Vec2::new(n.x.signum(), 0.0)
        } else {
            Vec2::new(0.0, n.y.signum())
        }
    }

    /// Collision slab: the visible one with its outer face pushed `backing`
    /// further out and its ends stretched by one thickness so neighboring
    /// backings overlap. The inner face stays in the same plane, so contacts
    /// look the same, but a body squeezed into the wall is always resolved
    /// back inside.
    pub fn collider_shape(&self, backing: f32) -> Shape {
        let (width, height) = self.extents();
        let outward = self.outward();
        let (hw, hh) = if outward.x == 0.0 {
            (width / 2.0 + self.thickness, height / 2.0)
        } else {
            (width / 2.0, height / 2.0 + self.thickness)
        };
        let vertices = [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ]
        .map(|c| if c.dot(outward) > 0.0 { c + outward * backing } else { c })
        .to_vec();
        Shape::Polygon { vertices }
    }
}

/// Walls plus the interior fill region, built once per mount
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerGeometry {
    pub spec: ContainerSpec,
    pub walls: Vec<WallSegment>,
    /// Interior fill, inset by half a wall thickness; never collides
    pub background: Shape,
}

/// Build the container for `kind` centered in `viewport`
pub fn build_container(
    kind: ContainerKind,
    viewport: &Viewport,
) -> Result<ContainerGeometry, GeometryError> {
    let spec = ContainerSpec::from_viewport(kind, viewport)?;
    let half = spec.half();
    let wall = spec.wall_thickness;
    let inner_radius = half - wall / 2.0;

    let (walls, background) = match kind {
        ContainerKind::Square => (
            square_walls(spec.size, wall),
            Shape::Rectangle {
                width: spec.size - wall,
                height: spec.size - wall,
            },
        ),
        ContainerKind::Circle => (
            polygon_walls(CIRCLE_SEGMENTS, half, wall, Material::GRIPPY_WALL),
            Shape::Circle {
                radius: inner_radius,
            },
        ),
        ContainerKind::Hexagon | ContainerKind::Triangle | ContainerKind::Pentagon => {
            let sides = kind.segment_count();
            (
                polygon_walls(sides, half, wall * kind.wall_weight(), Material::WALL),
                Shape::Polygon {
                    vertices: regular_polygon(sides, inner_radius),
                },
            )
        }
    };

    log::debug!(
        "Built {} container: size {:.1}, wall {:.1}, {} segments",
        kind.as_str(),
        spec.size,
        wall,
        walls.len()
    );

    Ok(ContainerGeometry {
        spec,
        walls,
        background,
    })
}

/// Top, bottom, left, right
fn square_walls(size: f32, wall: f32) -> Vec<WallSegment> {
    let half = size / 2.0;
    let segment = |offset, upright| WallSegment {
        offset,
        base_angle: 0.0,
        length: size,
        thickness: wall,
        upright,
        material: Material::WALL,
    };
    vec![
        segment(Vec2::new(0.0, -half), false),
        segment(Vec2::new(0.0, half), false),
        segment(Vec2::new(-half, 0.0), true),
        segment(Vec2::new(half, 0.0), true),
    ]
}

/// Edges of a regular polygon with circumradius `half`, first vertex at the top
fn polygon_walls(sides: usize, half: f32, thickness: f32, material: Material) -> Vec<WallSegment> {
    let step = TAU / sides as f32;
    let mid_dist = half * (PI / sides as f32).cos();
    let length = 2.0 * half * (PI / sides as f32).sin();

    (0..sides)
        .map(|i| {
            let mid_angle = -FRAC_PI_2 + (i as f32 + 0.5) * step;
            WallSegment {
                offset: polar_to_cartesian(mid_dist, mid_angle),
                base_angle: mid_angle + FRAC_PI_2,
                length,
                thickness,
                upright: false,
                material,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 800.0)
    }

    #[test]
    fn test_square_offsets_and_angles() {
        let geo = build_container(ContainerKind::Square, &viewport()).unwrap();
        let half = geo.spec.half();
        assert!((geo.spec.size - 480.0).abs() < 1e-3);
        let offsets: Vec<Vec2> = geo.walls.iter().map(|w| w.offset).collect();
        assert_eq!(
            offsets,
            vec![
                Vec2::new(0.0, -half),
                Vec2::new(0.0, half),
                Vec2::new(-half, 0.0),
                Vec2::new(half, 0.0),
            ]
        );
        assert!(geo.walls.iter().all(|w| w.base_angle == 0.0));
        assert_eq!(geo.spec.center, Vec2::new(500.0, 400.0));
    }

    #[test]
    fn test_wall_thickness_floor() {
        // 0.6 * 300 = 180, 5% of which is 9 -> floored to 20
        let geo = build_container(ContainerKind::Square, &Viewport::new(300.0, 300.0)).unwrap();
        assert_eq!(geo.spec.wall_thickness, 20.0);

        let big = build_container(ContainerKind::Square, &Viewport::new(2000.0, 2000.0)).unwrap();
        assert!((big.spec.wall_thickness - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_hexagon_layout() {
        let geo = build_container(ContainerKind::Hexagon, &viewport()).unwrap();
        let half = geo.spec.half();
        assert!((geo.spec.size - 600.0).abs() < 1e-3);
        assert_eq!(geo.walls.len(), 6);

        let expected_dist = half * (PI / 6.0).cos();
        for (i, wall) in geo.walls.iter().enumerate() {
            assert!((wall.offset.length() - expected_dist).abs() < 1e-3);
            let mid_angle = -FRAC_PI_2 + (i as f32 + 0.5) * PI / 3.0;
            assert!((wall.base_angle - (mid_angle + FRAC_PI_2)).abs() < 1e-5);
            assert!((wall.length - half).abs() < 1e-3);
            assert!((wall.thickness - geo.spec.wall_thickness * 1.5).abs() < 1e-4);
        }
        assert!(matches!(&geo.background, Shape::Polygon { vertices } if vertices.len() == 6));
    }

    #[test]
    fn test_circle_chords() {
        let geo = build_container(ContainerKind::Circle, &viewport()).unwrap();
        let half = geo.spec.half();
        assert_eq!(geo.walls.len(), 90);

        let chord = 2.0 * half * (PI / 90.0).sin();
        for wall in &geo.walls {
            assert!((wall.length - chord).abs() < 1e-3);
            assert!((wall.thickness - geo.spec.wall_thickness).abs() < 1e-4);
            assert!(wall.length < wall.thickness, "chords are thinner than the wall");
            assert_eq!(
                wall.shape(),
                Shape::Rectangle {
                    width: wall.length,
                    height: wall.thickness,
                }
            );
            assert_eq!(wall.material.friction, 1.0);
        }
        match geo.background {
            Shape::Circle { radius } => {
                assert!((radius - (half - geo.spec.wall_thickness / 2.0)).abs() < 1e-4)
            }
            ref other => panic!("expected circle background, got {:?}", other),
        }
    }

    #[test]
    fn test_square_side_walls_are_upright() {
        let geo = build_container(ContainerKind::Square, &viewport()).unwrap();
        let size = geo.spec.size;
        let wall = geo.spec.wall_thickness;
        let shapes: Vec<Shape> = geo.walls.iter().map(WallSegment::shape).collect();
        assert_eq!(
            shapes[0],
            Shape::Rectangle {
                width: size,
                height: wall,
            }
        );
        assert_eq!(
            shapes[3],
            Shape::Rectangle {
                width: wall,
                height: size,
            }
        );
    }

    #[test]
    fn test_collider_backing_extends_outward_only() {
        for kind in ContainerKind::ALL {
            let geo = build_container(kind, &viewport()).unwrap();
            let center = geo.spec.center;
            let backing = geo.spec.half();
            for wall in &geo.walls {
                let Shape::Polygon { vertices } = wall.collider_shape(backing) else {
                    panic!("collider should be a polygon");
                };
                let (position, angle) = (center + wall.offset, wall.base_angle);
                let distances: Vec<f32> = vertices
                    .iter()
                    .map(|v| (position + rotate_offset(*v, angle) - center).length())
                    .collect();
                let nearest = distances.iter().copied().fold(f32::MAX, f32::min);
                let farthest = distances.iter().copied().fold(0.0, f32::max);
                // Inner face stays where the visible wall's inner face is
                assert!(nearest >= geo.spec.inner_apothem() - 1e-2, "{}", kind.as_str());
                assert!(farthest > wall.offset.length() + backing, "{}", kind.as_str());
            }
        }
    }

    #[test]
    fn test_inner_apothem() {
        let square = build_container(ContainerKind::Square, &viewport()).unwrap().spec;
        let expected = square.half() - square.wall_thickness / 2.0;
        assert!((square.inner_apothem() - expected).abs() < 1e-3);

        let triangle = build_container(ContainerKind::Triangle, &viewport()).unwrap().spec;
        let expected = triangle.half() * 0.5 - triangle.wall_thickness * 1.5 / 2.0;
        assert!((triangle.inner_apothem() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_polygon_variants() {
        for (kind, sides) in [(ContainerKind::Triangle, 3), (ContainerKind::Pentagon, 5)] {
            let geo = build_container(kind, &viewport()).unwrap();
            assert_eq!(geo.walls.len(), sides);
            let expected = geo.spec.half() * (PI / sides as f32).cos();
            for wall in &geo.walls {
                assert!((wall.offset.length() - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_wall_offsets_are_symmetric() {
        for kind in ContainerKind::ALL {
            let geo = build_container(kind, &viewport()).unwrap();
            let sum: Vec2 = geo.walls.iter().map(|w| w.offset).sum();
            assert!(
                sum.length() < geo.spec.size * 1e-4,
                "{} offsets sum to {:?}",
                kind.as_str(),
                sum
            );
        }
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        for (w, h) in [(0.0, 600.0), (800.0, 0.0), (-5.0, 100.0), (f32::NAN, 100.0)] {
            let err = build_container(ContainerKind::Square, &Viewport::new(w, h));
            assert!(matches!(err, Err(GeometryError::InvalidViewport { .. })));
        }
    }

    #[test]
    fn test_physical_size_uses_pixel_ratio() {
        let vp = Viewport {
            width: 400.0,
            height: 300.0,
            pixel_ratio: 2.0,
        };
        assert_eq!(vp.physical_size(), (800, 600));
    }

    proptest! {
        #[test]
        fn prop_symmetry_holds_for_any_viewport(w in 50.0f32..4000.0, h in 50.0f32..4000.0) {
            for kind in ContainerKind::ALL {
                let geo = build_container(kind, &Viewport::new(w, h)).unwrap();
                let sum: Vec2 = geo.walls.iter().map(|wall| wall.offset).sum();
                prop_assert!(sum.length() < geo.spec.size * 1e-3);
            }
        }
    }
}
