//! Tessellation of engine shapes into flat triangles

use glam::Vec2;
use std::f32::consts::PI;

use super::Frame;
use super::vertex::Vertex;
use crate::engine::{PhysicsEngine, Shape};
use crate::palette::Color;
use crate::rotate_offset;
use crate::sim::{SceneBodies, Tracked};

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Segment count that keeps circle edges smooth at any size
fn circle_segments(radius: f32) -> u32 {
    ((radius * 0.5) as u32).clamp(16, 96)
}

/// Convex polygon as a fan around the body origin
pub fn polygon(center: Vec2, angle: f32, local: &[Vec2], color: Color) -> Vec<Vertex> {
    if local.len() < 3 {
        return Vec::new();
    }

    let world: Vec<Vec2> = local.iter().map(|v| center + rotate_offset(*v, angle)).collect();
    let mut vertices = Vec::with_capacity(world.len() * 3);
    for (i, a) in world.iter().enumerate() {
        let b = world[(i + 1) % world.len()];
        vertices.push(Vertex::at(center, color));
        vertices.push(Vertex::at(*a, color));
        vertices.push(Vertex::at(b, color));
    }
    vertices
}

/// Rotated rectangle as two triangles
pub fn rectangle(center: Vec2, angle: f32, width: f32, height: f32, color: Color) -> Vec<Vertex> {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let corners = [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ]
    .map(|c| Vertex::at(center + rotate_offset(c, angle), color));

    vec![
        corners[0],
        corners[1],
        corners[2],
        corners[0],
        corners[2],
        corners[3],
    ]
}

/// Tessellate `shape` at a world pose
pub fn shape_at(shape: &Shape, position: Vec2, angle: f32, color: Color) -> Vec<Vertex> {
    match shape {
        Shape::Rectangle { width, height } => rectangle(position, angle, *width, *height, color),
        Shape::Circle { radius } => circle(position, *radius, color.0, circle_segments(*radius)),
        Shape::Polygon { vertices } => polygon(position, angle, vertices, color),
    }
}

/// Flatten the scene into one frame: fill region, walls, then dynamic bodies
pub fn build_frame<E: PhysicsEngine>(bodies: &SceneBodies<E::Handle>, engine: &E) -> Frame {
    let mut vertices = Vec::new();
    let tracked = std::iter::once(&bodies.background)
        .chain(&bodies.walls)
        .chain(&bodies.dynamic);

    for Tracked { handle, shape, fill } in tracked {
        if let Some(state) = engine.body_state(*handle) {
            vertices.extend(shape_at(shape, state.position, state.angle, *fill));
        }
    }

    Frame {
        clear: bodies.canvas_fill,
        vertices,
    }
}
