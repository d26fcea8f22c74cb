//! Live palette application
//!
//! Rewrites fill colors of an existing scene in place. Nothing here touches
//! the engine, so poses, velocities and body identities survive a swap.

use super::scene::SceneBodies;
use crate::palette::{Palette, ShapeSlot};

/// Recolor every tracked body from `palette`
///
/// Dynamic bodies are matched positionally: the first is the accent, which
/// only changes when the palette defines an accent color; the rest take
/// shape slots in order, cycling after four.
pub fn apply_palette<H>(bodies: &mut SceneBodies<H>, palette: &Palette) {
    bodies.canvas_fill = palette.background;
    bodies.background.fill = palette.container;
    for wall in &mut bodies.walls {
        wall.fill = palette.background;
    }

    let mut dynamic = bodies.dynamic.iter_mut();
    if let Some(accent) = dynamic.next() {
        if let Some(color) = palette.accent {
            accent.fill = color;
        }
    }
    for (i, body) in dynamic.enumerate() {
        body.fill = palette.shape(ShapeSlot::from_index(i));
    }
}
