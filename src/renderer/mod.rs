//! Rendering
//!
//! Each update the scene flattens its bodies into a [`Frame`] of pixel-space
//! triangles and hands it to a [`DisplaySurface`]. The browser build presents
//! frames through the WebGPU pipeline; tests and the native runner use
//! [`HeadlessSurface`].

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::build_frame;
pub use vertex::Vertex;

use crate::error::RenderError;
use crate::palette::Color;
use crate::sim::Viewport;

/// One frame worth of geometry, in CSS pixels with y pointing down
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub clear: Color,
    pub vertices: Vec<Vertex>,
}

/// Where frames end up
pub trait DisplaySurface {
    /// Current drawable size; `None` until layout has produced one
    fn measure(&self) -> Option<Viewport>;

    /// Size the backing store for a freshly mounted scene
    fn attach(&mut self, viewport: &Viewport);

    fn present(&mut self, frame: &Frame) -> Result<(), RenderError>;

    /// Release whatever `attach` acquired
    fn detach(&mut self);
}

/// Surface that only records what it was asked to do
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    /// Size reported by `measure`
    pub viewport: Option<Viewport>,
    pub attached: bool,
    pub attach_count: u32,
    pub detach_count: u32,
    pub frames: u64,
    pub last_vertex_count: usize,
    pub last_clear: Option<Color>,
}

impl HeadlessSurface {
    pub fn new(viewport: Option<Viewport>) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }
}

impl DisplaySurface for HeadlessSurface {
    fn measure(&self) -> Option<Viewport> {
        self.viewport.filter(Viewport::is_valid)
    }

    fn attach(&mut self, _viewport: &Viewport) {
        self.attached = true;
        self.attach_count += 1;
    }

    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        if !self.attached {
            return Err(RenderError::Detached);
        }
        self.frames += 1;
        self.last_vertex_count = frame.vertices.len();
        self.last_clear = Some(frame.clear);
        Ok(())
    }

    fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.detach_count += 1;
        }
    }
}
