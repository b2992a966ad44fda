//! # Vertex
//!
//! Position plus the provenance the kernel tracks through every split.

use crate::mesh::VertexOrigin;
use glam::DVec3;

/// A polygon corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in space.
    pub pos: DVec3,
    /// Input vertex this corner came from, if any.
    pub origin: VertexOrigin,
}

impl Vertex {
    pub fn new(pos: DVec3, origin: VertexOrigin) -> Self {
        Self { pos, origin }
    }

    /// Point at `t` along the edge to `other`. The result has no input
    /// vertex behind it.
    pub fn lerp(&self, other: &Vertex, t: f64) -> Vertex {
        Vertex {
            pos: self.pos.lerp(other.pos, t),
            origin: VertexOrigin::Introduced,
        }
    }
}
