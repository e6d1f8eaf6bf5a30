//! Vertex formats used by the demos and the model loader.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::abs::{VertexAttribute, VertexLayout};

/// Position, normal and texture coordinate; the format of every loaded model.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
}

impl Vertex {
    pub const POSITION: VertexAttribute = VertexAttribute::new(0, 3, 0);

    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }
}

impl VertexLayout for Vertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        Vertex::POSITION,
        VertexAttribute::new(1, 3, std::mem::offset_of!(Vertex, normal)),
        VertexAttribute::new(2, 2, std::mem::offset_of!(Vertex, tex_coords)),
    ];
}

/// Position and per-vertex colour.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: Vec3,
    pub color: Vec3,
}

impl VertexLayout for ColorVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute::new(0, 3, 0),
        VertexAttribute::new(1, 3, std::mem::offset_of!(ColorVertex, color)),
    ];
}

/// 2D vertex of the UI overlay, in screen pixels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct UIVertex {
    pub position: Vec2,
    pub uv: Vec2,
}

impl VertexLayout for UIVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute::new(0, 2, 0),
        VertexAttribute::new(1, 2, std::mem::offset_of!(UIVertex, uv)),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_vertex_layout_is_tightly_packed() {
        assert_eq!(Vertex::stride(), 32);
        let offsets: Vec<_> = Vertex::ATTRIBUTES
            .iter()
            .map(|a| (a.location, a.components, a.offset))
            .collect();
        assert_eq!(offsets, vec![(0, 3, 0), (1, 3, 12), (2, 2, 24)]);
    }

    #[test]
    fn small_vertex_layouts() {
        assert_eq!(ColorVertex::stride(), 24);
        assert_eq!(ColorVertex::ATTRIBUTES[1].offset, 12);
        assert_eq!(UIVertex::stride(), 16);
        assert_eq!(UIVertex::ATTRIBUTES[1].offset, 8);
    }
}
