//! Vertex array objects and vertex layouts.

use std::sync::Arc;

use glow::HasContext;

use crate::error::{Error, Result};

/// A single float vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader `layout (location = N)`.
    pub location: u32,
    /// Number of `f32` components (1 to 4).
    pub components: i32,
    /// Byte offset inside the vertex.
    pub offset: i32,
}

impl VertexAttribute {
    pub const fn new(location: u32, components: i32, offset: usize) -> Self {
        Self {
            location,
            components,
            offset: offset as i32,
        }
    }
}

/// Describes how a vertex type maps onto shader attributes.
pub trait VertexLayout: bytemuck::Pod {
    const ATTRIBUTES: &'static [VertexAttribute];

    fn stride() -> i32 {
        std::mem::size_of::<Self>() as i32
    }
}

/// Represents an OpenGL vertex array object.
pub struct VertexArray {
    gl: Arc<glow::Context>,
    id: glow::VertexArray,
}

impl VertexArray {
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self> {
        let id = unsafe { gl.create_vertex_array().map_err(Error::GlObject)? };
        Ok(Self {
            gl: Arc::clone(gl),
            id,
        })
    }

    pub fn bind(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.id));
        }
    }

    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_vertex_array(None);
        }
    }

    /// Enables `location` and points it at the currently bound `ARRAY_BUFFER`.
    pub fn link_attrib(&self, location: u32, components: i32, offset: i32, stride: i32) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.id));
            self.gl.enable_vertex_attrib_array(location);
            self.gl.vertex_attrib_pointer_f32(
                location,
                components,
                glow::FLOAT,
                false,
                stride,
                offset,
            );
            self.gl.bind_vertex_array(None);
        }
    }

    /// Links every attribute of `V`. The vertex buffer must be bound.
    pub fn link_layout<V: VertexLayout>(&self) {
        self.link_attributes(V::ATTRIBUTES, V::stride());
    }

    /// Links a subset of attributes with an explicit stride, e.g. only the
    /// position of a wider vertex.
    pub fn link_attributes(&self, attributes: &[VertexAttribute], stride: i32) {
        for attribute in attributes {
            self.link_attrib(
                attribute.location,
                attribute.components,
                attribute.offset,
                stride,
            );
        }
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.id);
        }
    }
}
