//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct, a vertex array together with the
//! buffers it reads from. Vertices should implement the [`VertexLayout`] trait.

use std::sync::Arc;

use glow::HasContext;

use crate::abs::{BufferUsage, IndexBuffer, VertexArray, VertexAttribute, VertexBuffer, VertexLayout};
use crate::error::Result;

/// Represents a mesh stored on the GPU side.
pub struct Mesh {
    gl: Arc<glow::Context>,
    draw_mode: u32,
    vao: VertexArray,
    vbo: Option<VertexBuffer>,
    ebo: Option<IndexBuffer>,
    count: usize,
}

impl Mesh {
    /// Creates an indexed mesh drawn with `draw_elements`.
    pub fn indexed<V: VertexLayout>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        indices: &[u32],
        draw_mode: u32,
    ) -> Result<Self> {
        Self::indexed_with_usage(gl, vertices, indices, draw_mode, BufferUsage::Static)
    }

    /// Same as [`Mesh::indexed`] with an explicit buffer usage hint.
    pub fn indexed_with_usage<V: VertexLayout>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        indices: &[u32],
        draw_mode: u32,
        usage: BufferUsage,
    ) -> Result<Self> {
        let vao = VertexArray::new(gl)?;
        vao.bind();
        let vbo = VertexBuffer::new(gl, vertices, usage)?;
        vbo.bind();
        let ebo = IndexBuffer::new(gl, indices, usage)?;
        vao.unbind();

        vbo.bind();
        vao.link_layout::<V>();
        vbo.unbind();

        Ok(Self {
            gl: Arc::clone(gl),
            draw_mode,
            vao,
            vbo: Some(vbo),
            count: indices.len(),
            ebo: Some(ebo),
        })
    }

    /// Creates a non-indexed mesh drawn with `draw_arrays`.
    pub fn arrays<V: VertexLayout>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        draw_mode: u32,
    ) -> Result<Self> {
        let vao = VertexArray::new(gl)?;
        let vbo = VertexBuffer::new(gl, vertices, BufferUsage::Static)?;
        vbo.bind();
        vao.link_layout::<V>();
        vbo.unbind();

        Ok(Self {
            gl: Arc::clone(gl),
            draw_mode,
            vao,
            vbo: Some(vbo),
            ebo: None,
            count: vertices.len(),
        })
    }

    /// Creates a new vertex array over an existing vertex buffer, linking only
    /// `attributes`. The caller keeps `buffer` alive for as long as this mesh.
    pub fn with_buffer(
        gl: &Arc<glow::Context>,
        buffer: &VertexBuffer,
        attributes: &[VertexAttribute],
        stride: i32,
        count: usize,
        draw_mode: u32,
    ) -> Result<Self> {
        let vao = VertexArray::new(gl)?;
        buffer.bind();
        vao.link_attributes(attributes, stride);
        buffer.unbind();

        Ok(Self {
            gl: Arc::clone(gl),
            draw_mode,
            vao,
            vbo: None,
            ebo: None,
            count,
        })
    }

    /// Replaces the vertex and index data of a mesh that owns its buffers.
    pub fn update<V: VertexLayout>(&mut self, vertices: &[V], indices: &[u32]) {
        if let Some(vbo) = &mut self.vbo {
            vbo.update(vertices);
        }
        match &mut self.ebo {
            Some(ebo) => {
                self.vao.bind();
                ebo.update(indices);
                self.vao.unbind();
                self.count = indices.len();
            }
            None => self.count = vertices.len(),
        }
    }

    /// Draws the mesh.
    pub fn draw(&self) {
        self.vao.bind();
        unsafe {
            if self.ebo.is_some() {
                self.gl
                    .draw_elements(self.draw_mode, self.count as i32, glow::UNSIGNED_INT, 0);
            } else {
                self.gl.draw_arrays(self.draw_mode, 0, self.count as i32);
            }
        }
        self.vao.unbind();
    }

    /// Returns the number of indices, or vertices for non-indexed meshes.
    pub fn element_count(&self) -> usize {
        self.count
    }
}
