//! Vertex and index buffer objects.

use std::sync::Arc;

use glow::HasContext;

use crate::error::{Error, Result};

/// Expected update frequency of a buffer's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    #[default]
    Static,
    Dynamic,
    Stream,
}

impl BufferUsage {
    pub fn gl_enum(self) -> u32 {
        match self {
            BufferUsage::Static => glow::STATIC_DRAW,
            BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
            BufferUsage::Stream => glow::STREAM_DRAW,
        }
    }
}

/// A buffer bound to `ARRAY_BUFFER` holding vertex data.
pub struct VertexBuffer {
    gl: Arc<glow::Context>,
    id: glow::Buffer,
    usage: BufferUsage,
}

impl VertexBuffer {
    /// Creates the buffer and uploads `data`. The buffer is left unbound.
    pub fn new<T: bytemuck::Pod>(
        gl: &Arc<glow::Context>,
        data: &[T],
        usage: BufferUsage,
    ) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        unsafe {
            let id = gl.create_buffer().map_err(Error::GlObject)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(id));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytes, usage.gl_enum());
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id,
                usage,
            })
        }
    }

    /// Replaces the whole contents of the buffer.
    pub fn update<T: bytemuck::Pod>(&mut self, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.id));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, bytes, self.usage.gl_enum());
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    pub fn bind(&self) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.id));
        }
    }

    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.id);
        }
    }
}

/// A buffer bound to `ELEMENT_ARRAY_BUFFER` holding `u32` indices.
///
/// The element binding is part of vertex array state, so the buffer is created
/// and updated while the owning vertex array is bound.
pub struct IndexBuffer {
    gl: Arc<glow::Context>,
    id: glow::Buffer,
    usage: BufferUsage,
}

impl IndexBuffer {
    pub fn new(gl: &Arc<glow::Context>, indices: &[u32], usage: BufferUsage) -> Result<Self> {
        unsafe {
            let id = gl.create_buffer().map_err(Error::GlObject)?;
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(id));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                usage.gl_enum(),
            );

            Ok(Self {
                gl: Arc::clone(gl),
                id,
                usage,
            })
        }
    }

    /// Replaces the indices. Must be called with the owning vertex array bound.
    pub fn update(&mut self, indices: &[u32]) {
        unsafe {
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.id));
            self.gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                self.usage.gl_enum(),
            );
        }
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_maps_to_gl_hints() {
        assert_eq!(BufferUsage::Static.gl_enum(), glow::STATIC_DRAW);
        assert_eq!(BufferUsage::Dynamic.gl_enum(), glow::DYNAMIC_DRAW);
        assert_eq!(BufferUsage::Stream.gl_enum(), glow::STREAM_DRAW);
        assert_eq!(BufferUsage::default(), BufferUsage::Static);
    }
}
