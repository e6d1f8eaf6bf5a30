//! The UI renderer for the overlay.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec4};
use glow::HasContext;

use crate::abs::{BufferUsage, Mesh, ShaderProgram, TextureHandle};
use crate::error::Result;
use crate::render::UIVertex;

/// The rendering mode for a UI element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UIRenderMode {
    /// Samples the texture and multiplies by the tint.
    Texture(TextureHandle, Vec4),
    Color(Vec4),
}

/// A draw command for rendering a UI element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    /// Top-left and bottom-right corners, in pixels.
    pub rect: [Vec2; 2],
    pub uv_rect: [Vec2; 2],
    pub mode: UIRenderMode,
}

impl DrawCommand {
    pub fn color(rect: [Vec2; 2], color: Vec4) -> Self {
        Self {
            rect,
            uv_rect: [Vec2::ZERO, Vec2::ONE],
            mode: UIRenderMode::Color(color),
        }
    }

    pub fn offset(mut self, by: Vec2) -> Self {
        self.rect[0] += by;
        self.rect[1] += by;
        self
    }
}

/// Quads waiting to be drawn with a single render mode.
#[derive(Default)]
pub struct QuadBatch {
    mode: Option<UIRenderMode>,
    vertices: Vec<UIVertex>,
    indices: Vec<u32>,
}

impl QuadBatch {
    /// Whether `mode` can join this batch without a flush.
    pub fn accepts(&self, mode: &UIRenderMode) -> bool {
        self.mode.is_none_or(|current| current == *mode)
    }

    pub fn push(&mut self, command: &DrawCommand) {
        let base_index = self.vertices.len() as u32;
        let [min, max] = command.rect;
        let [uv_min, uv_max] = command.uv_rect;

        self.vertices.extend([
            UIVertex {
                position: Vec2::new(max.x, min.y),
                uv: Vec2::new(uv_max.x, uv_min.y),
            },
            UIVertex {
                position: min,
                uv: uv_min,
            },
            UIVertex {
                position: Vec2::new(min.x, max.y),
                uv: Vec2::new(uv_min.x, uv_max.y),
            },
            UIVertex {
                position: max,
                uv: uv_max,
            },
        ]);
        self.indices.extend([
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
        self.mode = Some(command.mode);
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn mode(&self) -> Option<UIRenderMode> {
        self.mode
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.mode = None;
    }
}

/// Orthographic projection with the origin at the top-left corner, y down.
pub fn screen_projection(size: Vec2) -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, size.x, size.y, 0.0, -1.0, 1.0)
}

/// The UI renderer for rendering 2D elements on the screen.
///
/// Consecutive commands with the same mode are merged into one draw call; a
/// change of mode flushes what has been collected so far.
pub struct UIRenderer {
    gl: Arc<glow::Context>,
    shader_program: ShaderProgram,
    mesh: Mesh,
    batch: QuadBatch,
    pub projection_matrix: Mat4,
    draw_calls: usize,
}

impl UIRenderer {
    pub fn new(gl: &Arc<glow::Context>, shader_program: ShaderProgram) -> Result<Self> {
        let mesh = Mesh::indexed_with_usage::<UIVertex>(
            gl,
            &[],
            &[],
            glow::TRIANGLES,
            BufferUsage::Dynamic,
        )?;
        Ok(Self {
            gl: Arc::clone(gl),
            shader_program,
            mesh,
            batch: QuadBatch::default(),
            projection_matrix: Mat4::IDENTITY,
            draw_calls: 0,
        })
    }

    pub fn set_screen_size(&mut self, size: Vec2) {
        self.projection_matrix = screen_projection(size);
    }

    /// Adds a draw command to the UI renderer.
    pub fn add_command(&mut self, command: DrawCommand) {
        if !self.batch.accepts(&command.mode) {
            self.finish();
        }
        self.batch.push(&command);
    }

    /// Draws whatever has been batched.
    pub fn finish(&mut self) {
        if let Some(mode) = self.batch.mode().filter(|_| !self.batch.is_empty()) {
            self.draw_batch(mode);
        }
        self.batch.clear();
    }

    /// Number of draw calls issued since the last call to this method.
    pub fn take_draw_calls(&mut self) -> usize {
        std::mem::take(&mut self.draw_calls)
    }

    fn draw_batch(&mut self, mode: UIRenderMode) {
        self.mesh.update(&self.batch.vertices, &self.batch.indices);

        self.shader_program.use_program();
        self.shader_program
            .set_uniform("u_projection", self.projection_matrix);
        match mode {
            UIRenderMode::Texture(texture_handle, color) => {
                texture_handle.bind(&self.gl, 0);
                self.shader_program.set_uniform("u_tex", 0);
                self.shader_program.set_uniform("u_color", color);
                self.shader_program.set_uniform("u_solid", false);
            }
            UIRenderMode::Color(color) => {
                self.shader_program.set_uniform("u_color", color);
                self.shader_program.set_uniform("u_solid", true);
            }
        }

        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl
                .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
        self.mesh.draw();
        unsafe {
            self.gl.disable(glow::BLEND);
        }
        self.draw_calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(x: f32, color: Vec4) -> DrawCommand {
        DrawCommand::color([Vec2::new(x, 0.0), Vec2::new(x + 10.0, 20.0)], color)
    }

    #[test]
    fn quads_become_two_triangles() {
        let mut batch = QuadBatch::default();
        batch.push(&quad(0.0, Vec4::ONE));
        batch.push(&quad(50.0, Vec4::ONE));

        assert_eq!(batch.vertices.len(), 8);
        assert_eq!(batch.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(batch.vertices[1].position, Vec2::new(0.0, 0.0));
        assert_eq!(batch.vertices[3].position, Vec2::new(10.0, 20.0));
        assert_eq!(batch.vertices[0].uv, Vec2::new(1.0, 0.0));
        assert_eq!(batch.vertices[2].uv, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn batch_accepts_only_its_own_mode() {
        let mut batch = QuadBatch::default();
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(batch.accepts(&UIRenderMode::Color(red)));

        batch.push(&quad(0.0, red));
        assert!(batch.accepts(&UIRenderMode::Color(red)));
        assert!(!batch.accepts(&UIRenderMode::Color(Vec4::ONE)));

        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.accepts(&UIRenderMode::Color(Vec4::ONE)));
    }

    #[test]
    fn projection_puts_origin_top_left() {
        let projection = screen_projection(Vec2::new(800.0, 600.0));
        let top_left = projection.project_point3(glam::Vec3::ZERO);
        let bottom_right = projection.project_point3(glam::Vec3::new(800.0, 600.0, 0.0));
        assert!((top_left.truncate() - Vec2::new(-1.0, 1.0)).length() < 1e-6);
        assert!((bottom_right.truncate() - Vec2::new(1.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn offset_moves_both_corners() {
        let moved = quad(0.0, Vec4::ONE).offset(Vec2::new(5.0, 5.0));
        assert_eq!(moved.rect, [Vec2::new(5.0, 5.0), Vec2::new(15.0, 25.0)]);
    }
}
