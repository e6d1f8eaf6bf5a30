//! The first demo: a colored rectangle from an index buffer.

use std::sync::Arc;

use crate::abs::{Mesh, ShaderProgram};
use crate::config::Settings;
use crate::error::Result;
use crate::input::UpdateContext;
use crate::render::primitives::{RECTANGLE_INDICES, RECTANGLE_VERTICES};
use crate::render::shaders;

use super::{load_shader, Demo, FrameContext};

pub struct TriangleDemo {
    shader: ShaderProgram,
    mesh: Mesh,
}

impl TriangleDemo {
    pub fn new(gl: &Arc<glow::Context>, settings: &Settings) -> Result<Self> {
        let shader = load_shader(gl, settings, &shaders::BASIC)?;
        let mesh = Mesh::indexed(gl, &RECTANGLE_VERTICES, &RECTANGLE_INDICES, glow::TRIANGLES)?;
        Ok(Self { shader, mesh })
    }
}

impl Demo for TriangleDemo {
    fn name(&self) -> &'static str {
        "Triangle"
    }

    fn update(&mut self, _ctx: &UpdateContext) {}

    fn render(&mut self, _frame: &FrameContext) -> Result<()> {
        self.shader.use_program();
        self.mesh.draw();
        Ok(())
    }
}
