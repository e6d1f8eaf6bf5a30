//! Ten spinning crates, two textures blended in the fragment shader.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::abs::{Mesh, ShaderProgram, Texture2D};
use crate::camera::Camera;
use crate::config::Settings;
use crate::error::Result;
use crate::input::{CameraController, UpdateContext};
use crate::render::primitives::{CUBE_POSITIONS, CUBE_VERTICES};
use crate::render::shaders;

use super::{camera_from_settings, load_shader, texture_or_placeholder, Demo, FrameContext};

/// Share of the second texture in the blend.
pub const MIX_VALUE: f32 = 0.2;

const ROTATION_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);

/// Model matrix of the `index`th crate `elapsed` seconds in.
pub fn cube_transform(index: usize, position: Vec3, elapsed: f32) -> Mat4 {
    let angle = (20.0 * index as f32).to_radians() + elapsed;
    Mat4::from_translation(position) * Mat4::from_axis_angle(ROTATION_AXIS.normalize(), angle)
}

pub struct TexturesDemo {
    shader: ShaderProgram,
    cube: Mesh,
    container: Texture2D,
    face: Texture2D,
    camera: Camera,
    controller: CameraController,
}

impl TexturesDemo {
    pub fn new(gl: &Arc<glow::Context>, settings: &Settings) -> Result<Self> {
        let shader = load_shader(gl, settings, &shaders::TEXTURED)?;
        let cube = Mesh::arrays(gl, &CUBE_VERTICES, glow::TRIANGLES)?;
        let container = texture_or_placeholder(gl, &settings.asset("textures/container.jpg"), true)?;
        let face = texture_or_placeholder(gl, &settings.asset("textures/awesomeface.png"), true)?;

        shader.use_program();
        shader.set_uniform("texture1", 0);
        shader.set_uniform("texture2", 1);

        Ok(Self {
            shader,
            cube,
            container,
            face,
            camera: camera_from_settings(settings),
            controller: CameraController::default(),
        })
    }
}

impl Demo for TexturesDemo {
    fn name(&self) -> &'static str {
        "Textures"
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.controller.update(&mut self.camera, ctx);
    }

    fn render(&mut self, frame: &FrameContext) -> Result<()> {
        self.container.bind(0);
        self.face.bind(1);

        self.shader.use_program();
        self.shader.set_uniform("mix_value", MIX_VALUE);
        self.shader
            .set_uniform("projection", self.camera.projection(frame.aspect_ratio()));
        self.shader.set_uniform("view", self.camera.view_matrix());

        let elapsed = frame.time.elapsed;
        for (i, position) in CUBE_POSITIONS.iter().enumerate() {
            self.shader
                .set_uniform("model", cube_transform(i, *position, elapsed));
            self.cube.draw();
        }
        Ok(())
    }

    fn wants_mouse_capture(&self) -> bool {
        self.controller.wants_capture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cube_starts_unrotated() {
        let transform = cube_transform(0, Vec3::new(1.0, 2.0, 3.0), 0.0);
        assert!(transform.abs_diff_eq(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)), 1e-6));
    }

    #[test]
    fn cubes_are_staggered_by_twenty_degrees() {
        let a = cube_transform(1, Vec3::ZERO, 0.0);
        let b = cube_transform(0, Vec3::ZERO, 20f32.to_radians());
        assert!(a.abs_diff_eq(b, 1e-5));
    }

    #[test]
    fn rotation_keeps_the_axis_fixed() {
        let axis = ROTATION_AXIS.normalize();
        let rotated = cube_transform(3, Vec3::ZERO, 1.7).transform_vector3(axis);
        assert!(rotated.abs_diff_eq(axis, 1e-5));
    }
}
