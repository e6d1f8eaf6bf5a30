//! Phong lighting: the crates again, now with diffuse and specular maps, lit
//! by a directional light, four point lights and a flashlight.

use std::sync::Arc;

use glam::Mat4;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use crate::abs::{ShaderProgram, Texture2D};
use crate::camera::Camera;
use crate::config::Settings;
use crate::error::Result;
use crate::input::{nudge, CameraController, UpdateContext};
use crate::render::lighting::LightRig;
use crate::render::primitives::CUBE_POSITIONS;
use crate::render::shaders;

use super::textures::cube_transform;
use super::{
    camera_from_settings, draw_lamps, load_shader, texture_or_placeholder, CubeGeometry, Demo,
    FrameContext,
};

/// Camera, lights and lamp cubes shared by every lit demo.
pub(crate) struct LitStage {
    pub shader: ShaderProgram,
    lamp_shader: ShaderProgram,
    pub geometry: CubeGeometry,
    pub rig: LightRig,
    pub camera: Camera,
    controller: CameraController,
}

impl LitStage {
    pub fn new(gl: &Arc<glow::Context>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            shader: load_shader(gl, settings, &shaders::MODEL)?,
            lamp_shader: load_shader(gl, settings, &shaders::LIGHT_CUBE)?,
            geometry: CubeGeometry::new(gl)?,
            rig: LightRig::default(),
            camera: camera_from_settings(settings),
            controller: CameraController::default(),
        })
    }

    /// F toggles the flashlight.
    pub fn handle_event(&mut self, event: &Event) {
        if let Event::KeyDown {
            keycode: Some(Keycode::F),
            repeat: false,
            ..
        } = event
        {
            self.rig.flashlight = !self.rig.flashlight;
            log::info!(
                "Flashlight {}",
                if self.rig.flashlight { "on" } else { "off" }
            );
        }
    }

    /// Moves the camera and lets the arrow keys drag the first point light.
    pub fn update(&mut self, ctx: &UpdateContext) {
        self.controller.update(&mut self.camera, ctx);
        nudge(
            &mut self.rig.point_lights[0].position,
            ctx.keyboard,
            ctx.delta_time,
        );
    }

    pub fn wants_mouse_capture(&self) -> bool {
        self.controller.wants_capture()
    }

    /// Binds the lit shader with camera and light uniforms set; returns
    /// `(view, projection)`.
    pub fn begin(&mut self, aspect_ratio: f32) -> (Mat4, Mat4) {
        let view = self.camera.view_matrix();
        let projection = self.camera.projection(aspect_ratio);

        self.shader.use_program();
        self.shader.set_uniform("projection", projection);
        self.shader.set_uniform("view", view);
        self.rig.apply(&self.shader, &self.camera);
        (view, projection)
    }

    pub fn draw_lamps(&self, view: Mat4, projection: Mat4) {
        draw_lamps(
            &self.lamp_shader,
            &self.geometry.lamp,
            &self.rig,
            view,
            projection,
        );
    }
}

pub struct LightingDemo {
    stage: LitStage,
    diffuse: Texture2D,
    specular: Texture2D,
}

impl LightingDemo {
    pub fn new(gl: &Arc<glow::Context>, settings: &Settings) -> Result<Self> {
        let stage = LitStage::new(gl, settings)?;
        let diffuse = texture_or_placeholder(gl, &settings.asset("textures/container2.png"), true)?;
        let specular =
            texture_or_placeholder(gl, &settings.asset("textures/container2_specular.png"), true)?;

        stage.shader.use_program();
        stage.shader.set_uniform("material.texture_diffuse1", 0);
        stage.shader.set_uniform("material.texture_specular1", 1);

        Ok(Self {
            stage,
            diffuse,
            specular,
        })
    }
}

impl Demo for LightingDemo {
    fn name(&self) -> &'static str {
        "Lighting"
    }

    fn handle_event(&mut self, event: &Event) {
        self.stage.handle_event(event);
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.stage.update(ctx);
    }

    fn render(&mut self, frame: &FrameContext) -> Result<()> {
        let (view, projection) = self.stage.begin(frame.aspect_ratio());
        // samplers were pointed at units 0 and 1 in `new`
        self.diffuse.bind(0);
        self.specular.bind(1);

        let elapsed = frame.time.elapsed;
        for (i, position) in CUBE_POSITIONS.iter().enumerate() {
            self.stage
                .shader
                .set_uniform("model", cube_transform(i, *position, elapsed));
            self.stage.geometry.cube.draw();
        }

        self.stage.draw_lamps(view, projection);
        Ok(())
    }

    fn wants_mouse_capture(&self) -> bool {
        self.stage.wants_mouse_capture()
    }
}
