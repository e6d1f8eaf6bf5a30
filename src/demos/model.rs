//! A model file loaded from disk and lit by the light rig.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use sdl2::event::Event;

use crate::camera::Camera;
use crate::config::Settings;
use crate::error::Result;
use crate::input::UpdateContext;
use crate::render::model::{Model, ModelStats};

use super::lighting::LitStage;
use super::{Demo, FrameContext};

pub struct ModelDemo {
    stage: LitStage,
    model: Model,
}

impl ModelDemo {
    pub fn new(gl: &Arc<glow::Context>, settings: &Settings) -> Result<Self> {
        let stage = LitStage::new(gl, settings)?;

        let path = &settings.model.path;
        let mut model = match Model::load(gl, path) {
            Ok(model) => model,
            Err(e) => {
                log::error!("Failed to load model {}: {}", path.display(), e);
                Model::empty(gl)
            }
        };
        model.transform = Mat4::from_scale(Vec3::splat(settings.model.scale));
        log::debug!(
            "{} triangles at scale {}",
            model.stats().triangles,
            settings.model.scale
        );

        Ok(Self { stage, model })
    }

    pub fn camera(&self) -> &Camera {
        &self.stage.camera
    }

    pub fn stats(&self) -> ModelStats {
        self.model.stats()
    }
}

impl Demo for ModelDemo {
    fn name(&self) -> &'static str {
        "Model"
    }

    fn handle_event(&mut self, event: &Event) {
        self.stage.handle_event(event);
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.stage.update(ctx);
    }

    fn render(&mut self, frame: &FrameContext) -> Result<()> {
        let (view, projection) = self.stage.begin(frame.aspect_ratio());
        self.model.draw(&self.stage.shader);
        self.stage.draw_lamps(view, projection);
        Ok(())
    }

    fn wants_mouse_capture(&self) -> bool {
        self.stage.wants_mouse_capture()
    }
}
