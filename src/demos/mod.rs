//! Module providing the `Demo` trait and all demo implementations.
//!
//! Each demo owns its GPU resources; switching demos drops the old one, which
//! releases them.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::abs::{BufferUsage, Mesh, ShaderProgram, Texture2D, VertexBuffer, VertexLayout};
use crate::camera::Camera;
use crate::config::Settings;
use crate::error::Result;
use crate::input::UpdateContext;
use crate::render::lighting::LightRig;
use crate::render::primitives::CUBE_VERTICES;
use crate::render::shaders::{self, ShaderSource};
use crate::render::Vertex;
use crate::time::FrameTime;

pub mod lighting;
pub mod model;
pub mod textures;
pub mod triangle;
pub mod viewport;

/// The demos, in the order of their number keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    Triangle,
    Textures,
    Lighting,
    #[default]
    Model,
    Viewport,
}

impl DemoKind {
    pub const ALL: [DemoKind; 5] = [
        DemoKind::Triangle,
        DemoKind::Textures,
        DemoKind::Lighting,
        DemoKind::Model,
        DemoKind::Viewport,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DemoKind::Triangle => "triangle",
            DemoKind::Textures => "textures",
            DemoKind::Lighting => "lighting",
            DemoKind::Model => "model",
            DemoKind::Viewport => "viewport",
        }
    }

    /// The demo for number key `n` (1-based).
    pub fn from_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown demo: {s}"))
    }
}

/// Per-frame information handed to [`Demo::render`].
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Size of the render target in pixels.
    pub size: (u32, u32),
    pub time: FrameTime,
    pub fps: f32,
    pub frame_ms: f32,
}

impl FrameContext {
    pub fn aspect_ratio(&self) -> f32 {
        self.size.0 as f32 / self.size.1.max(1) as f32
    }
}

/// The Demo trait defines the common interface for all demos.
pub trait Demo {
    fn name(&self) -> &'static str;

    /// Handles an event.
    fn handle_event(&mut self, _event: &sdl2::event::Event) {}

    /// Updates the demo state.
    fn update(&mut self, ctx: &UpdateContext);

    /// Renders into the currently bound framebuffer, which has been cleared.
    fn render(&mut self, frame: &FrameContext) -> Result<()>;

    /// Whether the cursor should be hidden and locked for mouse-look.
    fn wants_mouse_capture(&self) -> bool {
        false
    }
}

/// Builds a demo of the given kind.
pub fn build_demo(kind: DemoKind, gl: &Arc<glow::Context>, settings: &Settings) -> Result<Box<dyn Demo>> {
    log::info!("Starting demo: {}", kind);
    Ok(match kind {
        DemoKind::Triangle => Box::new(triangle::TriangleDemo::new(gl, settings)?),
        DemoKind::Textures => Box::new(textures::TexturesDemo::new(gl, settings)?),
        DemoKind::Lighting => Box::new(lighting::LightingDemo::new(gl, settings)?),
        DemoKind::Model => Box::new(model::ModelDemo::new(gl, settings)?),
        DemoKind::Viewport => Box::new(viewport::ViewportDemo::new(gl, settings)?),
    })
}

/// Holds the running demo and swaps it on request.
pub struct DemoManager {
    kind: DemoKind,
    demo: Box<dyn Demo>,
}

impl DemoManager {
    pub fn new(kind: DemoKind, gl: &Arc<glow::Context>, settings: &Settings) -> Result<Self> {
        let demo = build_demo(kind, gl, settings)?;
        log::info!("{} demo ready", demo.name());
        Ok(Self { kind, demo })
    }

    pub fn kind(&self) -> DemoKind {
        self.kind
    }

    /// Replaces the running demo. On failure the current one keeps running.
    pub fn switch_to(&mut self, kind: DemoKind, gl: &Arc<glow::Context>, settings: &Settings) {
        if kind == self.kind {
            return;
        }
        match build_demo(kind, gl, settings) {
            Ok(demo) => {
                log::info!("{} demo ready", demo.name());
                self.demo = demo;
                self.kind = kind;
            }
            Err(e) => log::error!("Could not start demo {}: {}", kind, e),
        }
    }

    pub fn handle_event(&mut self, event: &sdl2::event::Event) {
        self.demo.handle_event(event);
    }

    pub fn update(&mut self, ctx: &UpdateContext) {
        self.demo.update(ctx);
    }

    pub fn render(&mut self, frame: &FrameContext) -> Result<()> {
        self.demo.render(frame)
    }

    pub fn wants_mouse_capture(&self) -> bool {
        self.demo.wants_mouse_capture()
    }
}

pub(crate) fn load_shader(
    gl: &Arc<glow::Context>,
    settings: &Settings,
    source: &ShaderSource,
) -> Result<ShaderProgram> {
    shaders::load_program(gl, settings.render.shader_dir.as_deref(), source)
}

/// Loads an image, or a magenta checkerboard when it cannot be read.
pub(crate) fn texture_or_placeholder(
    gl: &Arc<glow::Context>,
    path: &Path,
    flip_vertically: bool,
) -> Result<Texture2D> {
    match Texture2D::from_file(gl, path, flip_vertically) {
        Ok(texture) => Ok(texture),
        Err(e) => {
            log::warn!("Texture failed to load, using placeholder: {}", e);
            Texture2D::checkerboard(gl, 64, 8, [255, 0, 255, 255], [32, 32, 32, 255])
        }
    }
}

pub(crate) fn camera_from_settings(settings: &Settings) -> Camera {
    let mut camera = Camera::new(settings.camera.position());
    camera.movement_speed = settings.camera.speed;
    camera.mouse_sensitivity = settings.camera.sensitivity;
    camera
}

/// The cube vertex buffer shared by a lit cube and a lamp vertex array.
pub(crate) struct CubeGeometry {
    // read by both vertex arrays below
    _vbo: VertexBuffer,
    pub cube: Mesh,
    pub lamp: Mesh,
}

impl CubeGeometry {
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self> {
        let vbo = VertexBuffer::new(gl, &CUBE_VERTICES, BufferUsage::Static)?;
        let count = CUBE_VERTICES.len();
        let cube = Mesh::with_buffer(
            gl,
            &vbo,
            Vertex::ATTRIBUTES,
            Vertex::stride(),
            count,
            glow::TRIANGLES,
        )?;
        let lamp = Mesh::with_buffer(
            gl,
            &vbo,
            &[Vertex::POSITION],
            Vertex::stride(),
            count,
            glow::TRIANGLES,
        )?;
        Ok(Self {
            _vbo: vbo,
            cube,
            lamp,
        })
    }
}

pub(crate) const LAMP_SCALE: f32 = 0.2;

/// Draws a small white cube at every point light.
pub(crate) fn draw_lamps(
    program: &ShaderProgram,
    lamp: &Mesh,
    rig: &LightRig,
    view: Mat4,
    projection: Mat4,
) {
    program.use_program();
    program.set_uniform("projection", projection);
    program.set_uniform("view", view);
    for light in &rig.point_lights {
        let model = Mat4::from_translation(light.position) * Mat4::from_scale(Vec3::splat(LAMP_SCALE));
        program.set_uniform("model", model);
        program.set_uniform("light_color", light.specular);
        lamp.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_and_print() {
        for kind in DemoKind::ALL {
            assert_eq!(kind.to_string().parse::<DemoKind>(), Ok(kind));
        }
        assert_eq!(" Viewport ".parse::<DemoKind>(), Ok(DemoKind::Viewport));
        assert!("shadows".parse::<DemoKind>().is_err());
    }

    #[test]
    fn kinds_serialise_lower_case() {
        assert_eq!(serde_json::to_string(&DemoKind::Lighting).unwrap(), "\"lighting\"");
        let kind: DemoKind = serde_json::from_str("\"textures\"").unwrap();
        assert_eq!(kind, DemoKind::Textures);
    }

    #[test]
    fn number_keys_map_in_order() {
        assert_eq!(DemoKind::from_number(1), Some(DemoKind::Triangle));
        assert_eq!(DemoKind::from_number(5), Some(DemoKind::Viewport));
        assert_eq!(DemoKind::from_number(0), None);
        assert_eq!(DemoKind::from_number(6), None);
    }

    #[test]
    fn next_cycles_through_all() {
        assert_eq!(DemoKind::Viewport.next(), DemoKind::Triangle);
        let mut kind = DemoKind::default();
        assert_eq!(kind, DemoKind::Model);
        for _ in 0..DemoKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, DemoKind::Model);
    }

    #[test]
    fn frame_aspect_ratio_survives_zero_height() {
        let frame = FrameContext {
            size: (1280, 0),
            time: FrameTime {
                dt: 0.016,
                elapsed: 1.0,
                frame_index: 0,
            },
            fps: 60.0,
            frame_ms: 16.0,
        };
        assert_eq!(frame.aspect_ratio(), 1280.0);
    }

    #[test]
    fn camera_uses_configured_speed() {
        let mut settings = Settings::default();
        settings.camera.speed = 2.5;
        settings.camera.position = [1.0, 2.0, 3.0];
        let camera = camera_from_settings(&settings);
        assert_eq!(camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.movement_speed, 2.5);
    }
}
