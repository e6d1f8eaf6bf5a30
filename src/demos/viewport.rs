//! The model scene rendered off-screen and shown inside an overlay panel,
//! next to a panel of frame and scene statistics.

use std::sync::Arc;

use glam::{Vec2, Vec4};
use glow::HasContext;
use sdl2::event::Event;

use crate::abs::Framebuffer;
use crate::camera::Camera;
use crate::config::Settings;
use crate::error::Result;
use crate::input::UpdateContext;
use crate::render::model::ModelStats;
use crate::render::shaders;
use crate::render::ui::{fit_rect, Overlay, Rect, TEXT_SIZE};

use super::model::ModelDemo;
use super::{load_shader, Demo, FrameContext};

const MARGIN: f32 = 8.0;
const STATS_WIDTH: f32 = 300.0;
const LINE_SPACING: f32 = 4.0;

/// Splits the screen into the viewport panel (left) and the stats panel (right).
pub fn panel_layout(screen: Vec2) -> (Rect, Rect) {
    let stats_width = STATS_WIDTH.min(screen.x * 0.4);
    let height = (screen.y - 2.0 * MARGIN).max(0.0);
    let viewport_width = (screen.x - stats_width - 3.0 * MARGIN).max(0.0);

    let viewport = Rect::new(Vec2::splat(MARGIN), Vec2::new(viewport_width, height));
    let stats = Rect::new(
        Vec2::new(viewport.max().x + MARGIN, MARGIN),
        Vec2::new(stats_width, height),
    );
    (viewport, stats)
}

/// The lines of the stats panel.
pub fn stats_lines(frame: &FrameContext, camera: &Camera, stats: &ModelStats) -> Vec<String> {
    let position = camera.position;
    vec![
        format!("FPS: {:.1}", frame.fps),
        format!("Frame: {:.2} ms", frame.frame_ms),
        format!(
            "Camera: ({:.2}, {:.2}, {:.2})",
            position.x, position.y, position.z
        ),
        format!("Yaw: {:.1}  Pitch: {:.1}", camera.yaw(), camera.pitch()),
        format!("Zoom: {:.1}", camera.zoom()),
        format!("Meshes: {}", stats.meshes),
        format!("Textures: {}", stats.textures),
        format!("Vertices: {}", stats.vertices),
        format!("Triangles: {}", stats.triangles),
    ]
}

pub struct ViewportDemo {
    gl: Arc<glow::Context>,
    scene: ModelDemo,
    framebuffer: Framebuffer,
    overlay: Overlay,
    clear_color: Vec4,
}

impl ViewportDemo {
    pub fn new(gl: &Arc<glow::Context>, settings: &Settings) -> Result<Self> {
        let scene = ModelDemo::new(gl, settings)?;
        let (width, height) = settings.render.offscreen_size();
        let framebuffer = Framebuffer::new(gl, width, height)?;
        let overlay = Overlay::new(gl, load_shader(gl, settings, &shaders::UI)?)?;
        log::info!("Offscreen target: {}x{}", width, height);

        Ok(Self {
            gl: Arc::clone(gl),
            scene,
            framebuffer,
            overlay,
            clear_color: settings.render.clear_color(),
        })
    }

    fn render_scene(&mut self, frame: &FrameContext) -> Result<()> {
        self.framebuffer.bind();
        unsafe {
            let c = self.clear_color;
            self.gl.clear_color(c.x, c.y, c.z, c.w);
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let offscreen = FrameContext {
            size: self.framebuffer.size(),
            ..*frame
        };
        let result = self.scene.render(&offscreen);

        Framebuffer::unbind(&self.gl);
        unsafe {
            self.gl.viewport(0, 0, frame.size.0 as i32, frame.size.1 as i32);
        }
        result
    }

    fn render_overlay(&mut self, frame: &FrameContext) {
        let screen = Vec2::new(frame.size.0 as f32, frame.size.1 as f32);
        let (viewport_rect, stats_rect) = panel_layout(screen);

        self.overlay.begin(screen);

        let content = self.overlay.panel("Viewport", viewport_rect);
        let image_rect = fit_rect(content, self.framebuffer.aspect_ratio());
        self.overlay
            .image(self.framebuffer.texture().handle(), image_rect, true);

        let content = self.overlay.panel("Stats", stats_rect);
        let mut cursor = content.min;
        for line in stats_lines(frame, self.scene.camera(), &self.scene.stats()) {
            if cursor.y + TEXT_SIZE > content.max().y {
                break;
            }
            let size = self.overlay.label(&line, cursor);
            cursor.y += size.y + LINE_SPACING;
        }

        self.overlay.end();
    }
}

impl Demo for ViewportDemo {
    fn name(&self) -> &'static str {
        "Viewport"
    }

    fn handle_event(&mut self, event: &Event) {
        self.scene.handle_event(event);
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.scene.update(ctx);
    }

    fn render(&mut self, frame: &FrameContext) -> Result<()> {
        self.render_scene(frame)?;
        self.render_overlay(frame);
        Ok(())
    }

    fn wants_mouse_capture(&self) -> bool {
        self.scene.wants_mouse_capture()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::time::FrameTime;

    #[test]
    fn panels_split_the_screen() {
        let (viewport, stats) = panel_layout(Vec2::new(1280.0, 720.0));
        assert_eq!(viewport.min, Vec2::new(8.0, 8.0));
        assert_eq!(viewport.size, Vec2::new(956.0, 704.0));
        assert_eq!(stats.min, Vec2::new(972.0, 8.0));
        assert_eq!(stats.max(), Vec2::new(1272.0, 712.0));
    }

    #[test]
    fn narrow_screens_shrink_the_stats_panel() {
        let (viewport, stats) = panel_layout(Vec2::new(500.0, 100.0));
        assert_eq!(stats.size.x, 200.0);
        assert_eq!(viewport.size.x, 276.0);
    }

    #[test]
    fn tiny_screens_do_not_go_negative() {
        let (viewport, stats) = panel_layout(Vec2::new(10.0, 10.0));
        assert_eq!(viewport.size, Vec2::ZERO);
        assert!(stats.size.y >= 0.0);
    }

    #[test]
    fn stats_report_frame_camera_and_model() {
        let frame = FrameContext {
            size: (1280, 720),
            time: FrameTime {
                dt: 0.016,
                elapsed: 2.0,
                frame_index: 10,
            },
            fps: 59.94,
            frame_ms: 16.683,
        };
        let camera = Camera::new(Vec3::new(0.0, 1.0, 5.0));
        let stats = ModelStats {
            meshes: 3,
            textures: 2,
            vertices: 36,
            triangles: 12,
        };

        let lines = stats_lines(&frame, &camera, &stats);
        assert_eq!(lines[0], "FPS: 59.9");
        assert_eq!(lines[1], "Frame: 16.68 ms");
        assert_eq!(lines[2], "Camera: (0.00, 1.00, 5.00)");
        assert_eq!(lines[3], "Yaw: -90.0  Pitch: 0.0");
        assert_eq!(lines[4], "Zoom: 45.0");
        assert_eq!(
            lines[5..],
            ["Meshes: 3", "Textures: 2", "Vertices: 36", "Triangles: 12"]
        );
    }
}
