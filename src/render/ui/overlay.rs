//! Immediate-mode overlay: panels, images and text drawn over the frame.
//!
//! Call [`Overlay::begin`], describe the widgets for this frame, then
//! [`Overlay::end`] to flush them.

use std::sync::Arc;

use glam::{Vec2, Vec4};
use glow::HasContext;

use super::font::{BitmapFont, GlyphMetrics};
use super::renderer::{DrawCommand, UIRenderMode, UIRenderer};
use crate::abs::{ShaderProgram, TextureHandle};
use crate::error::Result;

pub const TEXT_SIZE: f32 = 16.0;
const TITLE_BAR_HEIGHT: f32 = 24.0;
const PADDING: f32 = 8.0;

const PANEL_COLOR: Vec4 = Vec4::new(0.06, 0.06, 0.08, 0.85);
const TITLE_COLOR: Vec4 = Vec4::new(0.16, 0.29, 0.48, 1.0);
const TEXT_COLOR: Vec4 = Vec4::new(0.95, 0.95, 0.95, 1.0);

/// Axis-aligned rectangle in screen pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn corners(&self) -> [Vec2; 2] {
        [self.min, self.max()]
    }

    /// Shrinks the rectangle by `amount` on every side, never below zero size.
    pub fn inset(&self, amount: f32) -> Self {
        let size = (self.size - Vec2::splat(2.0 * amount)).max(Vec2::ZERO);
        Self::new(self.min + Vec2::splat(amount), size)
    }

    /// Splits off the top `height` pixels; returns `(top, rest)`.
    pub fn split_top(&self, height: f32) -> (Self, Self) {
        let height = height.min(self.size.y);
        (
            Self::new(self.min, Vec2::new(self.size.x, height)),
            Self::new(
                self.min + Vec2::new(0.0, height),
                Vec2::new(self.size.x, self.size.y - height),
            ),
        )
    }
}

/// The largest rectangle with the given width/height ratio that fits inside
/// `container`, centred in it.
pub fn fit_rect(container: Rect, aspect: f32) -> Rect {
    if container.size.x <= 0.0 || container.size.y <= 0.0 || aspect <= 0.0 {
        return Rect::new(container.min, Vec2::ZERO);
    }
    let size = if container.size.x / container.size.y > aspect {
        Vec2::new(container.size.y * aspect, container.size.y)
    } else {
        Vec2::new(container.size.x, container.size.x / aspect)
    };
    Rect::new(container.min + (container.size - size) / 2.0, size)
}

pub struct Overlay {
    gl: Arc<glow::Context>,
    renderer: UIRenderer,
    font: BitmapFont,
}

impl Overlay {
    pub fn new(gl: &Arc<glow::Context>, ui_shader: ShaderProgram) -> Result<Self> {
        Ok(Self {
            gl: Arc::clone(gl),
            renderer: UIRenderer::new(gl, ui_shader)?,
            font: BitmapFont::new(gl)?,
        })
    }

    /// Starts a frame covering a `screen`-sized default framebuffer.
    pub fn begin(&mut self, screen: Vec2) {
        self.renderer.set_screen_size(screen);
        unsafe {
            self.gl.disable(glow::DEPTH_TEST);
            self.gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
        }
    }

    /// Draws a titled panel and returns the area left for its content.
    pub fn panel(&mut self, title: &str, rect: Rect) -> Rect {
        let (title_bar, body) = rect.split_top(TITLE_BAR_HEIGHT);
        self.renderer
            .add_command(DrawCommand::color(body.corners(), PANEL_COLOR));
        self.renderer
            .add_command(DrawCommand::color(title_bar.corners(), TITLE_COLOR));

        let text_offset = (TITLE_BAR_HEIGHT - TEXT_SIZE) / 2.0;
        self.label(title, title_bar.min + Vec2::new(PADDING, text_offset));
        body.inset(PADDING)
    }

    /// Draws `texture` stretched over `rect`. `flip_v` is for render targets,
    /// whose first row is the bottom of the image.
    pub fn image(&mut self, texture: TextureHandle, rect: Rect, flip_v: bool) {
        let uv_rect = if flip_v {
            [Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)]
        } else {
            [Vec2::ZERO, Vec2::ONE]
        };
        self.renderer.add_command(DrawCommand {
            rect: rect.corners(),
            uv_rect,
            mode: UIRenderMode::Texture(texture, Vec4::ONE),
        });
    }

    /// Draws `text` with its top-left corner at `position`; returns the size it took.
    pub fn label(&mut self, text: &str, position: Vec2) -> Vec2 {
        for command in self.font.text(text, position, TEXT_SIZE, TEXT_COLOR) {
            self.renderer.add_command(command);
        }
        GlyphMetrics::new(TEXT_SIZE).measure(text)
    }

    /// Flushes everything and restores depth testing.
    pub fn end(&mut self) {
        self.renderer.finish();
        let calls = self.renderer.take_draw_calls();
        log::trace!("Overlay drew in {} calls", calls);
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
        }
    }
}
