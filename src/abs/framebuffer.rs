//! Module to work with OpenGL framebuffers.
//!
//! [`Framebuffer`] renders off-screen into a colour texture backed by a depth
//! renderbuffer; the texture can then be sampled like any other.

use std::sync::Arc;

use glow::HasContext;

use crate::abs::{PixelFormat, Texture2D, TextureConfig};
use crate::error::{Error, Result};

/// Represents an OpenGL framebuffer.
pub struct Framebuffer {
    gl: Arc<glow::Context>,
    fbo: glow::Framebuffer,
    depth: glow::Renderbuffer,
    color_tex: Texture2D,
}

impl Framebuffer {
    /// Creates a new framebuffer with the specified width and height.
    pub fn new(gl: &Arc<glow::Context>, width: u32, height: u32) -> Result<Self> {
        let config = TextureConfig::default()
            .with_format(PixelFormat::Rgba)
            .with_wrap(glow::CLAMP_TO_EDGE);
        let mut color_tex = Texture2D::new(gl, config)?;
        color_tex.generate(width, height, None, false);

        unsafe {
            let fbo = gl.create_framebuffer().map_err(Error::GlObject)?;
            let depth = match gl.create_renderbuffer() {
                Ok(depth) => depth,
                Err(e) => {
                    gl.delete_framebuffer(fbo);
                    return Err(Error::GlObject(e));
                }
            };

            let framebuffer = Self {
                gl: Arc::clone(gl),
                fbo,
                depth,
                color_tex,
            };
            framebuffer.attach()?;
            Ok(framebuffer)
        }
    }

    /// Attaches the colour texture and allocates depth storage of the same size.
    fn attach(&self) -> Result<()> {
        let (width, height) = self.size();
        unsafe {
            let gl = &self.gl;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(self.color_tex.id()),
                0,
            );

            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(self.depth));
            gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::DEPTH_COMPONENT24,
                width as i32,
                height as i32,
            );
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(self.depth),
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                return Err(Error::FramebufferIncomplete(status));
            }
        }
        Ok(())
    }

    /// Binds the framebuffer for rendering and sets the viewport to cover it.
    pub fn bind(&self) {
        let (width, height) = self.size();
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
    }

    /// Unbinds the framebuffer, reverting to the default framebuffer.
    pub fn unbind(gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    /// Returns the color texture of the framebuffer.
    pub fn texture(&self) -> &Texture2D {
        &self.color_tex
    }

    pub fn size(&self) -> (u32, u32) {
        (self.color_tex.width(), self.color_tex.height())
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.size();
        width as f32 / height.max(1) as f32
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_renderbuffer(self.depth);
            self.gl.delete_framebuffer(self.fbo);
        }
    }
}
