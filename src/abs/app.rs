//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use glow::HasContext;

use crate::config::WindowSettings;
use crate::error::{Error, Result};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates the window and a GL 3.3 core context according to `settings`.
    ///
    /// When `fullscreen` is set the requested width and height are replaced by the
    /// desktop resolution.
    pub fn new(settings: &WindowSettings) -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::Platform)?;
        let video_subsystem = sdl.video().map_err(Error::Platform)?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);
        if cfg!(target_os = "macos") {
            gl_attr.set_context_flags().forward_compatible().set();
        }

        let (width, height) = if settings.fullscreen {
            let mode = video_subsystem
                .current_display_mode(0)
                .map_err(Error::Platform)?;
            (mode.w as u32, mode.h as u32)
        } else {
            (settings.width, settings.height)
        };

        log::info!("Creating window {}x{}", width, height);
        let mut builder = video_subsystem.window(&settings.title, width, height);
        builder.opengl().resizable().position_centered();
        if settings.maximized {
            builder.maximized();
        }
        let mut window = builder
            .build()
            .map_err(|e| Error::Platform(e.to_string()))?;
        if settings.fullscreen {
            window
                .set_fullscreen(sdl2::video::FullscreenType::Desktop)
                .map_err(Error::Platform)?;
        }

        let gl_context = window.gl_create_context().map_err(Error::Platform)?;
        window
            .gl_make_current(&gl_context)
            .map_err(Error::Platform)?;

        let interval = if settings.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("Could not set swap interval: {}", e);
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(Error::Platform)?;

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
        })
    }

    /// Logs the SDL version and the capabilities of the current GL context.
    pub fn log_info(&self) {
        let version = sdl2::version::version();
        log::info!("SDL: {}", version);

        let gl_attr = self.video_subsystem.gl_attr();
        let profile = match gl_attr.context_profile() {
            sdl2::video::GLProfile::Core => "OpenGL Core Profile",
            sdl2::video::GLProfile::Compatibility => "OpenGL Compatibility Profile",
            sdl2::video::GLProfile::GLES => "OpenGL ES Profile",
            sdl2::video::GLProfile::Unknown(_) => "Unknown Profile",
        };
        log::info!("SDL: {}", profile);

        unsafe {
            log::info!("OpenGL: GL version {}", self.gl.get_parameter_string(glow::VERSION));
            log::info!(
                "OpenGL: GLSL version: {}",
                self.gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION)
            );
            log::info!("OpenGL: Vendor: {}", self.gl.get_parameter_string(glow::VENDOR));
            log::info!("OpenGL: Renderer: {}", self.gl.get_parameter_string(glow::RENDERER));
        }
    }

    /// Size of the default framebuffer in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    /// Presents the back buffer.
    pub fn swap(&self) {
        self.window.gl_swap_window();
    }

    /// Hides the cursor and switches to relative mouse motion while `captured`.
    pub fn set_mouse_captured(&self, captured: bool) {
        let mouse = self.sdl.mouse();
        if mouse.relative_mouse_mode() != captured {
            mouse.set_relative_mouse_mode(captured);
        }
    }
}
