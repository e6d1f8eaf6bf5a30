use std::path::PathBuf;

use anyhow::Context;
use glow::HasContext;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;

use crate::abs::App;
use crate::config::Settings;
use crate::demos::{DemoKind, DemoManager, FrameContext};
use crate::input::InputState;
use crate::time::{FpsCounter, FrameClock};

mod abs;
mod camera;
mod config;
mod demos;
mod error;
mod input;
mod logging;
mod render;
mod scene;
mod time;

fn number_key(keycode: Keycode) -> Option<usize> {
    match keycode {
        Keycode::Num1 => Some(1),
        Keycode::Num2 => Some(2),
        Keycode::Num3 => Some(3),
        Keycode::Num4 => Some(4),
        Keycode::Num5 => Some(5),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref()).context("Failed to load settings")?;
    logging::init(&settings.log).context("Failed to initialise logging")?;

    let mut app = App::new(&settings.window).context("Failed to create window")?;
    app.log_info();

    unsafe {
        app.gl.enable(glow::DEPTH_TEST);
    }

    run(&mut app, settings)
}

fn run(app: &mut App, settings: Settings) -> anyhow::Result<()> {
    let mut demos = DemoManager::new(settings.demo, &app.gl, &settings)
        .with_context(|| format!("Failed to start demo {}", settings.demo))?;

    let mut clock = FrameClock::new();
    let mut fps = FpsCounter::default();
    let mut input = InputState::default();
    let mut wireframe = settings.render.wireframe;
    let clear = settings.render.clear_color();
    let mut window_events = Vec::new();

    'running: loop {
        let time = clock.tick();
        if fps.update(time.dt) {
            log::debug!(
                "Frame {}: {:.1} fps, {:.2} ms",
                time.frame_index,
                fps.fps(),
                fps.frame_ms()
            );
        }

        input.begin_frame();
        window_events.extend(app.event_pump.poll_iter());
        for event in &window_events {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    let (w, h) = app.drawable_size();
                    log::debug!("Resized to {}x{}", w, h);
                    unsafe {
                        app.gl.viewport(0, 0, w as i32, h as i32);
                    }
                }
                Event::KeyDown {
                    keycode: Some(Keycode::F1),
                    repeat: false,
                    ..
                } => {
                    wireframe = !wireframe;
                    log::info!("Wireframe {}", if wireframe { "on" } else { "off" });
                }
                Event::KeyDown {
                    keycode: Some(Keycode::Tab),
                    repeat: false,
                    ..
                } => {
                    demos.switch_to(demos.kind().next(), &app.gl, &settings);
                    clock.reset();
                }
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } if number_key(*keycode).is_some() => {
                    if let Some(kind) = number_key(*keycode).and_then(DemoKind::from_number) {
                        demos.switch_to(kind, &app.gl, &settings);
                        clock.reset();
                    }
                }
                _ => {}
            }
            input.handle_event(event);
            demos.handle_event(event);
        }
        window_events.clear();

        app.set_mouse_captured(demos.wants_mouse_capture());
        demos.update(&input.context(time.dt));

        let size = app.drawable_size();
        unsafe {
            app.gl.viewport(0, 0, size.0 as i32, size.1 as i32);
            app.gl.clear_color(clear.x, clear.y, clear.z, clear.w);
            app.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            app.gl.polygon_mode(
                glow::FRONT_AND_BACK,
                if wireframe { glow::LINE } else { glow::FILL },
            );
        }

        let frame = FrameContext {
            size,
            time,
            fps: fps.fps(),
            frame_ms: fps.frame_ms(),
        };
        if let Err(e) = demos.render(&frame) {
            log::error!("{} demo failed to render: {}", demos.kind(), e);
        }

        app.swap();
    }

    log::info!("Shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_pick_demos() {
        assert_eq!(number_key(Keycode::Num1).and_then(DemoKind::from_number), Some(DemoKind::Triangle));
        assert_eq!(number_key(Keycode::Num5).and_then(DemoKind::from_number), Some(DemoKind::Viewport));
        assert_eq!(number_key(Keycode::Num6), None);
    }
}
