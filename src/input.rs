//! Keyboard and mouse state gathered from SDL events, and the controls that
//! turn it into camera and light movement.

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;

use crate::camera::{Camera, CameraMovement};

/// Units per second a light moves while its keys are held.
pub const LIGHT_NUDGE_SPEED: f32 = 5.0;

/// The current state of the keyboard.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
    pub released: HashSet<Keycode>,
}

impl KeyboardState {
    pub fn is_down(&self, key: Keycode) -> bool {
        self.down.contains(&key)
    }
}

/// The current state of the mouse.
#[derive(Default)]
pub struct MouseState {
    pub position: Vec2,
    /// Relative motion this frame, in pixels, y pointing down.
    pub delta: Vec2,
    pub down: HashSet<MouseButton>,
    pub pressed: HashSet<MouseButton>,
    pub released: HashSet<MouseButton>,
    pub scroll_delta: Vec2,
}

/// Both device states, updated from the event queue once per frame.
#[derive(Default)]
pub struct InputState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl InputState {
    /// Clears everything that only lasts a single frame.
    pub fn begin_frame(&mut self) {
        self.mouse.delta = Vec2::ZERO;
        self.mouse.scroll_delta = Vec2::ZERO;
        self.mouse.pressed.clear();
        self.mouse.released.clear();
        self.keyboard.pressed.clear();
        self.keyboard.released.clear();
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::MouseMotion {
                x, y, xrel, yrel, ..
            } => {
                self.mouse.position = Vec2::new(*x as f32, *y as f32);
                self.mouse.delta += Vec2::new(*xrel as f32, *yrel as f32);
            }
            Event::MouseWheel { x, y, .. } => {
                self.mouse.scroll_delta += Vec2::new(*x as f32, *y as f32);
            }
            Event::MouseButtonDown { mouse_btn, .. } => {
                self.mouse.down.insert(*mouse_btn);
                self.mouse.pressed.insert(*mouse_btn);
            }
            Event::MouseButtonUp { mouse_btn, .. } => {
                self.mouse.down.remove(mouse_btn);
                self.mouse.released.insert(*mouse_btn);
            }
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => self.key_down(*keycode),
            Event::KeyUp {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => self.key_up(*keycode),
            Event::Window {
                win_event: sdl2::event::WindowEvent::FocusLost,
                ..
            } => {
                self.keyboard.down.clear();
                self.mouse.down.clear();
            }
            _ => {}
        }
    }

    pub fn key_down(&mut self, keycode: Keycode) {
        if self.keyboard.down.insert(keycode) {
            self.keyboard.pressed.insert(keycode);
        }
    }

    pub fn key_up(&mut self, keycode: Keycode) {
        if self.keyboard.down.remove(&keycode) {
            self.keyboard.released.insert(keycode);
        }
    }

    pub fn context(&self, delta_time: f32) -> UpdateContext<'_> {
        UpdateContext::new(&self.keyboard, &self.mouse, delta_time)
    }
}

/// Context provided to demos during the update phase.
pub struct UpdateContext<'a> {
    pub keyboard: &'a KeyboardState,
    pub mouse: &'a MouseState,
    pub delta_time: f32,
}

impl<'a> UpdateContext<'a> {
    /// Creates a new `UpdateContext` from the given keyboard and mouse states and delta time.
    pub fn new(keyboard: &'a KeyboardState, mouse: &'a MouseState, delta_time: f32) -> Self {
        Self {
            keyboard,
            mouse,
            delta_time,
        }
    }
}

const MOVEMENT_KEYS: [(Keycode, CameraMovement); 6] = [
    (Keycode::W, CameraMovement::Forward),
    (Keycode::S, CameraMovement::Backward),
    (Keycode::A, CameraMovement::Left),
    (Keycode::D, CameraMovement::Right),
    (Keycode::Space, CameraMovement::Up),
    (Keycode::LCtrl, CameraMovement::Down),
];

/// Fly-camera controls: WASD, Space and Left Ctrl move, the mouse looks around
/// while the right button is held, the wheel zooms.
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraController {
    looking: bool,
}

impl CameraController {
    pub fn update(&mut self, camera: &mut Camera, ctx: &UpdateContext) {
        for (key, movement) in MOVEMENT_KEYS {
            if ctx.keyboard.is_down(key) {
                camera.process_keyboard(movement, ctx.delta_time);
            }
        }

        let looking = ctx.mouse.down.contains(&MouseButton::Right);
        // the first frame of a drag carries the jump from wherever the cursor was
        if looking && self.looking && ctx.mouse.delta != Vec2::ZERO {
            camera.process_mouse_movement(ctx.mouse.delta.x, -ctx.mouse.delta.y, true);
        }
        self.looking = looking;

        if ctx.mouse.scroll_delta.y != 0.0 {
            camera.process_mouse_scroll(ctx.mouse.scroll_delta.y);
        }
    }

    /// Whether the cursor should be captured for mouse-look.
    pub fn wants_capture(&self) -> bool {
        self.looking
    }
}

/// Moves a point with the arrow keys (X/Y) and Page Down / Page Up (+Z / -Z).
pub fn nudge(position: &mut Vec3, keyboard: &KeyboardState, delta_time: f32) {
    let step = LIGHT_NUDGE_SPEED * delta_time;
    let bindings = [
        (Keycode::Right, Vec3::X),
        (Keycode::Left, Vec3::NEG_X),
        (Keycode::Up, Vec3::Y),
        (Keycode::Down, Vec3::NEG_Y),
        (Keycode::PageDown, Vec3::Z),
        (Keycode::PageUp, Vec3::NEG_Z),
    ];
    for (key, direction) in bindings {
        if keyboard.is_down(key) {
            *position += direction * step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_events_track_down_and_edges() {
        let mut input = InputState::default();
        input.key_down(Keycode::W);
        assert!(input.keyboard.is_down(Keycode::W));
        assert!(input.keyboard.pressed.contains(&Keycode::W));

        input.begin_frame();
        assert!(input.keyboard.is_down(Keycode::W));
        assert!(!input.keyboard.pressed.contains(&Keycode::W));

        input.key_up(Keycode::W);
        assert!(!input.keyboard.is_down(Keycode::W));
        assert!(input.keyboard.released.contains(&Keycode::W));
    }

    #[test]
    fn controller_moves_camera_with_keys() {
        let mut keyboard = KeyboardState::default();
        keyboard.down.insert(Keycode::W);
        let mouse = MouseState::default();
        let ctx = UpdateContext::new(&keyboard, &mouse, 0.1);

        let mut camera = Camera::new(Vec3::ZERO);
        let mut controller = CameraController::default();
        controller.update(&mut camera, &ctx);
        assert!((camera.position - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5);
        assert!(!controller.wants_capture());
    }

    #[test]
    fn mouse_look_needs_right_button_and_skips_first_frame() {
        let keyboard = KeyboardState::default();
        let mut mouse = MouseState::default();
        mouse.down.insert(MouseButton::Right);
        mouse.delta = Vec2::new(100.0, 0.0);

        let mut camera = Camera::new(Vec3::ZERO);
        let mut controller = CameraController::default();
        controller.update(&mut camera, &UpdateContext::new(&keyboard, &mouse, 0.016));
        assert_eq!(camera.yaw(), -90.0);
        assert!(controller.wants_capture());

        controller.update(&mut camera, &UpdateContext::new(&keyboard, &mouse, 0.016));
        assert!((camera.yaw() - -80.0).abs() < 1e-4);

        // dragging the mouse up looks up
        mouse.delta = Vec2::new(0.0, -50.0);
        controller.update(&mut camera, &UpdateContext::new(&keyboard, &mouse, 0.016));
        assert!((camera.pitch() - 5.0).abs() < 1e-4);

        mouse.down.clear();
        controller.update(&mut camera, &UpdateContext::new(&keyboard, &mouse, 0.016));
        assert!(!controller.wants_capture());
    }

    #[test]
    fn scroll_zooms() {
        let keyboard = KeyboardState::default();
        let mut mouse = MouseState::default();
        mouse.scroll_delta = Vec2::new(0.0, 5.0);
        let mut camera = Camera::new(Vec3::ZERO);
        CameraController::default().update(&mut camera, &UpdateContext::new(&keyboard, &mouse, 0.0));
        assert_eq!(camera.zoom(), 40.0);
    }

    #[test]
    fn nudge_moves_on_all_axes() {
        let mut keyboard = KeyboardState::default();
        keyboard.down.insert(Keycode::Right);
        keyboard.down.insert(Keycode::Up);
        keyboard.down.insert(Keycode::PageUp);
        let mut position = Vec3::ZERO;
        nudge(&mut position, &keyboard, 0.5);
        assert!((position - Vec3::new(2.5, 2.5, -2.5)).length() < 1e-5);
    }
}
