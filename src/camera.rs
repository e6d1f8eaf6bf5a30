//! A fly-through camera driven by Euler angles.
//!
//! Input is fed in window-system independent terms ([`CameraMovement`], mouse
//! offsets, scroll amounts) and the camera produces the view matrix and its
//! projection.

use glam::{Mat4, Vec3};

pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 30.0;
pub const SENSITIVITY: f32 = 0.1;
pub const ZOOM: f32 = 45.0;

const PITCH_LIMIT: f32 = 89.0;
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Directions the camera can be moved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    yaw: f32,
    pitch: f32,

    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// A camera at `position` looking down -Z with +Y up.
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::Y, YAW, PITCH)
    }

    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection using the current zoom as vertical field of view.
    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.zoom.to_radians(), aspect_ratio, NEAR_PLANE, FAR_PLANE)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => self.position += self.up * velocity,
            CameraMovement::Down => self.position -= self.up * velocity,
        }
    }

    /// Turns the camera by mouse offsets; positive `yoffset` looks up.
    pub fn process_mouse_movement(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.yaw += xoffset * self.mouse_sensitivity;
        self.pitch += yoffset * self.mouse_sensitivity;

        // past ±90° the view flips
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, yoffset: f32) {
        self.zoom = (self.zoom - yoffset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        assert!(approx(camera.front(), Vec3::NEG_Z));
        assert!(approx(camera.right, Vec3::X));
        assert!(approx(camera.up, Vec3::Y));
        assert_eq!(camera.zoom(), ZOOM);
        assert_eq!(camera.movement_speed, SPEED);
    }

    #[test]
    fn keyboard_moves_along_camera_axes() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_keyboard(CameraMovement::Forward, 0.1);
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, -3.0)));
        camera.process_keyboard(CameraMovement::Right, 0.1);
        assert!(approx(camera.position, Vec3::new(3.0, 0.0, -3.0)));
        camera.process_keyboard(CameraMovement::Down, 0.1);
        assert!(approx(camera.position, Vec3::new(3.0, -3.0, -3.0)));
        camera.process_keyboard(CameraMovement::Backward, 0.1);
        camera.process_keyboard(CameraMovement::Left, 0.1);
        camera.process_keyboard(CameraMovement::Up, 0.1);
        assert!(approx(camera.position, Vec3::ZERO));
    }

    #[test]
    fn mouse_movement_turns_and_clamps_pitch() {
        let mut camera = Camera::new(Vec3::ZERO);
        // 900 * 0.1 = 90 degrees of yaw: from -Z to +X
        camera.process_mouse_movement(900.0, 0.0, true);
        assert!((camera.yaw() - 0.0).abs() < 1e-4);
        assert!(approx(camera.front(), Vec3::X));

        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(camera.pitch(), 89.0);
        camera.process_mouse_movement(0.0, -20_000.0, true);
        assert_eq!(camera.pitch(), -89.0);

        camera.process_mouse_movement(0.0, -100.0, false);
        assert!((camera.pitch() + 99.0).abs() < 1e-4);
    }

    #[test]
    fn basis_stays_orthonormal() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(123.0, 321.0, true);
        assert!((camera.front().length() - 1.0).abs() < 1e-5);
        assert!(camera.front().dot(camera.right).abs() < 1e-5);
        assert!(camera.front().dot(camera.up).abs() < 1e-5);
        assert!(camera.right.dot(camera.up).abs() < 1e-5);
    }

    #[test]
    fn scroll_zoom_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.zoom(), 35.0);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom(), 1.0);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom(), 45.0);
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(approx(origin, Vec3::new(0.0, 0.0, -5.0)));
    }
}
