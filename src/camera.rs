//! Fly camera and projection math.
//!
//! The camera keeps a position and a front vector derived from yaw/pitch
//! Euler angles, plus a field of view driven by the scroll wheel. Look input
//! is raw mouse motion deltas; absolute cursor positions are a fallback for
//! platforms without raw motion, where the first sample only seeds the
//! reference position so the view does not jump when the cursor enters the
//! window.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::keyboard::KeyCode;

/// Pitch is constrained to this range (degrees) so the view never flips over.
pub const PITCH_LIMIT: f32 = 89.0;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Pressed/not-pressed state of the four movement keys, sampled once per
/// frame when the camera advances.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    /// Record a key transition. Returns false for keys this demo ignores.
    pub fn handle_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        match code {
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.backward = pressed,
            KeyCode::KeyA => self.left = pressed,
            KeyCode::KeyD => self.right = pressed,
            _ => return false,
        }
        true
    }
}

#[derive(Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    fov: f32,
    min_fov: f32,
    max_fov: f32,
    move_speed: f32,
    sensitivity: f32,
    last_cursor: Option<(f32, f32)>,
}

impl Camera {
    pub fn new(
        position: Point3<f32>,
        move_speed: f32,
        sensitivity: f32,
        fov: f32,
        min_fov: f32,
        max_fov: f32,
    ) -> Self {
        Self {
            position,
            front: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            fov,
            min_fov,
            max_fov,
            move_speed,
            sensitivity,
            last_cursor: None,
        }
    }

    /// Advance the position from the currently pressed movement keys.
    pub fn process_keyboard(&mut self, input: &InputState, dt: f32) {
        let speed = self.move_speed * dt;
        if input.forward {
            self.position += self.front * speed;
        }
        if input.backward {
            self.position -= self.front * speed;
        }
        let sideways = self.front.cross(self.up).normalize();
        if input.left {
            self.position -= sideways * speed;
        }
        if input.right {
            self.position += sideways * speed;
        }
    }

    /// Turn the camera from a raw mouse delta. This is the primary look
    /// path; with a locked cursor it is the only one that still gets input.
    pub fn process_mouse_delta(&mut self, dx: f32, dy: f32) {
        // Screen y grows downward, pitch grows upward.
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let (yaw_sin, yaw_cos) = Rad::from(Deg(self.yaw)).0.sin_cos();
        let (pitch_sin, pitch_cos) = Rad::from(Deg(self.pitch)).0.sin_cos();
        self.front = Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
    }

    /// Turn the camera from an absolute cursor sample, for platforms that
    /// deliver no raw mouse motion.
    pub fn process_mouse_movement(&mut self, x: f32, y: f32) {
        let Some((last_x, last_y)) = self.last_cursor else {
            self.last_cursor = Some((x, y));
            return;
        };
        self.last_cursor = Some((x, y));
        self.process_mouse_delta(x - last_x, y - last_y);
    }

    /// Zoom by adjusting the field of view from a scroll delta.
    pub fn process_scroll(&mut self, dy: f32) {
        self.fov = (self.fov - dy).clamp(self.min_fov, self.max_fov);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// View matrix with the translation stripped, for geometry that should
    /// stay centred on the camera (the skybox).
    pub fn rotation_view_matrix(&self) -> Matrix4<f32> {
        let mut view = self.view_matrix();
        view.w = cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        view
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

/// Perspective projection tied to the window aspect ratio. The vertical FOV
/// comes from the camera each frame so scroll zoom takes effect immediately.
#[derive(Debug)]
pub struct Projection {
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn matrix(&self, fovy: Deg<f32>) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(fovy, self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Point3::new(0.0, 0.0, 5.0), 2.5, 0.4, 70.0, 0.1, 120.0)
    }

    fn assert_close3(actual: [f32; 3], expected: [f32; 3]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn initial_front_looks_down_negative_z() {
        let cam = camera();
        assert_close3(cam.front().into(), [0.0, 0.0, -1.0]);
        assert_close3(cam.position.into(), [0.0, 0.0, 5.0]);
    }

    #[test]
    fn first_mouse_sample_does_not_turn_the_camera() {
        let mut cam = camera();
        cam.process_mouse_movement(400.0, 300.0);
        assert_close3(cam.front().into(), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn raw_deltas_turn_the_camera_without_a_cursor_seed() {
        // With a locked cursor the only look input is raw motion deltas;
        // they must turn the camera on their own, no absolute sample first.
        let mut cam = camera();
        // 225 px at 0.4 deg/px swings yaw from -90 to 0.
        cam.process_mouse_delta(225.0, 0.0);
        assert_close3(cam.front().into(), [1.0, 0.0, 0.0]);

        // Moving the mouse down pitches the view down.
        cam.process_mouse_delta(0.0, 50.0);
        assert!(cam.pitch() < 0.0);
    }

    #[test]
    fn pitch_is_clamped_for_any_input_magnitude() {
        let mut cam = camera();
        cam.process_mouse_movement(0.0, 0.0);
        cam.process_mouse_movement(0.0, -1.0e6);
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        // Front still normalized and pointing nearly straight up.
        assert!((cam.front().magnitude() - 1.0).abs() < 1e-5);
        assert!(cam.front().y > 0.99);

        cam.process_mouse_movement(0.0, 1.0e6);
        assert_eq!(cam.pitch(), -PITCH_LIMIT);
        assert!(cam.front().y < -0.99);
    }

    #[test]
    fn fov_is_clamped_between_min_and_max() {
        let mut cam = camera();
        cam.process_scroll(-5.0);
        assert_eq!(cam.fov(), 75.0);
        cam.process_scroll(-1000.0);
        assert_eq!(cam.fov(), 120.0);
        cam.process_scroll(200.0);
        assert_eq!(cam.fov(), 0.1);
    }

    #[test]
    fn wasd_moves_relative_to_the_view_direction() {
        let mut cam = camera();
        let input = InputState {
            forward: true,
            ..Default::default()
        };
        cam.process_keyboard(&input, 1.0);
        assert_close3(cam.position.into(), [0.0, 0.0, 2.5]);

        let input = InputState {
            right: true,
            ..Default::default()
        };
        cam.process_keyboard(&input, 1.0);
        assert_close3(cam.position.into(), [2.5, 0.0, 2.5]);
    }

    #[test]
    fn rotation_view_has_no_translation() {
        let mut cam = camera();
        cam.position = Point3::new(10.0, -3.0, 7.0);
        let rot = cam.rotation_view_matrix();
        assert_eq!(rot.w, cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0));
    }
}
