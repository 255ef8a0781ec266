use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

const MOUSE_SENSITIVITY: f32 = 0.1;
const DEFAULT_SPEED: f32 = 10.0;
const MIN_SPEED: f32 = 1.0;
const MAX_SPEED: f32 = 60.0;

/// First-person fly camera.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,   // degrees around Y, -90 looks down -Z
    pub pitch: f32, // degrees around X
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub moving_forward: bool,
    pub moving_backward: bool,
    pub moving_left: bool,
    pub moving_right: bool,
    pub moving_up: bool,
    pub moving_down: bool,
}

impl Camera {
    pub fn new(position: Vec3, aspect: f32) -> Self {
        Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            aspect,
            near: 0.1,
            far: 200.0,
            speed: DEFAULT_SPEED,
            moving_forward: false,
            moving_backward: false,
            moving_left: false,
            moving_right: false,
            moving_up: false,
            moving_down: false,
        }
    }

    /// Places the camera at `position` facing `target`.
    pub fn looking_at(position: Vec3, target: Vec3, aspect: f32) -> Self {
        let mut camera = Self::new(position, aspect);
        let direction = (target - position).normalize_or_zero();
        if direction != Vec3::ZERO {
            camera.yaw = direction.z.atan2(direction.x).to_degrees();
            camera.pitch = direction.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-89.0, 89.0);
        }
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.view_direction(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn get_forward(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(yaw_cos, 0.0, yaw_sin).normalize()
    }

    pub fn get_right(&self) -> Vec3 {
        self.get_forward().cross(Vec3::Y).normalize()
    }

    pub fn view_direction(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch - dy * MOUSE_SENSITIVITY).clamp(-89.0, 89.0);
    }

    /// Scroll wheel changes movement speed.
    pub fn process_scroll(&mut self, lines: f32) {
        self.speed = (self.speed + lines).clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn update(&mut self, dt: f32) {
        let velocity = self.speed * dt;
        let forward = self.get_forward();
        let right = self.get_right();

        if self.moving_forward {
            self.position += forward * velocity;
        }
        if self.moving_backward {
            self.position -= forward * velocity;
        }
        if self.moving_right {
            self.position += right * velocity;
        }
        if self.moving_left {
            self.position -= right * velocity;
        }
        if self.moving_up {
            self.position.y += velocity;
        }
        if self.moving_down {
            self.position.y -= velocity;
        }
    }

    pub fn process_keyboard(&mut self, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::KeyW => self.moving_forward = pressed,
            KeyCode::KeyS => self.moving_backward = pressed,
            KeyCode::KeyA => self.moving_left = pressed,
            KeyCode::KeyD => self.moving_right = pressed,
            KeyCode::Space | KeyCode::KeyQ => self.moving_up = pressed,
            KeyCode::ShiftLeft | KeyCode::KeyE => self.moving_down = pressed,
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_initialization() {
        let camera = Camera::new(Vec3::new(0.0, 24.0, 32.0), 16.0 / 9.0);
        assert_eq!(camera.position, Vec3::new(0.0, 24.0, 32.0));
        assert_eq!(camera.yaw, -90.0);
        assert_eq!(camera.pitch, 0.0);
        assert_eq!(camera.aspect, 16.0 / 9.0);
        assert_eq!(camera.speed, DEFAULT_SPEED);
        assert!(camera.far > 42.0 * 2.0);
        assert!(!camera.moving_forward);
        assert!(!camera.moving_up);
        assert!(!camera.moving_down);
    }

    #[test]
    fn test_looking_at_points_toward_target() {
        let position = Vec3::new(0.0, 24.0, 32.0);
        let target = Vec3::new(0.0, 14.0, -14.0);
        let camera = Camera::looking_at(position, target, 1.0);
        let expected = (target - position).normalize();
        let dir = camera.view_direction();
        assert_relative_eq!(dir.x, expected.x, epsilon = 0.001);
        assert_relative_eq!(dir.y, expected.y, epsilon = 0.001);
        assert_relative_eq!(dir.z, expected.z, epsilon = 0.001);
    }

    #[test]
    fn test_view_direction() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);

        let dir = camera.view_direction();
        assert_relative_eq!(dir.x, 0.0, epsilon = 0.001);
        assert_relative_eq!(dir.y, 0.0, epsilon = 0.001);
        assert_relative_eq!(dir.z, -1.0, epsilon = 0.001);

        camera.yaw = 0.0;
        let dir = camera.view_direction();
        assert_relative_eq!(dir.x, 1.0, epsilon = 0.001);
        assert_relative_eq!(dir.z, 0.0, epsilon = 0.001);

        camera.pitch = 90.0;
        let dir = camera.view_direction();
        assert_relative_eq!(dir.y, 1.0, epsilon = 0.001);
    }

    #[test]
    fn test_movement_directions() {
        let camera = Camera::new(Vec3::ZERO, 1.0);

        let forward = camera.get_forward();
        assert_relative_eq!(forward.x, 0.0, epsilon = 0.001);
        assert_relative_eq!(forward.z, -1.0, epsilon = 0.001);

        let right = camera.get_right();
        assert_relative_eq!(right.x, 1.0, epsilon = 0.001);
        assert_relative_eq!(right.z, 0.0, epsilon = 0.001);
    }

    #[test]
    fn test_vertical_keys() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        for key in [KeyCode::Space, KeyCode::KeyQ] {
            camera.process_keyboard(key, true);
            assert!(camera.moving_up, "{:?} should move up", key);
            camera.process_keyboard(key, false);
            assert!(!camera.moving_up);
        }
        for key in [KeyCode::ShiftLeft, KeyCode::KeyE] {
            camera.process_keyboard(key, true);
            assert!(camera.moving_down, "{:?} should move down", key);
            camera.process_keyboard(key, false);
            assert!(!camera.moving_down);
        }
    }

    #[test]
    fn test_mouse_movement() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);

        camera.process_mouse(100.0, 0.0);
        assert_relative_eq!(camera.yaw, -90.0 + 100.0 * MOUSE_SENSITIVITY, epsilon = 0.001);

        camera.process_mouse(0.0, -100.0);
        assert_relative_eq!(camera.pitch, 100.0 * MOUSE_SENSITIVITY, epsilon = 0.001);

        camera.process_mouse(0.0, -10_000.0);
        assert_relative_eq!(camera.pitch, 89.0, epsilon = 0.001);

        camera.process_mouse(0.0, 10_000.0);
        assert_relative_eq!(camera.pitch, -89.0, epsilon = 0.001);
    }

    #[test]
    fn test_scroll_clamps_speed() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.process_scroll(5.0);
        assert_relative_eq!(camera.speed, DEFAULT_SPEED + 5.0);
        camera.process_scroll(-1000.0);
        assert_relative_eq!(camera.speed, MIN_SPEED);
        camera.process_scroll(1000.0);
        assert_relative_eq!(camera.speed, MAX_SPEED);
    }

    #[test]
    fn test_movement_update() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.moving_forward = true;
        camera.update(1.0);
        assert_relative_eq!(camera.position.z, -DEFAULT_SPEED, epsilon = 0.001);

        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.moving_right = true;
        camera.update(0.5);
        assert_relative_eq!(camera.position.x, DEFAULT_SPEED * 0.5, epsilon = 0.001);
    }

    #[test]
    fn test_resize_ignores_zero_height() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.resize(1280, 720);
        assert_relative_eq!(camera.aspect, 1280.0 / 720.0);
        camera.resize(1280, 0);
        assert_relative_eq!(camera.aspect, 1280.0 / 720.0);
    }

    #[test]
    fn test_view_matrix_changes() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let initial_matrix = camera.build_view_projection_matrix();

        camera.position = Vec3::new(1.0, 1.0, 5.0);
        let moved_matrix = camera.build_view_projection_matrix();
        assert_ne!(initial_matrix, moved_matrix);

        camera.yaw = 0.0;
        let rotated_matrix = camera.build_view_projection_matrix();
        assert_ne!(moved_matrix, rotated_matrix);
    }
}
