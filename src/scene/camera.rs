//! Camera with 3D perspective and 2D orthographic modes

use glam::{Mat4, Vec3};

/// Smallest screen size the camera will accept.
pub const MIN_SCREEN_WIDTH: f32 = 320.0;
pub const MIN_SCREEN_HEIGHT: f32 = 240.0;
/// Largest screen size the camera will accept.
pub const MAX_SCREEN_WIDTH: f32 = 7680.0;
pub const MAX_SCREEN_HEIGHT: f32 = 4320.0;

/// How the camera projects the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Standard 3D perspective projection.
    #[default]
    Perspective,
    /// Screen-space orthographic projection for 2D games; the origin is
    /// the top-left corner, y grows downward.
    Orthographic,
}

/// View and projection state for rendering.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Direction the camera is looking at
    pub front: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Field of view in degrees (perspective mode)
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Projection mode (3D perspective or 2D orthographic)
    pub mode: ProjectionMode,
    screen_width: f32,
    screen_height: f32,
}

impl Camera {
    /// Create a perspective camera for the given screen size.
    #[must_use]
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_degrees: 45.0,
            near: 0.1,
            far: 3000.0,
            mode: ProjectionMode::Perspective,
            screen_width: MIN_SCREEN_WIDTH,
            screen_height: MIN_SCREEN_HEIGHT,
        };
        camera.set_screen_size(screen_width, screen_height);
        camera
    }

    /// Create an orthographic camera for 2D rendering.
    #[must_use]
    pub fn new_2d(screen_width: u32, screen_height: u32) -> Self {
        let mut camera = Self::new(screen_width, screen_height);
        camera.mode = ProjectionMode::Orthographic;
        camera
    }

    /// Update the screen size, clamped to the supported range.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_width = (width as f32).clamp(MIN_SCREEN_WIDTH, MAX_SCREEN_WIDTH);
        self.screen_height = (height as f32).clamp(MIN_SCREEN_HEIGHT, MAX_SCREEN_HEIGHT);
    }

    #[must_use]
    pub fn screen_width(&self) -> f32 {
        self.screen_width
    }

    #[must_use]
    pub fn screen_height(&self) -> f32 {
        self.screen_height
    }

    /// Width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.screen_width / self.screen_height
    }

    /// Point the camera at a world-space target.
    pub fn look_at(&mut self, target: Vec3) {
        self.front = (target - self.position).normalize_or_zero();
    }

    /// View matrix for the current mode.
    ///
    /// Orthographic mode renders in screen space directly, so its view is
    /// the identity.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        match self.mode {
            ProjectionMode::Perspective => {
                Mat4::look_at_rh(self.position, self.position + self.front, self.up)
            }
            ProjectionMode::Orthographic => Mat4::IDENTITY,
        }
    }

    /// Projection matrix for the current mode.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.mode {
            ProjectionMode::Perspective => Mat4::perspective_rh(
                self.fov_degrees.to_radians(),
                self.aspect_ratio(),
                self.near,
                self.far,
            ),
            ProjectionMode::Orthographic => Mat4::orthographic_rh(
                0.0,
                self.screen_width,
                self.screen_height,
                0.0,
                -1.0,
                1.0,
            ),
        }
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Right vector, perpendicular to front and up.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.front.cross(self.up).normalize_or_zero()
    }

    /// Move along the view direction.
    pub fn move_forward(&mut self, amount: f32) {
        self.position += self.front * amount;
    }

    /// Strafe along the right vector.
    pub fn move_right(&mut self, amount: f32) {
        self.position += self.right() * amount;
    }

    /// Move along world up.
    pub fn move_up(&mut self, amount: f32) {
        self.position += Vec3::Y * amount;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_size_is_clamped() {
        let mut camera = Camera::new(800, 600);

        camera.set_screen_size(10, 10);
        assert_eq!(camera.screen_width(), MIN_SCREEN_WIDTH);
        assert_eq!(camera.screen_height(), MIN_SCREEN_HEIGHT);

        camera.set_screen_size(100_000, 100_000);
        assert_eq!(camera.screen_width(), MAX_SCREEN_WIDTH);
        assert_eq!(camera.screen_height(), MAX_SCREEN_HEIGHT);
    }

    #[test]
    fn test_aspect_ratio() {
        let camera = Camera::new(1600, 900);
        assert!((camera.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_2d_mode_projects_screen_space() {
        let camera = Camera::new_2d(800, 600);
        assert_eq!(camera.view_matrix(), Mat4::IDENTITY);

        // Top-left corner maps to clip-space (-1, 1).
        let vp = camera.view_projection_matrix();
        let corner = vp.project_point3(Vec3::ZERO);
        assert!((corner.x + 1.0).abs() < 1e-6);
        assert!((corner.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_look_at() {
        let mut camera = Camera::new(800, 600);
        camera.position = Vec3::ZERO;
        camera.look_at(Vec3::new(10.0, 0.0, 0.0));
        assert!(camera.front.abs_diff_eq(Vec3::X, 1e-6));
    }
}
