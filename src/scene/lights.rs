//! Point and directional lights

use glam::{Mat4, Vec3};
use log::warn;
use smallvec::SmallVec;

/// Maximum number of point lights the renderer consumes.
pub const MAX_POINT_LIGHTS: usize = 4;

// Extents of the orthographic volume used for the directional light's
// shadow projection.
const SHADOW_ORTHO_EXTENT: f32 = 20.0;
const SHADOW_NEAR: f32 = 0.1;
const SHADOW_FAR: f32 = 100.0;
/// Distance the virtual shadow camera sits from the focus point.
const SHADOW_DISTANCE: f32 = 30.0;

/// Light radiating from a point, with distance attenuation.
#[derive(Debug, Clone)]
pub struct PointLight {
    /// World position
    pub position: Vec3,
    /// Light color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Attenuation: constant, linear, quadratic
    pub attenuation: (f32, f32, f32),
    /// Disabled lights keep their slot but contribute nothing
    pub enabled: bool,
}

impl PointLight {
    /// Create a point light with the standard attenuation curve.
    #[must_use]
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            attenuation: (1.0, 0.09, 0.032),
            enabled: true,
        }
    }

    /// Set attenuation values.
    #[must_use]
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.attenuation = (constant, linear, quadratic);
        self
    }
}

/// Parallel-ray light, like the sun. Also drives shadow mapping via its
/// light-space matrix.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Direction the light travels (normalized)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Disabled lights contribute nothing
    pub enabled: bool,
}

impl DirectionalLight {
    /// Create a directional light.
    #[must_use]
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            color,
            intensity,
            enabled: true,
        }
    }

    /// Matrix mapping world space into the light's clip space, for
    /// shadow-map rendering. `focus` is the world point the shadow
    /// volume is centered on, typically the camera target.
    #[must_use]
    pub fn light_space_matrix(&self, focus: Vec3) -> Mat4 {
        let projection = Mat4::orthographic_rh(
            -SHADOW_ORTHO_EXTENT,
            SHADOW_ORTHO_EXTENT,
            -SHADOW_ORTHO_EXTENT,
            SHADOW_ORTHO_EXTENT,
            SHADOW_NEAR,
            SHADOW_FAR,
        );
        let eye = focus - self.direction * SHADOW_DISTANCE;
        // A light looking straight down would be parallel to Y; fall back
        // to Z as the up reference there.
        let up = if self.direction.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(eye, focus, up);
        projection * view
    }
}

/// The scene's light setup: up to [`MAX_POINT_LIGHTS`] point lights and
/// one directional light.
#[derive(Debug, Default)]
pub struct Lights {
    points: SmallVec<[PointLight; MAX_POINT_LIGHTS]>,
    directional: Option<DirectionalLight>,
}

impl Lights {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point light. Returns its slot index, or `None` (with a
    /// warning) when all slots are taken.
    pub fn add_point_light(&mut self, light: PointLight) -> Option<usize> {
        if self.points.len() >= MAX_POINT_LIGHTS {
            warn!("lights: all {MAX_POINT_LIGHTS} point light slots in use, ignoring new light");
            return None;
        }
        self.points.push(light);
        Some(self.points.len() - 1)
    }

    /// Set or replace the directional light.
    pub fn set_directional(&mut self, light: DirectionalLight) {
        self.directional = Some(light);
    }

    #[must_use]
    pub fn directional(&self) -> Option<&DirectionalLight> {
        self.directional.as_ref()
    }

    #[must_use]
    pub fn point_light(&self, slot: usize) -> Option<&PointLight> {
        self.points.get(slot)
    }

    pub fn point_light_mut(&mut self, slot: usize) -> Option<&mut PointLight> {
        self.points.get_mut(slot)
    }

    /// Enabled point lights, in slot order.
    pub fn enabled_points(&self) -> impl Iterator<Item = &PointLight> {
        self.points.iter().filter(|l| l.enabled)
    }

    /// Number of point light slots in use (enabled or not).
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Remove every light.
    pub fn clear(&mut self) {
        self.points.clear();
        self.directional = None;
    }
}
