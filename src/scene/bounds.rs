//! Axis-aligned bounding volumes

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in 3D, stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// A box that contains nothing; merging a point into it yields a
    /// point-sized box.
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create a box from its corners.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every given point.
    ///
    /// Returns [`EMPTY`](Self::EMPTY) for an empty iterator.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bounds = Self::EMPTY;
        for p in points {
            bounds.expand_to(p);
        }
        bounds
    }

    /// Grow to include a point.
    pub fn expand_to(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether the point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Whether the boxes overlap (touching counts).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Whether max has not caught up to min on some axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Box center point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Axis-aligned bounds of this box after a matrix transform.
    ///
    /// Transforms all eight corners and wraps a fresh box around them,
    /// so rotations produce a conservative (larger) result.
    #[must_use]
    pub fn transformed(&self, matrix: Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        Self::from_points(corners.iter().map(|&c| matrix.transform_point3(c)))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Axis-aligned rectangle in 2D, stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2D {
    pub min: Vec2,
    pub max: Vec2,
}

impl BoundingBox2D {
    /// Create a rectangle from its corners.
    #[must_use]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from its center and full size.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Whether the point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Whether the rectangles overlap (touching counts).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Rectangle center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let b = BoundingBox::from_points([
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 4.0, 2.0),
            Vec3::new(0.5, 0.0, -3.0),
        ]);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(b.max, Vec3::new(1.0, 4.0, 2.0));
    }

    #[test]
    fn test_contains_is_edge_inclusive() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        assert!(b.contains(Vec3::ZERO));
        assert!(b.contains(Vec3::ONE));
        assert!(b.contains(Vec3::splat(0.5)));
        assert!(!b.contains(Vec3::new(1.01, 0.5, 0.5)));
    }

    #[test]
    fn test_merge_and_empty() {
        let a = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        assert!(BoundingBox::EMPTY.is_empty());
        let merged = BoundingBox::EMPTY.merge(&a);
        assert_eq!(merged, a);
    }

    #[test]
    fn test_transformed_translation() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        let moved = b.transformed(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(moved.max, Vec3::new(6.0, 1.0, 1.0));
    }

    #[test]
    fn test_transformed_rotation_is_conservative() {
        // A unit box spun 45 degrees around Y needs sqrt(2) of room in X/Z.
        let b = BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5));
        let spun = b.transformed(Mat4::from_rotation_y(45.0_f32.to_radians()));
        assert!((spun.size().x - 2.0_f32.sqrt()).abs() < 1e-5);
        assert!((spun.size().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rect_contains_and_intersects() {
        let r = BoundingBox2D::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(r.contains(Vec2::ZERO));
        assert!(r.contains(Vec2::splat(10.0)));
        assert!(!r.contains(Vec2::new(10.1, 5.0)));

        let other = BoundingBox2D::new(Vec2::splat(10.0), Vec2::splat(20.0));
        assert!(r.intersects(&other), "touching rectangles intersect");
        let far = BoundingBox2D::new(Vec2::splat(10.5), Vec2::splat(20.0));
        assert!(!r.intersects(&far));
    }

    #[test]
    fn test_rect_from_center_size() {
        let r = BoundingBox2D::from_center_size(Vec2::new(5.0, 5.0), Vec2::new(4.0, 2.0));
        assert_eq!(r.min, Vec2::new(3.0, 4.0));
        assert_eq!(r.max, Vec2::new(7.0, 6.0));
        assert_eq!(r.center(), Vec2::new(5.0, 5.0));
    }
}
