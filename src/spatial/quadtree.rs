//! Point Quadtree
//!
//! Recursive spatial index over a 2D region. Every level of the tree
//! holds at most one point and, once it has to route points further
//! down, exactly four children covering its quadrants (NW, SW, NE, SE).
//!
//! Points fill the tree top-down: a level takes the first point offered
//! to it and only routes later points into children. That gives the
//! search its pruning rule; an empty level cannot have descendants with
//! points, so the walk stops there.
//!
//! Subdivision stops at cells of [`MIN_CELL_SIZE`] units. Inserting into
//! an occupied minimum cell is dropped with a warning; when that fires,
//! too many points sit closer together than the tree can separate.
//!
//! The tree is cheap to rebuild, and games that track moving points are
//! expected to clear and re-insert each frame rather than mutate in
//! place.

use glam::Vec2;
use log::warn;

use crate::scene::BoundingBox2D;

/// Cells are never subdivided below this edge length.
pub const MIN_CELL_SIZE: f32 = 1.0;

// Child order. The y axis grows downward, so "north" is min.y.
const NORTHWEST: usize = 0;
const SOUTHWEST: usize = 1;
const NORTHEAST: usize = 2;
const SOUTHEAST: usize = 3;

// ============================================================================
// Nodes
// ============================================================================

struct Node<T> {
    bounds: BoundingBox2D,
    point: Option<(Vec2, T)>,
    children: Option<Box<[Node<T>; 4]>>,
}

impl<T> Node<T> {
    fn new(bounds: BoundingBox2D) -> Self {
        Self {
            bounds,
            point: None,
            children: None,
        }
    }

    fn is_minimum_cell(&self) -> bool {
        let size = self.bounds.size();
        size.x.abs() <= MIN_CELL_SIZE && size.y.abs() <= MIN_CELL_SIZE
    }

    /// Which quadrant a point belongs to. Points on the midpoint go
    /// left / top.
    fn quadrant_of(&self, point: Vec2) -> usize {
        let mid = self.bounds.center();
        let left = mid.x >= point.x;
        let top = mid.y >= point.y;
        match (left, top) {
            (true, true) => NORTHWEST,
            (true, false) => SOUTHWEST,
            (false, true) => NORTHEAST,
            (false, false) => SOUTHEAST,
        }
    }

    fn make_children(bounds: BoundingBox2D) -> Box<[Node<T>; 4]> {
        let min = bounds.min;
        let max = bounds.max;
        let mid = bounds.center();
        Box::new([
            Node::new(BoundingBox2D::new(min, mid)),
            Node::new(BoundingBox2D::new(Vec2::new(min.x, mid.y), Vec2::new(mid.x, max.y))),
            Node::new(BoundingBox2D::new(Vec2::new(mid.x, min.y), Vec2::new(max.x, mid.y))),
            Node::new(BoundingBox2D::new(mid, max)),
        ])
    }

    fn insert(&mut self, point: Vec2, value: T) -> bool {
        if self.is_minimum_cell() {
            if self.point.is_none() {
                self.point = Some((point, value));
                return true;
            }
            warn!(
                "quadtree: minimum cell at ({}, {}) already occupied, dropping point; \
                 too many points too close together",
                self.bounds.min.x, self.bounds.min.y
            );
            return false;
        }

        if self.point.is_none() {
            self.point = Some((point, value));
            return true;
        }

        let quadrant = self.quadrant_of(point);
        let bounds = self.bounds;
        let children = self
            .children
            .get_or_insert_with(|| Self::make_children(bounds));
        children[quadrant].insert(point, value)
    }

    fn search<'a>(&'a self, region: &BoundingBox2D, out: &mut Vec<&'a T>) {
        // An empty level has an empty subtree; points fill top-down.
        let Some((point, value)) = &self.point else {
            return;
        };

        if !self.bounds.intersects(region) {
            return;
        }

        if region.contains(*point) {
            out.push(value);
        }

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.search(region, out);
            }
        }
    }

    fn count(&self) -> usize {
        let mut n = usize::from(self.point.is_some());
        if let Some(children) = &self.children {
            for child in children.iter() {
                n += child.count();
            }
        }
        n
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(Vec2, &'a T)) {
        if let Some((point, value)) = &self.point {
            f(*point, value);
        }
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.visit(f);
            }
        }
    }

    fn visit_cells(&self, f: &mut impl FnMut(BoundingBox2D, Option<Vec2>)) {
        f(self.bounds, self.point.as_ref().map(|(p, _)| *p));
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.visit_cells(f);
            }
        }
    }
}

// ============================================================================
// Tree
// ============================================================================

/// Point quadtree over a fixed 2D region.
pub struct QuadTree<T> {
    root: Node<T>,
}

impl<T> QuadTree<T> {
    /// Create an empty tree covering `bounds`.
    #[must_use]
    pub fn new(bounds: BoundingBox2D) -> Self {
        Self {
            root: Node::new(bounds),
        }
    }

    /// Region the tree covers.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox2D {
        self.root.bounds
    }

    /// Insert a point with its value.
    ///
    /// Returns `false` (with a logged warning) when the point is outside
    /// the tree's bounds, or when it lands in a minimum-size cell that is
    /// already occupied.
    pub fn insert(&mut self, point: Vec2, value: T) -> bool {
        if !self.root.bounds.contains(point) {
            warn!(
                "quadtree: point ({}, {}) is outside the tree bounds, dropping it",
                point.x, point.y
            );
            return false;
        }
        self.root.insert(point, value)
    }

    /// Append every value whose point lies inside `region` to `out`.
    ///
    /// `out` is not cleared first, so results can be accumulated across
    /// several queries.
    pub fn search_into<'a>(&'a self, region: &BoundingBox2D, out: &mut Vec<&'a T>) {
        self.root.search(region, out);
    }

    /// Collect every value whose point lies inside `region`.
    #[must_use]
    pub fn search(&self, region: &BoundingBox2D) -> Vec<&T> {
        let mut out = Vec::new();
        self.search_into(region, &mut out);
        out
    }

    /// Number of points stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Whether the tree holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.point.is_none()
    }

    /// Remove every point and subdivision. The bounds are kept.
    pub fn clear(&mut self) {
        self.root.point = None;
        self.root.children = None;
    }

    /// Call `f` for every stored point, top-down.
    pub fn visit<'a>(&'a self, mut f: impl FnMut(Vec2, &'a T)) {
        self.root.visit(&mut f);
    }

    /// Call `f` for every cell the tree has subdivided into, with the
    /// cell's occupying point if it has one. Intended for debug drawing.
    pub fn visit_cells(&self, mut f: impl FnMut(BoundingBox2D, Option<Vec2>)) {
        self.root.visit_cells(&mut f);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_64() -> QuadTree<u32> {
        QuadTree::new(BoundingBox2D::new(Vec2::ZERO, Vec2::splat(64.0)))
    }

    #[test]
    fn test_insert_and_len() {
        let mut tree = tree_64();
        assert!(tree.is_empty());

        assert!(tree.insert(Vec2::new(10.0, 10.0), 1));
        assert!(tree.insert(Vec2::new(50.0, 12.0), 2));
        assert!(tree.insert(Vec2::new(8.0, 40.0), 3));

        assert_eq!(tree.len(), 3);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut tree = tree_64();
        assert!(!tree.insert(Vec2::new(-1.0, 10.0), 1));
        assert!(!tree.insert(Vec2::new(10.0, 65.0), 2));
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn test_first_point_fills_the_root() {
        let mut tree = tree_64();
        assert!(tree.insert(Vec2::new(60.0, 60.0), 7));

        // The root itself holds the point, so even a query far from any
        // quadrant the point "belongs" to still finds it.
        let hits = tree.search(&BoundingBox2D::new(Vec2::splat(59.0), Vec2::splat(61.0)));
        assert_eq!(hits, vec![&7]);
    }

    #[test]
    fn test_search_returns_only_points_in_region() {
        let mut tree = tree_64();
        tree.insert(Vec2::new(5.0, 5.0), 1);
        tree.insert(Vec2::new(6.0, 6.0), 2);
        tree.insert(Vec2::new(60.0, 60.0), 3);
        tree.insert(Vec2::new(40.0, 8.0), 4);

        let mut hits = tree.search(&BoundingBox2D::new(Vec2::ZERO, Vec2::splat(10.0)));
        hits.sort_unstable();
        assert_eq!(hits, vec![&1, &2]);

        let all = tree.search(&tree.bounds());
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_search_empty_tree() {
        let tree = tree_64();
        assert!(tree.search(&tree.bounds()).is_empty());
    }

    #[test]
    fn test_search_region_outside_bounds() {
        let mut tree = tree_64();
        tree.insert(Vec2::new(10.0, 10.0), 1);

        let far = BoundingBox2D::new(Vec2::splat(100.0), Vec2::splat(200.0));
        assert!(tree.search(&far).is_empty());
    }

    #[test]
    fn test_search_into_accumulates() {
        let mut tree = tree_64();
        tree.insert(Vec2::new(5.0, 5.0), 1);
        tree.insert(Vec2::new(60.0, 60.0), 2);

        let mut out = Vec::new();
        tree.search_into(&BoundingBox2D::new(Vec2::ZERO, Vec2::splat(10.0)), &mut out);
        tree.search_into(&BoundingBox2D::new(Vec2::splat(55.0), Vec2::splat(64.0)), &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_identical_points_stack_until_minimum_cell() {
        // Bounds are 64 units; halving to the 1-unit floor gives cells of
        // 64, 32, 16, 8, 4, 2 and 1 units, so seven copies fit and the
        // eighth is dropped.
        let mut tree = tree_64();
        let p = Vec2::new(10.0, 10.0);

        let mut accepted = 0;
        for i in 0..10 {
            if tree.insert(p, i) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 7);
        assert_eq!(tree.len(), 7);

        let hits = tree.search(&BoundingBox2D::new(Vec2::splat(9.5), Vec2::splat(10.5)));
        assert_eq!(hits.len(), 7);
    }

    #[test]
    fn test_midpoint_goes_left_and_top() {
        let mut tree = tree_64();
        // Occupy the root, then insert a point exactly on the midpoint;
        // it must route into the northwest child.
        tree.insert(Vec2::new(1.0, 1.0), 0);
        tree.insert(Vec2::new(32.0, 32.0), 1);

        let mut seen = Vec::new();
        tree.visit_cells(|bounds, point| {
            if point == Some(Vec2::new(32.0, 32.0)) {
                seen.push(bounds);
            }
        });
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].min, Vec2::ZERO);
        assert_eq!(seen[0].max, Vec2::splat(32.0));
    }

    #[test]
    fn test_visit_sees_every_point() {
        let mut tree = tree_64();
        tree.insert(Vec2::new(1.0, 1.0), 10);
        tree.insert(Vec2::new(2.0, 2.0), 20);
        tree.insert(Vec2::new(63.0, 1.0), 30);

        let mut sum = 0;
        tree.visit(|_, value| sum += *value);
        assert_eq!(sum, 60);
    }

    #[test]
    fn test_clear() {
        let mut tree = tree_64();
        tree.insert(Vec2::new(1.0, 1.0), 1);
        tree.insert(Vec2::new(50.0, 50.0), 2);

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.search(&tree.bounds()).is_empty());

        // The tree remains usable after a clear.
        assert!(tree.insert(Vec2::new(3.0, 3.0), 9));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_rebuild_each_frame_pattern() {
        let mut tree = tree_64();
        for frame in 0..3 {
            tree.clear();
            for i in 0..20 {
                let offset = (frame * 20 + i) as f32 * 0.1;
                tree.insert(Vec2::new(1.0 + offset, 30.0), i);
            }
            assert_eq!(tree.len(), 20);
        }
    }
}
