//! Spatial Indexing
//!
//! Structures for answering "what is near this point" faster than a
//! linear scan. Currently a single point [`QuadTree`], rebuilt per frame
//! by games that need range queries over moving entities.

pub mod quadtree;

pub use quadtree::{QuadTree, MIN_CELL_SIZE};
