//! Models: named mesh lists with merged bounds

use crate::render::mesh::Mesh;
use crate::scene::BoundingBox;
use crate::INVALID_ID;

/// Handle to a model in the asset cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

impl ModelId {
    /// Handle that never resolves to a model.
    pub const INVALID: Self = Self(INVALID_ID);
}

/// A named collection of meshes drawn as one unit.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    /// Union of the mesh bounds, cached at construction
    bounds: BoundingBox,
}

impl Model {
    /// Build a model from meshes, merging their bounds.
    pub fn from_meshes(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        let bounds = meshes
            .iter()
            .fold(BoundingBox::EMPTY, |acc, mesh| acc.merge(&mesh.bounds()));
        Self {
            name: name.into(),
            meshes,
            bounds,
        }
    }

    /// Unit cube stand-in used when a model fails to load.
    pub fn fallback_cube() -> Self {
        Self::from_meshes("fallback_cube", vec![Mesh::cube()])
    }

    /// Local-space bounds over every mesh
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
