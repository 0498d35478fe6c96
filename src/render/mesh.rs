//! Triangle meshes and the vertex layout they share

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::render::material::MaterialId;
use crate::scene::BoundingBox;

/// Interleaved vertex: position, normal, UV, color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    /// Vertex with the default white color.
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: [1.0; 3],
        }
    }

    /// Vertex with an explicit color.
    pub const fn colored(
        position: [f32; 3],
        normal: [f32; 3],
        uv: [f32; 2],
        color: [f32; 3],
    ) -> Self {
        Self {
            position,
            normal,
            uv,
            color,
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new([0.0; 3], [0.0; 3], [0.0; 2])
    }
}

/// Indexed triangle list plus the material it is drawn with.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Material the mesh is drawn with
    pub material: MaterialId,
    /// Invisible meshes are skipped when a model is pushed to the draw list
    pub visible: bool,
    /// Local-space bounds over the vertex positions
    bounds: BoundingBox,
}

impl Mesh {
    /// Empty mesh with no geometry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            indices: Vec::new(),
            material: MaterialId::DEFAULT,
            visible: true,
            bounds: BoundingBox::EMPTY,
        }
    }

    /// Build a mesh from raw geometry, computing its bounds up front.
    pub fn from_data(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let bounds = BoundingBox::from_points(vertices.iter().map(|v| Vec3::from(v.position)));
        Self {
            name: name.into(),
            vertices,
            indices,
            material: MaterialId::DEFAULT,
            visible: true,
            bounds,
        }
    }

    /// Assign a material
    #[must_use]
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = material;
        self
    }

    /// Unit cube centered on the origin, one quad per face so normals
    /// stay flat.
    pub fn cube() -> Self {
        const FACE_NORMALS: [Vec3; 6] = [
            Vec3::Z,
            Vec3::NEG_Z,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::X,
            Vec3::NEG_X,
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for normal in FACE_NORMALS {
            // Tangent frame chosen so u cross v points along the normal,
            // which keeps the winding counter-clockwise from outside.
            let up = if normal.y.abs() > 0.5 { Vec3::Z } else { Vec3::Y };
            let u_axis = up.cross(normal);
            let v_axis = normal.cross(u_axis);

            let base = vertices.len() as u32;
            for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                let position = normal * 0.5 + u_axis * (u - 0.5) + v_axis * (v - 0.5);
                vertices.push(Vertex::new(position.into(), normal.into(), [u, v]));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::from_data("cube", vertices, indices)
    }

    /// Horizontal quad in the XZ plane, `size` units on a side, normal
    /// facing up.
    pub fn plane(size: f32) -> Self {
        let half = size * 0.5;
        let corners = [
            ([-half, 0.0, half], [0.0, 0.0]),
            ([half, 0.0, half], [1.0, 0.0]),
            ([half, 0.0, -half], [1.0, 1.0]),
            ([-half, 0.0, -half], [0.0, 1.0]),
        ];

        let vertices = corners
            .into_iter()
            .map(|(position, uv)| Vertex::new(position, [0.0, 1.0, 0.0], uv))
            .collect();

        Self::from_data("plane", vertices, vec![0, 1, 2, 2, 3, 0])
    }

    /// Latitude-longitude sphere. Rows share their seam column, so the
    /// vertex count is `(segments + 1) * (rings + 1)`.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let row_stride = segments + 1;
        let mut vertices = Vec::with_capacity((row_stride * (rings + 1)) as usize);

        for row in 0..=rings {
            let latitude = std::f32::consts::PI * row as f32 / rings as f32;
            let (sin_lat, cos_lat) = latitude.sin_cos();

            for col in 0..=segments {
                let longitude = std::f32::consts::TAU * col as f32 / segments as f32;
                let (sin_lon, cos_lon) = longitude.sin_cos();

                let position = Vec3::new(
                    radius * sin_lat * cos_lon,
                    radius * cos_lat,
                    radius * sin_lat * sin_lon,
                );
                vertices.push(Vertex::new(
                    position.into(),
                    position.normalize_or_zero().into(),
                    [col as f32 / segments as f32, row as f32 / rings as f32],
                ));
            }
        }

        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for row in 0..rings {
            for col in 0..segments {
                let upper = row * row_stride + col;
                let lower = upper + row_stride;
                indices.extend_from_slice(&[
                    upper,
                    lower,
                    upper + 1,
                    upper + 1,
                    lower,
                    lower + 1,
                ]);
            }
        }

        Self::from_data("sphere", vertices, indices)
    }

    /// Local-space bounding box, cached at construction
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Recompute the cached bounds after editing vertices in place
    pub fn recompute_bounds(&mut self) {
        self.bounds =
            BoundingBox::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)));
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}
