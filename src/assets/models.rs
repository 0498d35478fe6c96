//! Model loading and storage
//!
//! Wavefront OBJ files load through `tobj` into indexed [`Mesh`] data,
//! one mesh per OBJ shape. MTL materials are converted into the
//! [`MaterialRegistry`], color and texture maps both, so a loaded mesh
//! carries a usable [`MaterialId`]. A load that fails lands on a
//! fallback cube instead of an error, with the failure logged.

use std::path::Path;

use glam::Vec4;
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::assets::textures::TextureStore;
use crate::math;
use crate::render::{
    MaterialId, MaterialProp, MaterialRegistry, MaterialSlot, Mesh, Model, ModelId,
    TextureProperties, Vertex,
};

/// Owns every loaded model, deduplicated by path.
pub struct ModelStore {
    models: FxHashMap<ModelId, Model>,
    by_path: FxHashMap<String, ModelId>,
    next_id: u32,
}

impl ModelStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: FxHashMap::default(),
            by_path: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Load an OBJ file, converting its materials into `materials` and
    /// any texture maps into `textures`.
    ///
    /// `key` is the deduplication key, `full_path` the file on disk. A
    /// failed parse logs and stores a fallback cube under the same key.
    pub fn load(
        &mut self,
        key: &str,
        full_path: &Path,
        materials: &mut MaterialRegistry,
        textures: &mut TextureStore,
    ) -> ModelId {
        if let Some(&id) = self.by_path.get(key) {
            return id;
        }
        let model = match load_obj(full_path, materials, textures) {
            Ok(model) => model,
            Err(err) => {
                warn!("model load failed for {key}: {err}");
                Model::fallback_cube()
            }
        };
        let id = self.alloc(model);
        self.by_path.insert(key.to_string(), id);
        id
    }

    /// Store a generated model (primitives, procedural geometry).
    pub fn insert(&mut self, model: Model) -> ModelId {
        self.alloc(model)
    }

    #[must_use]
    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(&id)
    }

    pub fn get_mut(&mut self, id: ModelId) -> Option<&mut Model> {
        self.models.get_mut(&id)
    }

    #[must_use]
    pub fn id_for(&self, key: &str) -> Option<ModelId> {
        self.by_path.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn alloc(&mut self, model: Model) -> ModelId {
        let id = ModelId(self.next_id);
        self.next_id += 1;
        self.models.insert(id, model);
        id
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

fn load_obj(
    path: &Path,
    materials: &mut MaterialRegistry,
    textures: &mut TextureStore,
) -> Result<Model, tobj::LoadError> {
    let (shapes, obj_materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)?;
    let obj_materials = obj_materials.unwrap_or_else(|err| {
        warn!("mtl load failed for {}: {err}", path.display());
        Vec::new()
    });

    // MTL texture paths are relative to the OBJ's directory
    let obj_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let converted: Vec<MaterialId> = obj_materials
        .iter()
        .map(|mat| convert_material(mat, obj_dir, materials, textures))
        .collect();

    let mut meshes = Vec::with_capacity(shapes.len());
    for shape in &shapes {
        let mut mesh = convert_mesh(&shape.name, &shape.mesh);
        if let Some(index) = shape.mesh.material_id
            && let Some(&id) = converted.get(index)
        {
            mesh.material = id;
        }
        meshes.push(mesh);
    }

    let name = path
        .file_stem()
        .map_or_else(|| "model".to_string(), |s| s.to_string_lossy().into_owned());
    info!(
        "loaded model {} [materials: {}, meshes: {}]",
        path.display(),
        converted.len(),
        meshes.len()
    );
    Ok(Model::from_meshes(name, meshes))
}

fn convert_mesh(name: &str, mesh: &tobj::Mesh) -> Mesh {
    let vertex_count = mesh.positions.len() / 3;
    let mut vertices = Vec::with_capacity(vertex_count);
    for i in 0..vertex_count {
        let position = [
            mesh.positions[i * 3],
            mesh.positions[i * 3 + 1],
            mesh.positions[i * 3 + 2],
        ];
        let normal = if mesh.normals.len() >= (i + 1) * 3 {
            [
                mesh.normals[i * 3],
                mesh.normals[i * 3 + 1],
                mesh.normals[i * 3 + 2],
            ]
        } else {
            [0.0; 3]
        };
        // OBJ texcoords have v at the bottom, flip to top-left origin
        let uv = if mesh.texcoords.len() >= (i + 1) * 2 {
            [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
        } else {
            [0.0; 2]
        };
        if mesh.vertex_color.len() >= (i + 1) * 3 {
            let color = [
                mesh.vertex_color[i * 3],
                mesh.vertex_color[i * 3 + 1],
                mesh.vertex_color[i * 3 + 2],
            ];
            vertices.push(Vertex::colored(position, normal, uv, color));
        } else {
            vertices.push(Vertex::new(position, normal, uv));
        }
    }
    Mesh::from_data(name, vertices, mesh.indices.clone())
}

fn convert_material(
    mat: &tobj::Material,
    obj_dir: &Path,
    materials: &mut MaterialRegistry,
    textures: &mut TextureStore,
) -> MaterialId {
    let id = materials.create(&mat.name);
    let alpha = mat.dissolve.unwrap_or(1.0);

    let slots = [
        (MaterialSlot::Diffuse, mat.diffuse, &mat.diffuse_texture),
        (MaterialSlot::Ambient, mat.ambient, &mat.ambient_texture),
        (MaterialSlot::Specular, mat.specular, &mat.specular_texture),
        (MaterialSlot::Normal, None, &mat.normal_texture),
    ];
    for (slot, color, texture_name) in slots {
        let mut prop = MaterialProp::default();
        if let Some([r, g, b]) = color {
            prop.color = Vec4::new(r, g, b, alpha);
        }
        if let Some(texture_name) = texture_name {
            let full = obj_dir.join(texture_name);
            let key = full.to_string_lossy().into_owned();
            prop.texture = Some(textures.load_sync(&key, &full, TextureProperties::rgba_linear()));
        }
        materials.set_property(id, slot, prop);
    }

    // OBJ Ns runs to 1000, remap to a usable exponent range
    if let Some(ns) = mat.shininess {
        let shininess = math::remap(ns, 0.0, 1000.0, 0.0, 50.0);
        materials.set_property(
            id,
            MaterialSlot::Shininess,
            MaterialProp::from_color(Vec4::splat(shininess)),
        );
    }
    materials.set_property(
        id,
        MaterialSlot::Opacity,
        MaterialProp::from_color(Vec4::splat(alpha)),
    );
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const TRIANGLE_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tiny_engine_obj_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_triangle_obj() {
        let dir = temp_dir("tri");
        let path = dir.join("tri.obj");
        fs::write(&path, TRIANGLE_OBJ).unwrap();

        let mut store = ModelStore::new();
        let mut materials = MaterialRegistry::new();
        let mut textures = TextureStore::new();

        let id = store.load("tri.obj", &path, &mut materials, &mut textures);
        let model = store.get(id).unwrap();
        assert_eq!(model.name, "tri");
        assert_eq!(model.mesh_count(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.material, MaterialId::DEFAULT);
        // v texcoord flipped to top-left origin
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);

        let bounds = model.bounds();
        assert_eq!(bounds.max.x, 1.0);
        assert_eq!(bounds.max.y, 1.0);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_load_obj_with_mtl_creates_material() {
        let dir = temp_dir("mtl");
        fs::write(
            dir.join("red.mtl"),
            "newmtl red\nKd 1.0 0.0 0.0\nNs 500.0\n",
        )
        .unwrap();
        let obj = format!("mtllib red.mtl\nusemtl red\n{TRIANGLE_OBJ}");
        let path = dir.join("quad.obj");
        fs::write(&path, obj).unwrap();

        let mut store = ModelStore::new();
        let mut materials = MaterialRegistry::new();
        let mut textures = TextureStore::new();

        let id = store.load("quad.obj", &path, &mut materials, &mut textures);
        let mesh = &store.get(id).unwrap().meshes[0];
        assert_ne!(mesh.material, MaterialId::DEFAULT);

        let material = materials.get(mesh.material).unwrap();
        assert_eq!(material.name, "red");
        assert_eq!(
            material.property(MaterialSlot::Diffuse).color,
            Vec4::new(1.0, 0.0, 0.0, 1.0)
        );
        // Ns 500 remapped from [0, 1000] into [0, 50]
        assert_eq!(
            material.property(MaterialSlot::Shininess).color.x,
            25.0
        );

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_falls_back_to_cube() {
        let mut store = ModelStore::new();
        let mut materials = MaterialRegistry::new();
        let mut textures = TextureStore::new();

        let id = store.load(
            "ghost.obj",
            Path::new("/nowhere/ghost.obj"),
            &mut materials,
            &mut textures,
        );
        let model = store.get(id).unwrap();
        assert_eq!(model.name, "fallback_cube");
        assert_eq!(model.mesh_count(), 1);
    }

    #[test]
    fn test_load_dedups_by_key() {
        let dir = temp_dir("dedup");
        let path = dir.join("tri.obj");
        fs::write(&path, TRIANGLE_OBJ).unwrap();

        let mut store = ModelStore::new();
        let mut materials = MaterialRegistry::new();
        let mut textures = TextureStore::new();

        let a = store.load("tri.obj", &path, &mut materials, &mut textures);
        let b = store.load("tri.obj", &path, &mut materials, &mut textures);
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_insert_generated_model() {
        let mut store = ModelStore::new();
        let id = store.insert(Model::from_meshes("prim", vec![Mesh::cube()]));
        assert_eq!(store.get(id).unwrap().name, "prim");
    }
}
