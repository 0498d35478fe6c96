//! Asset server facade
//!
//! One front door for everything loaded from disk. Paths given to the
//! server are relative to the resource root from [`EngineConfig`]
//! (crate::core::EngineConfig); the server joins them, keeps the stores
//! deduplicated, and owns the material registry that model loads write
//! into.

use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::assets::models::ModelStore;
use crate::assets::textures::TextureStore;
use crate::core::EventQueue;
use crate::jobs::JobSystem;
use crate::render::{
    MaterialRegistry, Model, ModelId, Texture, TextureId, TextureProperties,
};

pub struct AssetServer {
    root: PathBuf,
    textures: TextureStore,
    models: ModelStore,
    /// Materials live here so OBJ loads can register theirs; games
    /// create their own through the same registry.
    pub materials: MaterialRegistry,
}

impl AssetServer {
    #[must_use]
    pub fn new(resource_dir: impl AsRef<Path>) -> Self {
        let root = resource_dir.as_ref().to_path_buf();
        info!("asset server: resource root {}", root.display());
        Self {
            root,
            textures: TextureStore::new(),
            models: ModelStore::new(),
            materials: MaterialRegistry::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a resource-relative path.
    #[must_use]
    pub fn res_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Whether a resource file exists on disk.
    #[must_use]
    pub fn exists(&self, relative: &str) -> bool {
        self.res_path(relative).is_file()
    }

    /// Read a resource file's raw bytes.
    pub fn read_bytes(&self, relative: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.res_path(relative))
    }

    /// Read a resource file as UTF-8 text.
    pub fn read_string(&self, relative: &str) -> io::Result<String> {
        std::fs::read_to_string(self.res_path(relative))
    }

    // ========================================================================
    // Textures
    // ========================================================================

    /// Load a texture on the calling thread with default properties.
    pub fn load_texture(&mut self, path: &str) -> TextureId {
        self.load_texture_with(path, TextureProperties::rgba_linear())
    }

    pub fn load_texture_with(&mut self, path: &str, properties: TextureProperties) -> TextureId {
        let full = self.root.join(path);
        self.textures.load_sync(path, &full, properties)
    }

    /// Decode a texture on the worker pool; the returned id is drawable
    /// immediately and swaps to the real image once the load lands.
    pub fn request_texture(&mut self, jobs: &JobSystem, path: &str) -> TextureId {
        self.request_texture_with(jobs, path, TextureProperties::rgba_linear())
    }

    pub fn request_texture_with(
        &mut self,
        jobs: &JobSystem,
        path: &str,
        properties: TextureProperties,
    ) -> TextureId {
        let full = self.root.join(path);
        self.textures.request(jobs, path, full, properties)
    }

    /// Background texture load that also invokes `callback` once the
    /// load lands, or immediately if the path is already loaded.
    pub fn request_texture_callback(
        &mut self,
        jobs: &JobSystem,
        path: &str,
        callback: impl FnOnce(TextureId) + 'static,
    ) -> TextureId {
        let full = self.root.join(path);
        self.textures.request_with_callback(
            jobs,
            path,
            full,
            TextureProperties::rgba_linear(),
            callback,
        )
    }

    #[must_use]
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    #[must_use]
    pub fn texture_pixels(&self, id: TextureId) -> Option<&[u8]> {
        self.textures.pixels(id)
    }

    #[must_use]
    pub fn is_texture_ready(&self, id: TextureId) -> bool {
        self.textures.is_ready(id)
    }

    /// Publish finished async loads. The engine calls this once per
    /// frame, after main-thread jobs have run.
    pub fn pump(&mut self, events: &mut EventQueue) -> usize {
        self.textures.pump(events)
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    // ========================================================================
    // Models
    // ========================================================================

    /// Load an OBJ model, registering its materials and texture maps.
    pub fn load_model(&mut self, path: &str) -> ModelId {
        let full = self.root.join(path);
        let Self {
            textures,
            models,
            materials,
            ..
        } = self;
        models.load(path, &full, materials, textures)
    }

    /// Store a generated model.
    pub fn add_model(&mut self, model: Model) -> ModelId {
        self.models.insert(model)
    }

    #[must_use]
    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id)
    }

    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut Model> {
        self.models.get_mut(id)
    }

    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}
