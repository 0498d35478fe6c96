//! Scene save and load
//!
//! Snapshots the entity registry into a serializable form and writes it
//! as RON (the native format) or JSON. Models are referenced by their
//! resource path rather than by id, so a loaded scene resolves against
//! whatever the asset layer serves at that time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render::ModelId;
use crate::scene::{BoundingBox, EntityFlags, EntityId, EntityRegistry, Transform};

/// On-disk form of a single entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEntity {
    pub name: String,
    pub transform: Transform,
    /// Behavior flag bits
    #[serde(default)]
    pub flags: u32,
    /// Resource path of the attached model, if any
    #[serde(default)]
    pub model_path: Option<String>,
}

/// On-disk form of a whole scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneData {
    pub name: String,
    /// Bumped when the file layout changes
    pub version: u32,
    /// Entities in file order
    pub entities: Vec<SceneEntity>,
}

impl SceneData {
    /// Empty scene with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            entities: Vec::new(),
        }
    }

    /// Snapshot a registry.
    ///
    /// `model_path` maps an entity's model id back to the resource path
    /// it was loaded from; entities whose model cannot be resolved are
    /// saved without one.
    #[must_use]
    pub fn from_registry(
        registry: &EntityRegistry,
        mut model_path: impl FnMut(ModelId) -> Option<String>,
    ) -> Self {
        let mut scene = Self::new("scene");
        for entity in registry.iter() {
            scene.entities.push(SceneEntity {
                name: entity.name.clone(),
                transform: entity.transform,
                flags: entity.flags.bits(),
                model_path: entity.model.and_then(&mut model_path),
            });
        }
        scene
    }

    /// Spawn every entity of this scene into a registry.
    ///
    /// `resolve_model` turns a resource path into a loaded model id and
    /// its local bounds; returning `None` leaves the entity modelless.
    /// Returns the ids of the spawned entities in scene order.
    pub fn spawn_into(
        &self,
        registry: &mut EntityRegistry,
        mut resolve_model: impl FnMut(&str) -> Option<(ModelId, BoundingBox)>,
    ) -> Vec<EntityId> {
        let mut ids = Vec::with_capacity(self.entities.len());
        for data in &self.entities {
            let id = registry.create(data.name.clone(), data.transform);
            if let Some(entity) = registry.get_mut(id) {
                entity.flags = EntityFlags::from_bits(data.flags);
            }
            if let Some(path) = &data.model_path {
                if let Some((model, bounds)) = resolve_model(path) {
                    registry.set_model(id, model, bounds);
                }
            }
            ids.push(id);
        }
        ids
    }

    /// Write the scene to `path` as pretty-printed RON.
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Format(e.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Read a scene back from a RON file.
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = fs::read_to_string(path)?;
        ron::from_str(&text).map_err(|e| SceneError::Format(e.to_string()))
    }

    /// Write the scene to `path` as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let text =
            serde_json::to_string_pretty(self).map_err(|e| SceneError::Format(e.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Read a scene back from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| SceneError::Format(e.to_string()))
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for SceneData {
    fn default() -> Self {
        Self::new("untitled")
    }
}

/// Why a scene failed to save or load.
#[derive(Debug)]
pub enum SceneError {
    /// The file could not be read or written
    Io(std::io::Error),
    /// The contents did not serialize or parse
    Format(String),
}

impl From<std::io::Error> for SceneError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "scene file error: {e}"),
            Self::Format(e) => write!(f, "scene format error: {e}"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sample_registry() -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        let player = registry.create("player", Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
        registry.set_model(
            player,
            ModelId(3),
            BoundingBox::new(Vec3::ZERO, Vec3::ONE),
        );
        registry.create("marker", Transform::default());
        registry
    }

    #[test]
    fn test_ron_roundtrip() {
        let registry = sample_registry();
        let scene = SceneData::from_registry(&registry, |id| {
            (id == ModelId(3)).then(|| "meshes/player.obj".to_string())
        });

        let ron_str =
            ron::ser::to_string_pretty(&scene, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("player"));

        let loaded: SceneData = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded.entity_count(), 2);
        let player = loaded
            .entities
            .iter()
            .find(|e| e.name == "player")
            .unwrap();
        assert_eq!(player.model_path.as_deref(), Some("meshes/player.obj"));
        assert_eq!(player.transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_json_roundtrip() {
        let registry = sample_registry();
        let scene = SceneData::from_registry(&registry, |_| None);

        let json_str = serde_json::to_string(&scene).unwrap();
        let loaded: SceneData = serde_json::from_str(&json_str).unwrap();
        assert_eq!(loaded.entity_count(), 2);
        assert!(loaded.entities.iter().all(|e| e.model_path.is_none()));
    }

    #[test]
    fn test_spawn_into_resolves_models() {
        let mut scene = SceneData::new("level");
        scene.entities.push(SceneEntity {
            name: "crate".to_string(),
            transform: Transform::from_position(Vec3::X),
            flags: 0,
            model_path: Some("meshes/crate.obj".to_string()),
        });
        scene.entities.push(SceneEntity {
            name: "ghost".to_string(),
            transform: Transform::default(),
            flags: EntityFlags::DISABLED.bits(),
            model_path: None,
        });

        let mut registry = EntityRegistry::new();
        let ids = scene.spawn_into(&mut registry, |path| {
            assert_eq!(path, "meshes/crate.obj");
            Some((ModelId(0), BoundingBox::new(Vec3::ZERO, Vec3::ONE)))
        });

        assert_eq!(ids.len(), 2);
        let spawned = registry.get(ids[0]).unwrap();
        assert_eq!(spawned.model, Some(ModelId(0)));

        let ghost = registry.get(ids[1]).unwrap();
        assert!(ghost.flags.contains(EntityFlags::DISABLED));
        assert!(ghost.model.is_none());
    }

    #[test]
    fn test_file_roundtrip() {
        let registry = sample_registry();
        let scene = SceneData::from_registry(&registry, |_| None);

        let path = std::env::temp_dir().join("tiny_engine_scene_test.ron");
        scene.save_ron(&path).unwrap();
        let loaded = SceneData::load_ron(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.entity_count(), scene.entity_count());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = SceneData::load_ron("/nonexistent/scene.ron").unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
