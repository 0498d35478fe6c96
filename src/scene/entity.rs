//! Entities and the registry that owns them

use glam::Vec3;
use log::warn;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::render::ModelId;
use crate::scene::{BoundingBox, Transform};
use crate::INVALID_ID;

/// Identifier of an entity. Ids come from a creation counter and are
/// never reused within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Sentinel for "no entity".
    pub const INVALID: Self = Self(INVALID_ID);
}

/// Per-entity behavior flags, stored as a bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityFlags(u32);

impl EntityFlags {
    /// Entity is skipped by update and render passes.
    pub const DISABLED: Self = Self(1 << 0);

    /// No flags set.
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn insert(&mut self, flag: Self) {
        self.0 |= flag.0;
    }

    pub fn remove(&mut self, flag: Self) {
        self.0 &= !flag.0;
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

/// A named object in the world: placement, an optional model, and the
/// model's local-space bounds cached next to it.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub transform: Transform,
    pub model: Option<ModelId>,
    /// Bounds of the attached model in model space. Empty while no model
    /// is attached.
    pub local_bounds: BoundingBox,
    pub flags: EntityFlags,
}

impl Entity {
    /// Bounds in world space, following the current transform.
    #[must_use]
    pub fn world_bounds(&self) -> BoundingBox {
        self.local_bounds.transformed(self.transform.to_matrix())
    }

    /// Whether the render pass should pick this entity up.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.model.is_some() && !self.flags.contains(EntityFlags::DISABLED)
    }

    /// World-space position shorthand.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }
}

/// Owns every entity in the scene, keyed by id.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: FxHashMap<EntityId, Entity>,
    next_id: u32,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity with a name and transform. No model is attached
    /// yet; see [`set_model`](Self::set_model).
    pub fn create(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                name: name.into(),
                transform,
                model: None,
                local_bounds: BoundingBox::EMPTY,
                flags: EntityFlags::NONE,
            },
        );
        id
    }

    /// Create an entity with flags already set, for entities that should
    /// start disabled.
    pub fn create_with_flags(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        flags: EntityFlags,
    ) -> EntityId {
        let id = self.create(name, transform);
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.flags = flags;
        }
        id
    }

    /// Remove an entity. Returns `false` if the id was not present.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// First entity with the given name, if any.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .values()
            .find(|e| e.name == name)
            .map(|e| e.id)
    }

    /// Attach a model and cache its local bounds on the entity.
    ///
    /// Overwrites any previously attached model. Logs a warning and does
    /// nothing for an unknown id.
    pub fn set_model(&mut self, id: EntityId, model: ModelId, bounds: BoundingBox) {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.model = Some(model);
                entity.local_bounds = bounds;
            }
            None => warn!("entity registry: set_model on unknown entity {id:?}"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Entities the render pass should draw: a model attached and not
    /// disabled.
    pub fn renderables(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| e.is_renderable())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity. The id counter keeps counting; ids stay
    /// unique across clears.
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_create_and_lookup() {
        let mut registry = EntityRegistry::new();

        let id = registry.create("player", Transform::from_position(Vec3::ONE));
        assert_eq!(registry.len(), 1);

        let entity = registry.get(id).unwrap();
        assert_eq!(entity.name, "player");
        assert_eq!(entity.position(), Vec3::ONE);
        assert!(entity.model.is_none());
    }

    #[test]
    fn test_ids_are_unique_and_not_reused() {
        let mut registry = EntityRegistry::new();

        let a = registry.create("a", Transform::default());
        registry.destroy(a);
        let b = registry.create("b", Transform::default());

        assert_ne!(a, b);
    }

    #[test]
    fn test_destroy() {
        let mut registry = EntityRegistry::new();

        let id = registry.create("gone", Transform::default());
        assert!(registry.destroy(id));
        assert!(!registry.destroy(id), "second destroy returns false");
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_create_with_flags() {
        let mut registry = EntityRegistry::new();

        let id = registry.create_with_flags(
            "hidden",
            Transform::default(),
            EntityFlags::DISABLED,
        );
        registry.set_model(id, ModelId(0), BoundingBox::new(Vec3::ZERO, Vec3::ONE));

        assert!(registry.get(id).unwrap().flags.contains(EntityFlags::DISABLED));
        assert_eq!(registry.renderables().count(), 0);
    }

    #[test]
    fn test_find_by_name() {
        let mut registry = EntityRegistry::new();

        registry.create("wall", Transform::default());
        let npc = registry.create("npc", Transform::default());

        assert_eq!(registry.find_by_name("npc"), Some(npc));
        assert_eq!(registry.find_by_name("missing"), None);
    }

    #[test]
    fn test_renderables_filter() {
        let mut registry = EntityRegistry::new();

        let with_model = registry.create("visible", Transform::default());
        registry.set_model(
            with_model,
            ModelId(0),
            BoundingBox::new(Vec3::ZERO, Vec3::ONE),
        );

        let disabled = registry.create("disabled", Transform::default());
        registry.set_model(
            disabled,
            ModelId(1),
            BoundingBox::new(Vec3::ZERO, Vec3::ONE),
        );
        registry
            .get_mut(disabled)
            .unwrap()
            .flags
            .insert(EntityFlags::DISABLED);

        registry.create("no_model", Transform::default());

        let renderable: Vec<EntityId> = registry.renderables().map(|e| e.id).collect();
        assert_eq!(renderable, vec![with_model]);
    }

    #[test]
    fn test_world_bounds_follow_transform() {
        let mut registry = EntityRegistry::new();

        let id = registry.create(
            "box",
            Transform::from_position(Vec3::new(10.0, 0.0, 0.0)),
        );
        registry.set_model(id, ModelId(0), BoundingBox::new(Vec3::ZERO, Vec3::ONE));

        let bounds = registry.get(id).unwrap().world_bounds();
        assert_eq!(bounds.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn test_flags() {
        let mut flags = EntityFlags::NONE;
        assert!(!flags.contains(EntityFlags::DISABLED));

        flags.insert(EntityFlags::DISABLED);
        assert!(flags.contains(EntityFlags::DISABLED));

        flags.remove(EntityFlags::DISABLED);
        assert!(!flags.contains(EntityFlags::DISABLED));
    }
}
