//! Material registry
//!
//! Materials are id-keyed property sets: one [`MaterialProp`] per slot,
//! each a color with an optional texture on top. The registry always holds
//! a default material under [`MaterialId::DEFAULT`], so a lookup can fall
//! back instead of failing.

use glam::Vec4;
use rustc_hash::FxHashMap;

use crate::render::texture::TextureId;

/// Handle to a material in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// The built-in default material, always present.
    pub const DEFAULT: Self = Self(0);
}

/// Property slot on a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSlot {
    Diffuse,
    Ambient,
    Specular,
    Normal,
    Shininess,
    Emission,
    Opacity,
    Other,
}

impl MaterialSlot {
    /// Number of slots on every material.
    pub const COUNT: usize = 8;

    /// Slot position in the property array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Diffuse => 0,
            Self::Ambient => 1,
            Self::Specular => 2,
            Self::Normal => 3,
            Self::Shininess => 4,
            Self::Emission => 5,
            Self::Opacity => 6,
            Self::Other => 7,
        }
    }
}

/// One material property: a color and an optional texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProp {
    pub color: Vec4,
    pub texture: Option<TextureId>,
}

impl MaterialProp {
    /// Solid color, no texture.
    #[must_use]
    pub const fn from_color(color: Vec4) -> Self {
        Self {
            color,
            texture: None,
        }
    }

    /// Texture with a white tint.
    #[must_use]
    pub const fn from_texture(texture: TextureId) -> Self {
        Self {
            color: Vec4::ONE,
            texture: Some(texture),
        }
    }

    #[must_use]
    pub const fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}

impl Default for MaterialProp {
    fn default() -> Self {
        Self::from_color(Vec4::ONE)
    }
}

/// A named set of material properties.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    properties: [MaterialProp; MaterialSlot::COUNT],
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: [MaterialProp::default(); MaterialSlot::COUNT],
        }
    }

    /// Get a property slot.
    #[must_use]
    pub fn property(&self, slot: MaterialSlot) -> &MaterialProp {
        &self.properties[slot.index()]
    }

    /// Get a property slot mutably.
    pub fn property_mut(&mut self, slot: MaterialSlot) -> &mut MaterialProp {
        &mut self.properties[slot.index()]
    }

    /// Overwrite a property slot.
    pub fn set_property(&mut self, slot: MaterialSlot, prop: MaterialProp) {
        self.properties[slot.index()] = prop;
    }

    /// Builder-style property assignment.
    #[must_use]
    pub fn with_property(mut self, slot: MaterialSlot, prop: MaterialProp) -> Self {
        self.set_property(slot, prop);
        self
    }
}

/// Id-keyed material storage with a guaranteed default entry.
#[derive(Debug)]
pub struct MaterialRegistry {
    materials: FxHashMap<MaterialId, Material>,
    next_id: u32,
}

impl MaterialRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut materials = FxHashMap::default();
        materials.insert(MaterialId::DEFAULT, Material::new("default"));
        Self {
            materials,
            next_id: 1,
        }
    }

    /// Register a new material and return its handle.
    pub fn create(&mut self, name: impl Into<String>) -> MaterialId {
        let id = MaterialId(self.next_id);
        self.next_id += 1;
        self.materials.insert(id, Material::new(name));
        id
    }

    #[must_use]
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    /// Look up a material, falling back to the default entry when the id
    /// is unknown.
    #[must_use]
    pub fn get_or_default(&self, id: MaterialId) -> &Material {
        self.materials
            .get(&id)
            .or_else(|| self.materials.get(&MaterialId::DEFAULT))
            .expect("default material missing")
    }

    /// Overwrite one property of a material. Returns false when the id is
    /// not registered.
    pub fn set_property(&mut self, id: MaterialId, slot: MaterialSlot, prop: MaterialProp) -> bool {
        if let Some(material) = self.materials.get_mut(&id) {
            material.set_property(slot, prop);
            true
        } else {
            log::warn!("set_property on unknown material id {}", id.0);
            false
        }
    }

    #[must_use]
    pub fn exists(&self, id: MaterialId) -> bool {
        self.materials.contains_key(&id)
    }

    /// Remove a material. The default material cannot be removed.
    pub fn remove(&mut self, id: MaterialId) -> bool {
        if id == MaterialId::DEFAULT {
            log::warn!("refusing to remove the default material");
            return false;
        }
        self.materials.remove(&id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}
