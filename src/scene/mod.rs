//! Scene Data Model
//!
//! Everything the engine knows about a running world: transforms and
//! bounding volumes, the entity registry, the camera, light setup, and
//! save/load of all of it to RON or JSON.

pub mod bounds;
pub mod camera;
pub mod entity;
pub mod lights;
pub mod serialize;
pub mod transform;

pub use bounds::{BoundingBox, BoundingBox2D};
pub use camera::{Camera, ProjectionMode};
pub use entity::{Entity, EntityFlags, EntityId, EntityRegistry};
pub use lights::{DirectionalLight, Lights, PointLight, MAX_POINT_LIGHTS};
pub use serialize::{SceneData, SceneEntity, SceneError};
pub use transform::{Transform, Transform2D};
