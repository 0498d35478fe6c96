//! A small 3D game engine built in Rust
//!
//! This engine provides:
//! - A fixed game loop with frame limiting and per-frame arenas
//! - Entity registry with transforms, camera, and lights
//! - Asset loading (textures, OBJ models, materials) with worker-pool decodes
//! - Physics simulation with rapier3d
//! - Audio playback with rodio
//! - Input handling with winit, including mouse-look

pub mod assets;
pub mod audio;
pub mod core;
pub mod input;
pub mod jobs;
pub mod math;
pub mod mem;
pub mod physics;
pub mod render;
pub mod scene;
pub mod spatial;

// Re-exports for convenience
pub use glam;
pub use rapier3d;
pub use winit;

/// Sentinel for ids that do not refer to anything.
pub const INVALID_ID: u32 = 999_999_999;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assets::AssetServer;
    pub use crate::audio::AudioManager;
    pub use crate::core::{
        DebugInfo, Engine, EngineConfig, EngineContext, EventQueue, FrameStats, Game, GameEvent,
        Random, Time,
    };
    pub use crate::input::Input;
    pub use crate::jobs::JobSystem;
    pub use crate::mem::Arena;
    pub use crate::physics::{ColliderHandle, Physics, RigidBodyHandle};
    pub use crate::render::{
        Material, MaterialId, MaterialSlot, Mesh, Model, ModelId, ParticleSystem2D, Renderer,
        TextureId, Vertex,
    };
    pub use crate::scene::{BoundingBox, Camera, EntityId, EntityRegistry, Lights, Transform};
    pub use crate::spatial::QuadTree;
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use winit::keyboard::KeyCode;
}
