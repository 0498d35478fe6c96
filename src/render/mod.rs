//! Rendering module
//!
//! CPU-side rendering data: meshes, models, materials, texture handles, a
//! per-frame draw list, and 2D particles. Nothing here talks to a GPU; a
//! backend consumes [`Renderer::drain_frame`] output, and without one the
//! engine just closes the list out each frame.

mod material;
mod mesh;
mod model;
mod particles;
mod renderer;
mod texture;

pub use material::{Material, MaterialId, MaterialProp, MaterialRegistry, MaterialSlot};
pub use mesh::{Mesh, Vertex};
pub use model::{Model, ModelId};
pub use particles::{
    DefaultParticleBehavior, EmitBurst, EmitEveryTick, EmitInterval, Particle2D,
    ParticleAlphaDecay, ParticleBehavior, ParticleColorGradient, ParticleDecay, ParticleSetSize,
    ParticleSetVelocity, ParticleSpreadOut, ParticleSystem2D,
};
pub use renderer::{
    FrameDrawList, LineCommand, MeshCommand, PointCommand, RenderStats, Renderer,
};
pub use texture::{
    FilterMode, Texture, TextureError, TextureFormat, TextureId, TextureProperties, WrapMode,
};
