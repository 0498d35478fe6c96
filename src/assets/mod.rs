//! Asset loading and storage
//!
//! Textures and models load from the resource directory through one
//! [`AssetServer`], deduplicated by path. Texture decodes can run on the
//! worker pool; everything else loads synchronously.

mod models;
mod server;
mod textures;

pub use models::ModelStore;
pub use server::AssetServer;
pub use textures::TextureStore;
