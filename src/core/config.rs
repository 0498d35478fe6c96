//! Engine configuration
//!
//! Built in code with the builder methods or loaded from a RON file next
//! to the game binary. Every field has a sensible default, so a config
//! file only needs to name what it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Startup settings for [`Engine`](crate::core::Engine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Text in the window title bar
    pub title: String,
    /// Window width at startup, in pixels
    pub width: u32,
    /// Window height at startup, in pixels
    pub height: u32,
    /// Frame rate cap; 0 runs uncapped
    pub target_fps: u32,
    /// Root directory for textures, models, and sounds
    pub resource_dir: String,
    /// Size of the game-owned arena in bytes
    pub game_arena_bytes: usize,
    /// Worker thread count. `None` sizes the pool from the hardware.
    pub worker_threads: Option<usize>,
    /// Seed for the engine RNG. Zero seeds from the clock on first use.
    pub rng_seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("tiny engine"),
            width: 1280,
            height: 720,
            target_fps: 60,
            resource_dir: String::from("res"),
            game_arena_bytes: 8 * 1024 * 1024,
            worker_threads: None,
            rng_seed: 0,
        }
    }
}

impl EngineConfig {
    /// Replace the window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replace the startup window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Replace the frame rate cap
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Set the resource root directory
    pub fn with_resource_dir(mut self, dir: impl Into<String>) -> Self {
        self.resource_dir = dir.into();
        self
    }

    /// Set the game arena size in bytes
    pub fn with_game_arena_bytes(mut self, bytes: usize) -> Self {
        self.game_arena_bytes = bytes;
        self
    }

    /// Pin the worker thread count instead of sizing from the hardware
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    /// Seed the engine RNG for reproducible runs
    pub fn with_rng_seed(mut self, seed: u32) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Load a config from a RON file.
    pub fn load_ron<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Why a config file failed to load.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io(std::io::Error),
    /// The contents are not valid RON for this config
    Parse(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config file error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.resource_dir, "res");
        assert_eq!(config.rng_seed, 0);
        assert!(config.worker_threads.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = EngineConfig::default()
            .with_title("demo")
            .with_size(640, 480)
            .with_target_fps(30)
            .with_worker_threads(2)
            .with_rng_seed(42);
        assert_eq!(config.title, "demo");
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.worker_threads, Some(2));
        assert_eq!(config.rng_seed, 42);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let parsed: EngineConfig =
            ron::from_str("(title: \"partial\", width: 800)").unwrap();
        assert_eq!(parsed.title, "partial");
        assert_eq!(parsed.width, 800);
        assert_eq!(parsed.height, 720);
        assert_eq!(parsed.target_fps, 60);
    }

    #[test]
    fn test_load_ron_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join("tiny_engine_config_test.ron");
        let config = EngineConfig::default().with_title("saved").with_size(320, 240);
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default())
            .unwrap();
        std::fs::write(&path, text).unwrap();

        let loaded = EngineConfig::load_ron(&path).unwrap();
        assert_eq!(loaded.title, "saved");
        assert_eq!(loaded.width, 320);
        assert_eq!(loaded.height, 240);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = EngineConfig::load_ron("/nonexistent/config.ron");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
