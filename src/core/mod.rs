//! Core engine module
//!
//! Contains the main Engine struct, configuration, and the frame-level
//! services every game sees through [`EngineContext`]: time, events,
//! deterministic random numbers, and debug overlay state.

mod config;
mod debug;
mod engine;
mod events;
mod random;
mod time;

pub use config::{ConfigError, EngineConfig};
pub use debug::{DebugInfo, FrameStats};
pub use engine::{Engine, EngineContext, Game};
pub use events::{EventQueue, GameEvent};
pub use random::Random;
pub use time::Time;
