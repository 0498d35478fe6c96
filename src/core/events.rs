//! Decoupled notifications between engine systems
//!
//! Anything notable that happens during frame N is pushed here and read
//! during frame N+1, after the engine swaps buffers at the frame
//! boundary. Readers always see a complete frame's worth of events in
//! push order, regardless of which system updated first, and a reader
//! can never observe its own pushes mid-frame.

use std::collections::VecDeque;

use crate::render::TextureId;
use crate::scene::EntityId;

// ============================================================================
// Event Types
// ============================================================================

/// What happened last frame.
///
/// Marked `#[non_exhaustive]` so matches keep a wildcard arm and new
/// notifications can be added later.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum GameEvent {
    /// A background texture load finished; the handle now resolves to
    /// real pixels (or kept its placeholder if the load failed).
    TextureLoaded {
        /// Path the load was requested with, relative to the resource root
        path: String,
        /// Handle the texture was published under
        texture: TextureId,
    },

    /// The window changed size.
    WindowResized {
        /// New width in physical pixels
        width: u32,
        /// New height in physical pixels
        height: u32,
    },

    /// An entity was created in the registry.
    EntitySpawned {
        /// The new entity
        entity: EntityId,
    },

    /// An entity was removed from the registry.
    EntityDestroyed {
        /// The removed entity
        entity: EntityId,
    },

    /// Ask the engine to play a loaded sound at the frame boundary.
    PlaySound {
        /// Name the sound was registered under
        name: &'static str,
        /// Playback volume, where 1.0 is the sound's base level
        volume: f32,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Two [`VecDeque`]s swapped once per frame.
///
/// `push` appends to the incoming buffer; `iter` and `drain` read the
/// current buffer, which holds what was pushed the frame before. The
/// engine owns the [`swap`](Self::swap) call.
#[derive(Debug)]
pub struct EventQueue {
    /// Written to by this frame's pushes
    incoming: VecDeque<GameEvent>,
    /// Holds last frame's pushes, readable now
    current: VecDeque<GameEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            incoming: VecDeque::with_capacity(capacity),
            current: VecDeque::with_capacity(capacity),
        }
    }

    /// Queue an event for next frame's readers.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.incoming.push_back(event);
    }

    /// Make this frame's pushes readable and start a fresh incoming
    /// buffer. The engine calls this once at the frame boundary; events
    /// that were readable this frame and never drained are dropped.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.incoming, &mut self.current);
        self.incoming.clear();
    }

    /// Read last frame's events without consuming them.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.current.iter()
    }

    /// Consume last frame's events.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.current.drain(..)
    }

    /// True when nothing is readable this frame.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// How many events are readable this frame.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// How many events are queued for next frame.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.incoming.len()
    }

    /// Drop both buffers, e.g. across a scene transition.
    pub fn clear(&mut self) {
        self.incoming.clear();
        self.current.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
