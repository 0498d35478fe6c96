//! Memory Allocators
//!
//! Frame and level memory is carved out of pre-sized buffers instead of
//! going through the global allocator. Two strategies are provided:
//!
//! - [`Arena`]: linear bump allocation with rollback of the most recent
//!   allocation and cheap whole-arena resets. Used for the engine's own
//!   scratch memory and for the per-game memory block.
//! - [`FixedBlockAllocator`]: uniform blocks with an intrusive free list,
//!   for object types that churn at a fixed size.

pub mod arena;
pub mod fixed_block;

pub use arena::{Arena, ArenaMark, ArenaRef, ArenaSlice};
pub use fixed_block::{BlockIndex, FixedBlockAllocator};
