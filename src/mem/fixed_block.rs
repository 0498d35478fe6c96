//! Fixed-Block Allocator
//!
//! Hands out uniform blocks from one pre-sized buffer. Fresh blocks are
//! bumped off the end of the buffer until it is exhausted; after that,
//! allocation reuses freed blocks. The free list is intrusive: a freed
//! block's first four bytes store the index of the next free block, so
//! the list costs no extra memory. Blocks are reclaimed in the order they
//! were freed (the list is appended at the tail and popped at the head).
//!
//! Because the link is written into the block itself, the block type must
//! be at least as large as a `u32`. [`FixedBlockAllocator::new`] checks
//! this at construction.

use std::mem::size_of;

use bytemuck::Pod;
use log::{error, warn};

/// Index of a block inside a [`FixedBlockAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockIndex(u32);

impl BlockIndex {
    /// Get the raw index value.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

const NONE: u32 = u32::MAX;

/// Pool of uniform `T` blocks with an intrusive free list.
pub struct FixedBlockAllocator<T: Pod> {
    blocks: Box<[T]>,
    /// First block never handed out yet; bump allocation cursor.
    next_fresh: u32,
    free_head: u32,
    free_tail: u32,
    in_use: u32,
}

impl<T: Pod> FixedBlockAllocator<T> {
    /// Create an allocator holding `num_blocks` zeroed blocks.
    ///
    /// # Panics
    ///
    /// Panics if `T` is smaller than a `u32`; the free-list link would not
    /// fit inside a freed block.
    #[must_use]
    pub fn new(num_blocks: usize) -> Self {
        assert!(
            size_of::<T>() >= size_of::<u32>(),
            "fixed-block allocator needs blocks of at least {} bytes to hold the free-list link",
            size_of::<u32>()
        );
        assert!(num_blocks < NONE as usize, "block count does not fit the index type");
        Self {
            blocks: vec![T::zeroed(); num_blocks].into_boxed_slice(),
            next_fresh: 0,
            free_head: NONE,
            free_tail: NONE,
            in_use: 0,
        }
    }

    /// Allocate one block, zero-initialized.
    ///
    /// Prefers blocks from the free list; falls back to fresh blocks from
    /// the buffer. Returns `None` (after logging an error) when every
    /// block is in use.
    pub fn alloc(&mut self) -> Option<BlockIndex> {
        let index = if self.free_head != NONE {
            let index = self.free_head;
            self.free_head = self.read_link(index);
            if self.free_head == NONE {
                self.free_tail = NONE;
            }
            self.blocks[index as usize] = T::zeroed();
            index
        } else if (self.next_fresh as usize) < self.blocks.len() {
            let index = self.next_fresh;
            self.next_fresh += 1;
            index
        } else {
            error!(
                "fixed-block allocator: out of blocks ({} in use)",
                self.in_use
            );
            return None;
        };

        self.in_use += 1;
        Some(BlockIndex(index))
    }

    /// Return a block to the allocator.
    ///
    /// The block's contents are overwritten by the free-list link. Freeing
    /// an index outside the allocator logs a warning and does nothing.
    pub fn free(&mut self, block: BlockIndex) {
        let index = block.0;
        if index as usize >= self.blocks.len() || index >= self.next_fresh {
            warn!("fixed-block allocator: free called with invalid block {index}");
            return;
        }

        self.write_link(index, NONE);
        if self.free_tail == NONE {
            self.free_head = index;
        } else {
            let tail = self.free_tail;
            self.write_link(tail, index);
        }
        self.free_tail = index;
        self.in_use = self.in_use.saturating_sub(1);
    }

    /// Access a block.
    ///
    /// The allocator does not track which blocks are live; reading a freed
    /// block yields its free-list link bytes.
    #[must_use]
    #[inline]
    pub fn get(&self, block: BlockIndex) -> Option<&T> {
        self.blocks.get(block.0 as usize)
    }

    /// Access a block mutably.
    #[inline]
    pub fn get_mut(&mut self, block: BlockIndex) -> Option<&mut T> {
        self.blocks.get_mut(block.0 as usize)
    }

    /// Forget every allocation and free. The buffer is kept.
    pub fn clear(&mut self) {
        self.next_fresh = 0;
        self.free_head = NONE;
        self.free_tail = NONE;
        self.in_use = 0;
    }

    /// Number of blocks currently handed out.
    #[must_use]
    #[inline]
    pub const fn in_use(&self) -> u32 {
        self.in_use
    }

    /// Total number of blocks.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks still available (fresh or freed).
    #[must_use]
    pub fn available(&self) -> usize {
        self.blocks.len() - self.in_use as usize
    }

    fn read_link(&self, index: u32) -> u32 {
        let bytes = bytemuck::bytes_of(&self.blocks[index as usize]);
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn write_link(&mut self, index: u32, next: u32) {
        let bytes = bytemuck::bytes_of_mut(&mut self.blocks[index as usize]);
        bytes[..4].copy_from_slice(&next.to_le_bytes());
    }
}

impl<T: Pod> std::fmt::Debug for FixedBlockAllocator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedBlockAllocator")
            .field("capacity", &self.blocks.len())
            .field("in_use", &self.in_use)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_until_full() {
        let mut alloc: FixedBlockAllocator<u64> = FixedBlockAllocator::new(3);

        assert!(alloc.alloc().is_some());
        assert!(alloc.alloc().is_some());
        assert!(alloc.alloc().is_some());
        assert!(alloc.alloc().is_none(), "fourth block must fail");
        assert_eq!(alloc.in_use(), 3);
        assert_eq!(alloc.available(), 0);
    }

    #[test]
    fn test_free_then_realloc() {
        let mut alloc: FixedBlockAllocator<u64> = FixedBlockAllocator::new(2);

        let a = alloc.alloc().unwrap();
        let _b = alloc.alloc().unwrap();
        assert!(alloc.alloc().is_none());

        alloc.free(a);
        let c = alloc.alloc().unwrap();
        assert_eq!(c.raw(), a.raw(), "freed block should be reused");
        assert_eq!(alloc.in_use(), 2);
    }

    #[test]
    fn test_reclaim_is_fifo() {
        let mut alloc: FixedBlockAllocator<u64> = FixedBlockAllocator::new(4);

        let blocks: Vec<_> = (0..4).map(|_| alloc.alloc().unwrap()).collect();

        // Free out of order: 2, 0, 3.
        alloc.free(blocks[2]);
        alloc.free(blocks[0]);
        alloc.free(blocks[3]);

        // Reclaim must follow free order, not index order.
        assert_eq!(alloc.alloc().unwrap().raw(), 2);
        assert_eq!(alloc.alloc().unwrap().raw(), 0);
        assert_eq!(alloc.alloc().unwrap().raw(), 3);
        assert!(alloc.alloc().is_none());
    }

    #[test]
    fn test_reuse_hands_out_zeroed_blocks() {
        let mut alloc: FixedBlockAllocator<[u32; 4]> = FixedBlockAllocator::new(2);

        let a = alloc.alloc().unwrap();
        *alloc.get_mut(a).unwrap() = [1, 2, 3, 4];
        alloc.free(a);

        let b = alloc.alloc().unwrap();
        assert_eq!(*alloc.get(b).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn test_free_invalid_index_is_ignored() {
        let mut alloc: FixedBlockAllocator<u64> = FixedBlockAllocator::new(2);

        let a = alloc.alloc().unwrap();
        alloc.free(BlockIndex(99));
        assert_eq!(alloc.in_use(), 1);
        alloc.free(a);
        assert_eq!(alloc.in_use(), 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut alloc: FixedBlockAllocator<u64> = FixedBlockAllocator::new(2);

        let a = alloc.alloc().unwrap();
        let _ = alloc.alloc().unwrap();
        alloc.free(a);

        alloc.clear();
        assert_eq!(alloc.in_use(), 0);
        assert_eq!(alloc.available(), 2);
        assert_eq!(alloc.alloc().unwrap().raw(), 0);
    }

    #[test]
    #[should_panic(expected = "fixed-block allocator needs blocks")]
    fn test_block_too_small_panics() {
        let _ = FixedBlockAllocator::<u16>::new(4);
    }
}
