//! Arena (Bump) Allocator
//!
//! A linear allocator over one fixed backing buffer. Allocation moves an
//! offset forward; there is no per-allocation free. What it gives back
//! instead:
//!
//! - **Pop latest**: the most recent allocation can be rolled back, which
//!   covers the common "allocate, try, discard" pattern.
//! - **Resize in place**: growing the most recent allocation is free; any
//!   older allocation is moved to fresh space and copied.
//! - **Marks**: capture the current state, allocate scratch data, then
//!   reset back in O(1).
//!
//! Allocations are handed out as typed handles ([`ArenaRef`] /
//! [`ArenaSlice`]) rather than references, so the arena can stay mutable
//! between accesses. Element types must be [`bytemuck::Pod`], which lets
//! handles resolve through plain byte reinterpretation with no `unsafe`.
//!
//! Running out of space is a logged error and a `None`, not a panic; the
//! caller decides whether that is fatal.

use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use bytemuck::Pod;
use log::{error, warn};

// ============================================================================
// Handles
// ============================================================================

/// Handle to a single `T` allocated from an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaRef<T: Pod> {
    offset: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> ArenaRef<T> {
    /// Byte offset of the allocation inside the arena.
    #[must_use]
    #[inline]
    pub const fn offset(self) -> usize {
        self.offset
    }

    const fn end(self) -> usize {
        self.offset + size_of::<T>()
    }
}

/// Handle to a `[T]` allocated from an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSlice<T: Pod> {
    offset: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> ArenaSlice<T> {
    /// Byte offset of the allocation inside the arena.
    #[must_use]
    #[inline]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Number of elements in the slice.
    #[must_use]
    #[inline]
    pub const fn len(self) -> usize {
        self.len
    }

    /// Whether the slice holds zero elements.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    const fn end(self) -> usize {
        self.offset + self.len * size_of::<T>()
    }
}

/// Saved arena state for scratch scopes. See [`Arena::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaMark {
    offset: usize,
    prev_offset: usize,
}

// ============================================================================
// Arena
// ============================================================================

/// Bump allocator over a fixed, pre-sized buffer.
///
/// | Operation        | Cost                                   |
/// |------------------|----------------------------------------|
/// | `alloc`          | O(1)                                   |
/// | `pop_latest`     | O(1), most recent allocation only      |
/// | `resize`         | O(1) if most recent, else O(n) copy    |
/// | `reset_to`       | O(1)                                   |
/// | `clear`          | O(1)                                   |
///
/// The arena tracks the previous offset alongside the current one, which
/// is what makes `pop_latest` and the in-place `resize` fast path work:
/// an allocation is "latest" exactly when it starts at the previous
/// offset and ends at the current one.
pub struct Arena {
    name: String,
    data: Box<[u8]>,
    offset: usize,
    prev_offset: usize,
}

const fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}

impl Arena {
    /// Create an arena backed by `capacity` zeroed bytes.
    ///
    /// The name shows up in log messages and the debug overlay.
    #[must_use]
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            data: vec![0u8; capacity].into_boxed_slice(),
            offset: 0,
            prev_offset: 0,
        }
    }

    /// Allocate one `T`, zero-initialized.
    ///
    /// Returns `None` (after logging an error) when the arena is out of
    /// space.
    pub fn alloc<T: Pod>(&mut self) -> Option<ArenaRef<T>> {
        let slice = self.alloc_slice::<T>(1)?;
        Some(ArenaRef {
            offset: slice.offset,
            _marker: PhantomData,
        })
    }

    /// Allocate `len` elements of `T`, zero-initialized.
    ///
    /// Returns `None` (after logging an error) when the arena is out of
    /// space.
    pub fn alloc_slice<T: Pod>(&mut self, len: usize) -> Option<ArenaSlice<T>> {
        // Alignment is computed against the real base address, which is
        // stable for the lifetime of the arena.
        let base = self.data.as_ptr() as usize;
        let start = align_up(base + self.offset, align_of::<T>()) - base;
        let size = len * size_of::<T>();
        let end = start + size;

        if end > self.data.len() {
            error!(
                "arena '{}': out of memory (requested {} bytes, {} of {} in use)",
                self.name,
                size,
                self.offset,
                self.data.len()
            );
            return None;
        }

        // Freshly bumped regions may hold stale bytes from popped
        // allocations; hand out zeroed memory.
        self.data[start..end].fill(0);
        self.prev_offset = start;
        self.offset = end;

        Some(ArenaSlice {
            offset: start,
            len,
            _marker: PhantomData,
        })
    }

    /// Roll back the most recent allocation.
    ///
    /// Only the allocation made last can be popped. Passing anything else
    /// logs a warning and leaves the arena untouched.
    pub fn pop_latest<T: Pod>(&mut self, alloc: ArenaSlice<T>) {
        self.pop_region(alloc.offset, alloc.end());
    }

    /// Roll back the most recent single-value allocation.
    pub fn pop_latest_ref<T: Pod>(&mut self, alloc: ArenaRef<T>) {
        self.pop_region(alloc.offset, alloc.end());
    }

    fn pop_region(&mut self, start: usize, end: usize) {
        if start == self.prev_offset && end == self.offset {
            self.offset = self.prev_offset;
        } else {
            warn!(
                "arena '{}': pop_latest called on an allocation that is not the latest",
                self.name
            );
        }
    }

    /// Resize a slice allocation.
    ///
    /// If `alloc` is the most recent allocation the arena grows or shrinks
    /// it in place and the handle keeps its offset. Otherwise fresh space
    /// is allocated and `min(old, new)` elements are copied over.
    ///
    /// Returns `None` when the arena cannot fit the new size, or when the
    /// handle does not lie inside the arena.
    pub fn resize<T: Pod>(
        &mut self,
        alloc: ArenaSlice<T>,
        new_len: usize,
    ) -> Option<ArenaSlice<T>> {
        if alloc.end() > self.data.len() {
            error!(
                "arena '{}': resize called with a handle outside the arena",
                self.name
            );
            return None;
        }

        if alloc.offset == self.prev_offset && alloc.end() == self.offset {
            // Most recent allocation: move the offset, keep the data.
            let new_end = alloc.offset + new_len * size_of::<T>();
            if new_end > self.data.len() {
                error!(
                    "arena '{}': out of memory resizing to {} elements",
                    self.name, new_len
                );
                return None;
            }
            if new_end > self.offset {
                self.data[self.offset..new_end].fill(0);
            }
            self.offset = new_end;
            return Some(ArenaSlice {
                offset: alloc.offset,
                len: new_len,
                _marker: PhantomData,
            });
        }

        let new_alloc = self.alloc_slice::<T>(new_len)?;
        let copy_bytes = alloc.len.min(new_len) * size_of::<T>();
        self.data.copy_within(
            alloc.offset..alloc.offset + copy_bytes,
            new_alloc.offset,
        );
        Some(new_alloc)
    }

    /// Resolve a handle to a shared reference.
    ///
    /// Returns `None` if the handle does not lie inside the arena (for
    /// example after the backing was shrunk by `resize`).
    #[must_use]
    pub fn get<T: Pod>(&self, r: ArenaRef<T>) -> Option<&T> {
        self.data
            .get(r.offset..r.end())
            .map(bytemuck::from_bytes)
    }

    /// Resolve a handle to a mutable reference.
    pub fn get_mut<T: Pod>(&mut self, r: ArenaRef<T>) -> Option<&mut T> {
        self.data
            .get_mut(r.offset..r.end())
            .map(bytemuck::from_bytes_mut)
    }

    /// Resolve a slice handle to a shared slice.
    #[must_use]
    pub fn slice<T: Pod>(&self, s: ArenaSlice<T>) -> Option<&[T]> {
        self.data.get(s.offset..s.end()).map(bytemuck::cast_slice)
    }

    /// Resolve a slice handle to a mutable slice.
    pub fn slice_mut<T: Pod>(&mut self, s: ArenaSlice<T>) -> Option<&mut [T]> {
        self.data
            .get_mut(s.offset..s.end())
            .map(bytemuck::cast_slice_mut)
    }

    /// Capture the current state for a scratch scope.
    ///
    /// Allocate freely afterwards, then hand the mark back to
    /// [`reset_to`](Self::reset_to) to drop everything allocated since.
    #[must_use]
    pub fn mark(&self) -> ArenaMark {
        ArenaMark {
            offset: self.offset,
            prev_offset: self.prev_offset,
        }
    }

    /// Restore the state captured by [`mark`](Self::mark).
    ///
    /// Handles created after the mark must not be used afterwards; they
    /// will resolve to recycled bytes.
    pub fn reset_to(&mut self, mark: ArenaMark) {
        self.offset = mark.offset;
        self.prev_offset = mark.prev_offset;
    }

    /// Drop every allocation. The backing buffer is kept.
    pub fn clear(&mut self) {
        self.offset = 0;
        self.prev_offset = 0;
    }

    /// Bytes currently in use.
    #[must_use]
    #[inline]
    pub const fn used(&self) -> usize {
        self.offset
    }

    /// Total backing size in bytes.
    #[must_use]
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Fraction of the arena in use, in `[0, 1]`.
    #[must_use]
    pub fn usage(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.offset as f32 / self.data.len() as f32
    }

    /// Arena name, as given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("name", &self.name)
            .field("used", &self.offset)
            .field("capacity", &self.data.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
