//! Mutex-Protected Ring Buffer
//!
//! Fixed-capacity FIFO shared between threads. All operations take the
//! internal lock; none of them block waiting for space or items, so the
//! queue composes with whatever signalling the caller layers on top.
//!
//! One slot is kept empty to tell a full ring from an empty one, so a
//! queue created with capacity `N` holds at most `N - 1` items.

use std::sync::Mutex;

struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
}

impl<T> Ring<T> {
    fn len(&self) -> usize {
        (self.tail + self.slots.len() - self.head) % self.slots.len()
    }
}

/// Fixed-capacity FIFO queue, safe to share by reference across threads.
pub struct MutexQueue<T> {
    ring: Mutex<Ring<T>>,
}

impl<T> MutexQueue<T> {
    /// Create a queue with room for `capacity - 1` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is less than 2 (such a ring could hold
    /// nothing).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "ring buffer capacity must be at least 2");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            ring: Mutex::new(Ring {
                slots: slots.into_boxed_slice(),
                head: 0,
                tail: 0,
            }),
        }
    }

    /// Append an item at the back.
    ///
    /// Returns the item back as `Err` when the queue is full; nothing is
    /// dropped silently.
    pub fn push_back(&self, value: T) -> Result<(), T> {
        let mut ring = self.ring.lock().unwrap();
        let next = (ring.tail + 1) % ring.slots.len();
        if next == ring.head {
            return Err(value);
        }
        let tail = ring.tail;
        ring.slots[tail] = Some(value);
        ring.tail = next;
        Ok(())
    }

    /// Remove and return the front item, if any.
    pub fn pop_front(&self) -> Option<T> {
        let mut ring = self.ring.lock().unwrap();
        if ring.head == ring.tail {
            return None;
        }
        let head = ring.head;
        let value = ring.slots[head].take();
        ring.head = (head + 1) % ring.slots.len();
        value
    }

    /// Remove every queued item in one locked operation, preserving order.
    ///
    /// Items pushed by other threads after the drain took the lock are
    /// left for the next drain.
    pub fn drain(&self) -> Vec<T> {
        let mut ring = self.ring.lock().unwrap();
        let mut out = Vec::with_capacity(ring.len());
        while ring.head != ring.tail {
            let head = ring.head;
            if let Some(value) = ring.slots[head].take() {
                out.push(value);
            }
            ring.head = (head + 1) % ring.slots.len();
        }
        out
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.lock().unwrap().len()
    }

    /// Whether the queue holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let ring = self.ring.lock().unwrap();
        ring.head == ring.tail
    }

    /// Maximum number of items the queue can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ring.lock().unwrap().slots.len() - 1
    }

    /// Drop every queued item.
    pub fn clear(&self) {
        let mut ring = self.ring.lock().unwrap();
        for slot in ring.slots.iter_mut() {
            *slot = None;
        }
        ring.head = 0;
        ring.tail = 0;
    }
}

impl<T> std::fmt::Debug for MutexQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.ring.lock().unwrap();
        f.debug_struct("MutexQueue")
            .field("len", &ring.len())
            .field("capacity", &(ring.slots.len() - 1))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
