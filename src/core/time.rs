//! Frame timing
//!
//! One [`Time`] lives in the engine context and is advanced once per frame
//! by the engine loop. Games read delta and elapsed time from it instead of
//! sampling the clock themselves, so everything in a frame agrees on "now".

use std::time::{Duration, Instant};

/// Per-frame clock advanced by the engine loop.
pub struct Time {
    startup: Instant,
    last_frame: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance the clock. Called once per frame before anything else runs.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_frame);
        self.elapsed = now.duration_since(self.startup);
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Time the previous frame took.
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time the previous frame took, in seconds.
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Time since the engine started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of completed [`update`](Self::update) calls.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Instantaneous frames per second from the last delta.
    #[must_use]
    pub fn fps(&self) -> f32 {
        let secs = self.delta.as_secs_f32();
        if secs > 0.0 { 1.0 / secs } else { 0.0 }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_starts_at_zero() {
        let time = Time::new();
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.delta(), Duration::ZERO);
    }

    #[test]
    fn test_update_advances() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(2));
        time.update();
        assert_eq!(time.frame_count(), 1);
        assert!(time.delta() >= Duration::from_millis(2));
        assert!(time.elapsed() >= time.delta());
    }

    #[test]
    fn test_delta_tracks_last_frame_only() {
        let mut time = Time::new();
        time.update();
        thread::sleep(Duration::from_millis(5));
        time.update();
        let second = time.delta();
        assert!(second >= Duration::from_millis(5));
        assert_eq!(time.frame_count(), 2);
    }
}
