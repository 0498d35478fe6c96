//! Debug overlay state
//!
//! Rolling frame statistics plus whatever lines the engine and the game
//! want shown: arena usage is recorded by the engine every frame, custom
//! lines come from the game and are cleared when it says so.

use std::collections::VecDeque;
use std::time::Duration;

/// How many frames the statistics window holds.
const SAMPLE_WINDOW: usize = 120;

/// Frame times over a rolling window.
///
/// Only the raw samples are stored; fps and the min/avg/max readouts are
/// computed when asked for, which happens at most once per overlay draw.
#[derive(Debug, Default)]
pub struct FrameStats {
    samples: VecDeque<Duration>,
    total_frames: u64,
}

impl FrameStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(SAMPLE_WINDOW),
            total_frames: 0,
        }
    }

    /// Push one frame's delta into the window, dropping the oldest
    /// sample once the window is full.
    pub fn record_frame(&mut self, delta: Duration) {
        self.total_frames += 1;
        if self.samples.len() == SAMPLE_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(delta);
    }

    fn window_seconds(&self) -> f32 {
        self.samples.iter().sum::<Duration>().as_secs_f32()
    }

    /// Frames per second averaged over the window. Zero until a frame
    /// with nonzero delta has been recorded.
    #[must_use]
    pub fn fps(&self) -> f32 {
        let seconds = self.window_seconds();
        if seconds > 0.0 {
            self.samples.len() as f32 / seconds
        } else {
            0.0
        }
    }

    /// Mean frame time over the window, in milliseconds.
    #[must_use]
    pub fn avg_frame_time_ms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.window_seconds() * 1000.0 / self.samples.len() as f32
    }

    /// Fastest frame in the window, in milliseconds.
    #[must_use]
    pub fn min_frame_time_ms(&self) -> f32 {
        self.samples
            .iter()
            .min()
            .map_or(0.0, |dt| dt.as_secs_f32() * 1000.0)
    }

    /// Slowest frame in the window, in milliseconds.
    #[must_use]
    pub fn max_frame_time_ms(&self) -> f32 {
        self.samples
            .iter()
            .max()
            .map_or(0.0, |dt| dt.as_secs_f32() * 1000.0)
    }

    /// Frames recorded since startup, not just the window.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// One-line overlay text.
    #[must_use]
    pub fn format_stats(&self) -> String {
        format!(
            "FPS: {:.1} | Frame: {:.2}ms (min: {:.2}, max: {:.2})",
            self.fps(),
            self.avg_frame_time_ms(),
            self.min_frame_time_ms(),
            self.max_frame_time_ms()
        )
    }
}

/// Everything an overlay would draw.
#[derive(Debug, Default)]
pub struct DebugInfo {
    /// Whether the overlay should be drawn at all
    pub enabled: bool,
    /// Frame timing window
    pub frame_stats: FrameStats,
    /// Arena usage recorded by the engine, one entry per arena
    arena_usage: Vec<(String, usize, usize)>,
    /// Extra lines added by the game
    custom_lines: Vec<String>,
}

impl DebugInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Append a line of overlay text. Lines persist until
    /// [`clear_lines`](Self::clear_lines).
    pub fn add_line(&mut self, line: impl Into<String>) {
        self.custom_lines.push(line.into());
    }

    pub fn clear_lines(&mut self) {
        self.custom_lines.clear();
    }

    /// Record how full an arena is. Entries are keyed by name, so calling
    /// this every frame updates in place instead of growing the list.
    pub fn record_arena_usage(&mut self, name: &str, used: usize, capacity: usize) {
        if let Some(entry) = self.arena_usage.iter_mut().find(|(n, _, _)| n == name) {
            entry.1 = used;
            entry.2 = capacity;
        } else {
            self.arena_usage.push((name.to_string(), used, capacity));
        }
    }

    /// Every overlay line: frame stats, then arena usage, then custom
    /// lines.
    #[must_use]
    pub fn get_all_lines(&self) -> Vec<String> {
        let mut lines = vec![self.frame_stats.format_stats()];
        for (name, used, capacity) in &self.arena_usage {
            let percent = if *capacity > 0 {
                *used as f32 / *capacity as f32 * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "arena {}: {} / {} ({:.1}%)",
                name,
                format_bytes(*used),
                format_bytes(*capacity),
                percent
            ));
        }
        lines.extend(self.custom_lines.iter().cloned());
        lines
    }

    /// Forwarded to [`FrameStats::record_frame`] by the engine loop.
    pub fn record_frame(&mut self, delta: Duration) {
        self.frame_stats.record_frame(delta);
    }
}

fn format_bytes(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_frame_updates_stats() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::from_millis(16));
        stats.record_frame(Duration::from_millis(16));
        assert_eq!(stats.total_frames(), 2);
        assert!(stats.fps() > 0.0);
        assert!(stats.avg_frame_time_ms() > 15.0);
    }

    #[test]
    fn test_window_drops_oldest_sample() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::from_millis(100));
        for _ in 0..SAMPLE_WINDOW {
            stats.record_frame(Duration::from_millis(10));
        }

        // The 100ms outlier has rolled out of the window.
        assert!((stats.max_frame_time_ms() - 10.0).abs() < 0.5);
        assert_eq!(stats.total_frames(), SAMPLE_WINDOW as u64 + 1);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = FrameStats::new();
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.avg_frame_time_ms(), 0.0);
        assert_eq!(stats.min_frame_time_ms(), 0.0);
        assert_eq!(stats.max_frame_time_ms(), 0.0);
    }

    #[test]
    fn test_arena_usage_updates_in_place() {
        let mut debug = DebugInfo::new();
        debug.record_arena_usage("game", 1024, 8 * 1024 * 1024);
        debug.record_arena_usage("game", 2048, 8 * 1024 * 1024);
        debug.record_arena_usage("engine", 0, 10 * 1024 * 1024);

        let lines = debug.get_all_lines();
        // frame stats line plus one line per arena
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("game"));
        assert!(lines[1].contains("2.0 KiB"));
        assert!(lines[2].contains("engine"));
    }

    #[test]
    fn test_custom_lines_follow_arena_lines() {
        let mut debug = DebugInfo::new();
        debug.record_arena_usage("game", 0, 1024);
        debug.add_line("entities: 12");
        let lines = debug.get_all_lines();
        assert_eq!(lines.last().map(String::as_str), Some("entities: 12"));

        debug.clear_lines();
        assert_eq!(debug.get_all_lines().len(), 2);
    }
}
