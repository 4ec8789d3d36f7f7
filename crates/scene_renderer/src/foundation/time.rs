//! Frame timing

use std::time::{Duration, Instant};

/// Wall-clock timer measuring the interval between consecutive frames
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Measure the time since the previous tick and return it in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.advance(now.duration_since(self.last_frame));
        self.last_frame = now;
        self.delta_time
    }

    /// Account for an externally measured frame interval
    pub fn advance(&mut self, elapsed: Duration) {
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since clock creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since clock creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(500));
        clock.advance(Duration::from_millis(250));

        assert_eq!(clock.frame_count(), 2);
        assert!((clock.delta_time() - 0.25).abs() < 1e-6);
        assert!((clock.total_time() - 0.75).abs() < 1e-6);
        assert!((clock.average_fps() - 2.0 / 0.75).abs() < 1e-3);
    }

    #[test]
    fn test_tick_is_non_negative() {
        let mut clock = FrameClock::new();
        assert!(clock.tick() >= 0.0);
        assert_eq!(clock.frame_count(), 1);
    }
}
