//! Time management utilities

use std::time::Instant;

/// Delta time handed to the per-frame scene phases, in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct TimeStep(f32);

impl TimeStep {
    /// Create a time step from seconds
    pub const fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    /// Create a time step for a fixed update rate (e.g. 60 Hz)
    pub fn from_hz(hz: f32) -> Self {
        Self(if hz > 0.0 { 1.0 / hz } else { 0.0 })
    }

    /// Step length in seconds
    pub const fn seconds(self) -> f32 {
        self.0
    }

    /// Step length in milliseconds
    pub fn millis(self) -> f32 {
        self.0 * 1000.0
    }
}

impl From<f32> for TimeStep {
    fn from(seconds: f32) -> Self {
        Self(seconds)
    }
}

/// Wall-clock frame timer
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) -> TimeStep {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
        TimeStep(self.delta_time)
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
