//! GC Timer - Timing Utilities
//!
//! Measures collection pauses with `Instant`.

use std::time::{Duration, Instant};

/// GcTimer - timer for measuring one collection pass
#[derive(Debug, Clone, Copy)]
pub struct GcTimer {
    start: Instant,
}

impl GcTimer {
    /// Start a new timer
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed microseconds
    pub fn elapsed_us(&self) -> u64 {
        u64::try_from(self.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    /// Get elapsed milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for GcTimer {
    fn default() -> Self {
        Self::new()
    }
}
