//! Stats Module - Collector Counters
//!
//! Counts what the collector did over its lifetime:
//! - Cycles, and how many were forced by an allocation miss
//! - Objects and words copied (total and last pass)
//! - Words reclaimed
//! - Pause time (total and maximum)
//!
//! The collector is single-threaded, so plain integers suffice.

pub mod timer;

pub use timer::GcTimer;

use serde::Serialize;
use std::time::Duration;

/// GcStats - lifetime counters of one collector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GcStats {
    /// Completed collection passes
    pub cycles: u64,
    /// Passes started because an allocation did not fit
    pub allocation_triggered: u64,
    /// Successful allocations
    pub allocations: u64,
    /// Words handed out by successful allocations
    pub words_allocated: u64,
    /// Objects copied over all passes
    pub objects_copied: u64,
    /// Words copied over all passes
    pub words_copied: u64,
    /// Objects copied by the most recent pass
    pub last_objects_copied: usize,
    /// Words live after the most recent pass
    pub last_words_copied: usize,
    /// Words freed over all passes
    pub words_reclaimed: u64,
    /// Total pause time in microseconds
    pub total_pause_us: u64,
    /// Longest single pause in microseconds
    pub max_pause_us: u64,
}

impl GcStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful allocation
    pub fn record_allocation(&mut self, words: usize) {
        self.allocations += 1;
        self.words_allocated += words as u64;
    }

    /// Record a completed pass
    pub fn record_collection(
        &mut self,
        objects_copied: usize,
        words_before: usize,
        words_after: usize,
        pause: Duration,
    ) {
        let pause_us = u64::try_from(pause.as_micros()).unwrap_or(u64::MAX);

        self.cycles += 1;
        self.objects_copied += objects_copied as u64;
        self.words_copied += words_after as u64;
        self.last_objects_copied = objects_copied;
        self.last_words_copied = words_after;
        self.words_reclaimed += words_before.saturating_sub(words_after) as u64;
        self.total_pause_us = self.total_pause_us.saturating_add(pause_us);
        self.max_pause_us = self.max_pause_us.max(pause_us);
    }

    /// Record that an allocation miss forced a pass
    pub fn record_allocation_trigger(&mut self) {
        self.allocation_triggered += 1;
    }

    /// Average pause in microseconds, 0 before the first pass
    pub fn avg_pause_us(&self) -> u64 {
        if self.cycles == 0 {
            0
        } else {
            self.total_pause_us / self.cycles
        }
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_collection() {
        let mut stats = GcStats::new();
        stats.record_collection(3, 100, 40, Duration::from_micros(50));
        stats.record_collection(1, 60, 60, Duration::from_micros(10));

        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.objects_copied, 4);
        assert_eq!(stats.last_words_copied, 60);
        assert_eq!(stats.words_reclaimed, 60);
        assert_eq!(stats.max_pause_us, 50);
        assert_eq!(stats.avg_pause_us(), 30);
    }

    #[test]
    fn test_reset() {
        let mut stats = GcStats::new();
        stats.record_allocation(4);
        stats.record_allocation_trigger();
        stats.reset();
        assert_eq!(stats, GcStats::default());
    }

    #[test]
    fn test_serializes_to_json() {
        let mut stats = GcStats::new();
        stats.record_allocation(2);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["allocations"], 1);
        assert_eq!(json["words_allocated"], 2);
    }
}
