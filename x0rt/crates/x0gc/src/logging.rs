//! GC Logging and Tracing
//!
//! Collection events are recorded by [`GcLogger`] and always forwarded to the
//! `log` facade. With console output enabled they are also printed, either
//! as text lines or as JSON lines.
//!
//! Log Levels:
//! - ERROR: unrecoverable collector failures
//! - WARN: allocation misses
//! - INFO: cycles, heap usage
//! - DEBUG: relocation totals, protection changes
//! - TRACE: per-object copies (emitted directly by the relocator)

use crate::config::GcConfig;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Log level for GC events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// GC event types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GcEvent {
    /// Collection pass started
    CycleStart {
        cycle: u64,
        reason: String,
        live_roots: usize,
    },

    /// Collection pass completed
    CycleEnd {
        cycle: u64,
        duration_ms: f64,
        words_live: usize,
        words_reclaimed: usize,
    },

    /// Active space usage
    HeapStats {
        used_words: usize,
        space_words: usize,
        utilization: f64,
    },

    /// Totals of one relocation
    RelocateStats {
        relocated_count: usize,
        words_moved: usize,
        table_entries: usize,
    },

    /// Allocation did not fit in the active space
    AllocationFailure { requested: usize, available: usize },

    /// Semi-spaces exchanged roles
    ProtectionChange { active: String, protected: String },
}

impl GcEvent {
    /// Level the event is reported at
    pub fn level(&self) -> LogLevel {
        match self {
            GcEvent::AllocationFailure { .. } => LogLevel::Warn,
            GcEvent::CycleStart { .. } | GcEvent::CycleEnd { .. } | GcEvent::HeapStats { .. } => {
                LogLevel::Info
            },
            GcEvent::RelocateStats { .. } | GcEvent::ProtectionChange { .. } => LogLevel::Debug,
        }
    }

    /// JSON line for the event
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!("{{\"type\":\"error\",\"message\":\"{}\"}}", e))
    }
}

impl fmt::Display for GcEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcEvent::CycleStart {
                cycle,
                reason,
                live_roots,
            } => write!(
                f,
                "[GC] Cycle {} started (reason: {}, {} live roots)",
                cycle, reason, live_roots
            ),
            GcEvent::CycleEnd {
                cycle,
                duration_ms,
                words_live,
                words_reclaimed,
            } => write!(
                f,
                "[GC] Cycle {} completed ({:.3}ms, {} words live, {} words reclaimed)",
                cycle, duration_ms, words_live, words_reclaimed
            ),
            GcEvent::HeapStats {
                used_words,
                space_words,
                utilization,
            } => write!(
                f,
                "[GC] Heap: {}/{} words ({:.1}% utilized)",
                used_words,
                space_words,
                utilization * 100.0
            ),
            GcEvent::RelocateStats {
                relocated_count,
                words_moved,
                table_entries,
            } => write!(
                f,
                "[GC] Relocated: {} objects ({} words moved, {} table entries)",
                relocated_count, words_moved, table_entries
            ),
            GcEvent::AllocationFailure {
                requested,
                available,
            } => write!(
                f,
                "[GC] Allocation failure: {} words requested, {} available",
                requested, available
            ),
            GcEvent::ProtectionChange { active, protected } => write!(
                f,
                "[GC] Spaces swapped: {} active, {} protected",
                active, protected
            ),
        }
    }
}

/// GC Logger configuration
#[derive(Debug, Clone)]
pub struct GcLoggerConfig {
    /// Most detailed level kept in the history and printed
    pub level: LogLevel,

    /// Print events to stdout
    pub console: bool,

    /// Print JSON lines instead of text
    pub json: bool,

    /// Prefix console lines with a local timestamp
    pub timestamps: bool,

    /// Maximum number of events kept in the history
    pub history: usize,
}

impl Default for GcLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: false,
            json: false,
            timestamps: true,
            history: 256,
        }
    }
}

impl GcLoggerConfig {
    /// Logger settings implied by a collector configuration
    pub fn from_gc_config(config: &GcConfig) -> Self {
        Self {
            console: config.verbose,
            json: config.json_log,
            level: if config.verbose {
                LogLevel::Debug
            } else {
                LogLevel::Info
            },
            ..Default::default()
        }
    }
}

/// A recorded event with its wall-clock time
pub type TimedEvent = (chrono::DateTime<chrono::Local>, GcEvent);

/// GC Logger - event sink for one collector
pub struct GcLogger {
    config: GcLoggerConfig,
    events: Mutex<VecDeque<TimedEvent>>,
    enabled: AtomicBool,
}

impl GcLogger {
    /// Create new GC logger
    pub fn new(config: GcLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(VecDeque::new()),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &GcLoggerConfig {
        &self.config
    }

    /// Enable logging
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable logging
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Log a GC event
    ///
    /// The `log` facade always sees the event; history and console output
    /// respect the enabled flag and the configured level.
    pub fn log(&self, event: GcEvent) {
        let level = event.level();
        log::log!(target: "x0gc", log::Level::from(level), "{}", event);

        if !self.is_enabled() || level > self.config.level {
            return;
        }

        let timestamp = chrono::Local::now();

        if self.config.console {
            self.output_console(&timestamp, &event);
        }

        if self.config.history == 0 {
            return;
        }
        if let Ok(mut events) = self.events.lock() {
            while events.len() >= self.config.history {
                events.pop_front();
            }
            events.push_back((timestamp, event));
        }
    }

    fn output_console(&self, timestamp: &chrono::DateTime<chrono::Local>, event: &GcEvent) {
        let line = if self.config.json {
            event.to_json()
        } else {
            event.to_string()
        };

        if self.config.timestamps {
            println!("[{}] {}", timestamp.format("%Y-%m-%d %H:%M:%S%.3f"), line);
        } else {
            println!("{}", line);
        }
    }

    /// Get all retained events, oldest first
    pub fn get_events(&self) -> Vec<TimedEvent> {
        if let Ok(events) = self.events.lock() {
            events.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Clear all events
    pub fn clear_events(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        if let Ok(events) = self.events.lock() {
            events.len()
        } else {
            0
        }
    }
}

impl Default for GcLogger {
    fn default() -> Self {
        Self::new(GcLoggerConfig::default())
    }
}

impl fmt::Debug for GcLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcLogger")
            .field("config", &self.config)
            .field("enabled", &self.is_enabled())
            .field("events", &self.event_count())
            .finish()
    }
}
