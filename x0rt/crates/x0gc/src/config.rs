//! Configuration Module - Heap and Root Stack Sizing
//!
//! Manages the few parameters the collector needs at initialization.
//! Sizes are fixed for the lifetime of the runtime; there is no resizing.

use crate::object::SCALAR_WORDS;

/// Main configuration for the X0 collector
///
/// # Examples
///
/// ```rust
/// use x0gc::GcConfig;
///
/// // Use default configuration
/// let config = GcConfig::default();
///
/// // Small heap for tests
/// let config = GcConfig {
///     heap_size_words: 4096,
///     root_stack_capacity: 64,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Total heap size in words
    ///
    /// Split into two equal semi-spaces; only one half serves allocations
    /// at any time. Each half is rounded up to whole pages.
    ///
    /// Default: 1Mi words
    pub heap_size_words: usize,

    /// Maximum number of entries on the root stack
    ///
    /// Default: 4096
    pub root_stack_capacity: usize,

    /// Print GC events to the console
    ///
    /// Events always reach the `log` facade; this adds stdout output.
    /// Default: false
    pub verbose: bool,

    /// Emit console events as JSON lines instead of text
    ///
    /// Default: false
    pub json_log: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            heap_size_words: DEFAULT_HEAP_WORDS,
            root_stack_capacity: DEFAULT_ROOT_STACK,
            verbose: false,
            json_log: false,
        }
    }
}

impl GcConfig {
    /// Configuration with explicit sizes and default logging
    pub fn with_sizes(heap_size_words: usize, root_stack_capacity: usize) -> Self {
        Self {
            heap_size_words,
            root_stack_capacity,
            ..Default::default()
        }
    }

    /// Words in one semi-space before page rounding
    pub fn space_words(&self) -> usize {
        self.heap_size_words / 2
    }

    /// Validate configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use x0gc::GcConfig;
    ///
    /// let config = GcConfig {
    ///     heap_size_words: 0,  // Invalid!
    ///     ..Default::default()
    /// };
    ///
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.space_words() < SCALAR_WORDS {
            return Err(ConfigError::InvalidHeapSize(format!(
                "heap_size_words must be at least {} (got {})",
                2 * SCALAR_WORDS,
                self.heap_size_words
            )));
        }

        if self
            .heap_size_words
            .checked_mul(crate::object::WORD_SIZE)
            .is_none()
        {
            return Err(ConfigError::InvalidHeapSize(
                "heap_size_words overflows the address space".to_string(),
            ));
        }

        if self.root_stack_capacity == 0 {
            return Err(ConfigError::InvalidRootStack(
                "root_stack_capacity must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - X0GC_HEAP_WORDS
    /// - X0GC_ROOT_STACK
    /// - X0GC_VERBOSE
    /// - X0GC_JSON_LOG
    ///
    /// # Examples
    ///
    /// ```bash
    /// export X0GC_HEAP_WORDS=262144
    /// export X0GC_VERBOSE=1
    /// ```
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("X0GC_HEAP_WORDS") {
            if let Ok(words) = val.parse::<usize>() {
                config.heap_size_words = words;
            }
        }

        if let Ok(val) = std::env::var("X0GC_ROOT_STACK") {
            if let Ok(capacity) = val.parse::<usize>() {
                config.root_stack_capacity = capacity;
            }
        }

        if let Ok(val) = std::env::var("X0GC_VERBOSE") {
            config.verbose = is_truthy(&val);
        }

        if let Ok(val) = std::env::var("X0GC_JSON_LOG") {
            config.json_log = is_truthy(&val);
        }

        config
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid heap size: {0}")]
    InvalidHeapSize(String),

    #[error("Invalid root stack: {0}")]
    InvalidRootStack(String),
}

const DEFAULT_HEAP_WORDS: usize = 1024 * 1024;
const DEFAULT_ROOT_STACK: usize = 4096;

fn is_truthy(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}
