//! Error Module - X0GC Error Types
//!
//! Defines all error types used by the collector.
//!
//! # Error Categories
//!
//! ## Capacity Errors (recoverable)
//! - `OutOfMemory` - Active space exhausted even after a collection
//! - `RootStackOverflow` - Root stack is at capacity
//! - `RootStackEmpty` - Pop on an empty root stack
//!
//! ## Caller Errors
//! - `InvalidSize` - Allocation request of zero words
//! - `InvalidArgument` - Argument fails validation
//! - `InvalidReference` - Address outside both spaces
//!
//! ## Invariant Violations (fatal)
//! - `ProtectedAccess` - Access into the protected space
//! - `CorruptObject` - Unknown tag or malformed vector
//! - `HeapInitialization` / `VirtualMemoryError` - Mapping failure
//! - `ProtectionFailed` - Page protection toggle failed
//! - `RootStackAllocation` - Root stack storage could not be reserved
//! - `Poisoned` - A previous pass failed part-way

use thiserror::Error;

/// Main error type for all collector operations
///
/// # Examples
///
/// ```rust
/// use x0gc::GcError;
///
/// fn handle_error(err: GcError) {
///     match err {
///         GcError::OutOfMemory { requested, available } => {
///             eprintln!("OOM: requested {} words, available {}", requested, available);
///         }
///         err if err.is_fatal() => std::process::exit(err.exit_code()),
///         _ => eprintln!("Other error: {}", err),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum GcError {
    /// Active space exhausted after the implicit collection attempt
    ///
    /// **Recovery strategy:** Caller decides; the runtime cannot grow the heap
    #[error("Out of memory: requested {requested} words, available {available} words")]
    OutOfMemory { requested: usize, available: usize },

    /// Allocation size is not a valid object size
    #[error("Invalid allocation size: {words} words")]
    InvalidSize { words: usize },

    /// Root stack is full, nothing was pushed
    #[error("Root stack overflow: capacity {capacity}")]
    RootStackOverflow { capacity: usize },

    /// Root stack is empty, nothing was popped
    #[error("Root stack is empty")]
    RootStackEmpty,

    /// Root stack storage could not be reserved
    #[error("Unable to allocate root stack of {capacity} entries")]
    RootStackAllocation { capacity: usize },

    /// Function argument fails validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Address does not belong to either semi-space
    #[error("Invalid reference: {address:#x}")]
    InvalidReference { address: usize },

    /// Read or write aimed at the protected space
    ///
    /// **Recovery strategy:** None - the mutator holds a stale reference
    #[error("Access to protected space at {address:#x}")]
    ProtectedAccess { address: usize },

    /// Object header is not a valid record
    #[error("Corrupt object at {address:#x}: {reason}")]
    CorruptObject { address: usize, reason: String },

    /// Heap initialization failed
    #[error("Heap initialization failed: {0}")]
    HeapInitialization(String),

    /// OS virtual memory call failed
    #[error("Virtual memory error: {0}")]
    VirtualMemoryError(String),

    /// Page protection could not be changed
    #[error("Page protection change failed: {0}")]
    ProtectionFailed(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A previous collection failed part-way; the heap is unusable
    #[error("Collector is poisoned by an earlier failed collection")]
    Poisoned,

    /// Internal error - indicates a bug in the collector
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GcError {
    /// Check if this error is a capacity signal the caller may survive
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GcError::OutOfMemory { .. } | GcError::RootStackOverflow { .. } | GcError::RootStackEmpty
        )
    }

    /// Check if this error means the process must not continue
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GcError::ProtectedAccess { .. }
                | GcError::CorruptObject { .. }
                | GcError::HeapInitialization(_)
                | GcError::VirtualMemoryError(_)
                | GcError::ProtectionFailed(_)
                | GcError::RootStackAllocation { .. }
                | GcError::Poisoned
                | GcError::Internal(_)
        )
    }

    /// Process exit status used when this error terminates the runtime
    ///
    /// Every fatal cause maps to its own sentinel. Non-fatal errors map to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            GcError::HeapInitialization(_) | GcError::VirtualMemoryError(_) => -1,
            GcError::ProtectionFailed(_) => -2,
            GcError::ProtectedAccess { .. } | GcError::CorruptObject { .. } => -3,
            GcError::RootStackAllocation { .. } => -4,
            GcError::Poisoned | GcError::Internal(_) => -5,
            GcError::Configuration(_) => -6,
            _ => 1,
        }
    }
}

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, GcError>;
