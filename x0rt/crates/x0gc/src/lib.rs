//! # X0GC - Semi-Space Copying Collector for the X0 Runtime
//!
//! X0GC manages the heap of programs compiled from the X0 language. Generated
//! code allocates tagged objects, declares live references on an explicit
//! root stack, and asks for collections at safe points.
//!
//! ## Overview
//!
//! - **Two semi-spaces** in one anonymous mapping; only the active half is
//!   accessible, the other is page-protected so stale references fault
//! - **Bump allocation** in words; a miss triggers one collection
//! - **Cheney copying** of everything reachable from the live roots
//! - **Relocation table** (old address to new address) instead of in-place
//!   forwarding pointers, so the vacated half is never written
//! - **Precise roots**: only the root stack is scanned
//!
//! ## Quick Start
//!
//! ```rust
//! use x0gc::{GarbageCollector, GcConfig};
//!
//! fn main() -> Result<(), x0gc::GcError> {
//!     let mut gc = GarbageCollector::new(GcConfig::with_sizes(4096, 64))?;
//!
//!     let n = gc.alloc_int(5)?;
//!     let v = gc.alloc_vector(&[Some(n), None])?;
//!     gc.root_push(v)?;
//!
//!     gc.collect(1)?;
//!
//!     // `v` is stale now; re-read the moved root.
//!     let v = gc.root_pop()?;
//!     let n = gc.vector_get(v, 0)?.expect("slot 0 holds n");
//!     assert_eq!(gc.int_value(n)?, 5);
//!     Ok(())
//! }
//! ```
//!
//! ## Object Layout
//!
//! ```text
//! Int    [0, value]
//! Bool   [1, 0 | 1]
//! Vector [2, len, slot_0, ..., slot_len-1]    slot = address or 0 (null)
//! ```
//!
//! ## Safety
//!
//! References are plain addresses. After any collection, every reference
//! not re-read from the root stack points into the protected half and is
//! rejected with [`GcError::ProtectedAccess`].
//!
//! ### Thread Safety
//!
//! A `GarbageCollector` is `Send` but not `Sync`; the C runtime keeps it
//! behind a process-wide mutex.

// Core GC modules
pub mod gc;
pub mod config;
pub mod error;
pub mod logging;

// Memory management subsystems
pub mod allocator;
pub mod heap;
pub mod object;
pub mod roots;

// GC algorithm components
pub mod relocate;

// Monitoring
pub mod stats;

// Re-export main types for convenience
pub use config::GcConfig;
pub use error::{GcError, Result};
pub use gc::{CycleStats, GarbageCollector, GcReason, GcState};
pub use heap::SpaceId;
pub use object::{HeapValue, ObjRef, Tag, WORD_SIZE};

/// X0GC version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create a collector configured from the environment
///
/// See [`GcConfig::from_env`] for the variables read.
///
/// # Examples
///
/// ```rust
/// let gc = x0gc::init()?;
/// assert_eq!(gc.cycle_count(), 0);
/// gc.shutdown();
/// # Ok::<(), x0gc::GcError>(())
/// ```
pub fn init() -> Result<GarbageCollector> {
    GarbageCollector::new(GcConfig::from_env())
}

/// Create a collector with explicit configuration
///
/// # Examples
///
/// ```rust
/// use x0gc::GcConfig;
///
/// let config = GcConfig {
///     heap_size_words: 64 * 1024,
///     root_stack_capacity: 256,
///     ..Default::default()
/// };
///
/// let gc = x0gc::init_with_config(config)?;
/// # Ok::<(), x0gc::GcError>(())
/// ```
pub fn init_with_config(config: GcConfig) -> Result<GarbageCollector> {
    GarbageCollector::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_config() {
        let gc = init_with_config(GcConfig::with_sizes(1024, 8));
        assert!(gc.is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = GcConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_version_not_empty() {
        assert!(!VERSION.is_empty());
    }
}
