//! Allocator Module - Bump Allocation in the Active Space
//!
//! Objects are handed out by advancing a word cursor through the active
//! semi-space. When a request does not fit, the collector runs once and
//! the request is retried; see [`GarbageCollector::allocate`].
//!
//! Sizes at the C boundary are bytes and are rounded up to whole words.
//!
//! [`GarbageCollector::allocate`]: crate::GarbageCollector::allocate

pub mod bump;

pub use bump::BumpAllocator;

use crate::error::{GcError, Result};
use crate::object::WORD_SIZE;

/// Convert a byte count from generated code to a word count
///
/// Negative and zero sizes are rejected.
///
/// # Examples
/// ```
/// use x0gc::allocator::words_for_bytes;
///
/// assert_eq!(words_for_bytes(16).unwrap(), 2);
/// assert_eq!(words_for_bytes(17).unwrap(), 3);
/// assert!(words_for_bytes(-8).is_err());
/// ```
pub fn words_for_bytes(bytes: i64) -> Result<usize> {
    let bytes = usize::try_from(bytes).map_err(|_| GcError::InvalidSize { words: 0 })?;
    if bytes == 0 {
        return Err(GcError::InvalidSize { words: 0 });
    }
    Ok(bytes.div_ceil(WORD_SIZE))
}
