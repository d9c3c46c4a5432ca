//! Allocator Submodule - Bump Pointer Allocation
//!
//! Bump pointer allocation over a semi-space, measured in words.
//! Allocation only advances a cursor; space is never reused until the
//! next collection resets the cursor.

use crate::error::{GcError, Result};

/// BumpAllocator - word cursor over one semi-space
#[derive(Debug, Clone)]
pub struct BumpAllocator {
    top: usize,
    end: usize,
}

impl BumpAllocator {
    /// Create an empty allocator over `capacity` words
    pub fn new(capacity: usize) -> Self {
        Self {
            top: 0,
            end: capacity,
        }
    }

    /// Reserve `words` words and return the offset of the first one
    ///
    /// # Errors
    /// `OutOfMemory` if the request does not fit; the cursor is unchanged.
    pub fn allocate(&mut self, words: usize) -> Result<usize> {
        let new_top = self.new_top(words)?;
        let offset = self.top;
        self.top = new_top;
        Ok(offset)
    }

    /// Whether `words` more words fit without collecting
    #[inline]
    pub fn fits(&self, words: usize) -> bool {
        self.top
            .checked_add(words)
            .is_some_and(|new_top| new_top <= self.end)
    }

    fn new_top(&self, words: usize) -> Result<usize> {
        let new_top = self.top.checked_add(words).ok_or(GcError::OutOfMemory {
            requested: words,
            available: self.remaining(),
        })?;

        if new_top > self.end {
            return Err(GcError::OutOfMemory {
                requested: words,
                available: self.remaining(),
            });
        }

        Ok(new_top)
    }

    /// Move the cursor back to the start
    pub fn reset(&mut self) {
        self.top = 0;
    }

    /// Continue allocating after `top` words already in use
    pub fn reset_to(&mut self, top: usize) {
        self.top = top.min(self.end);
    }

    /// Current cursor (words in use)
    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    pub fn remaining(&self) -> usize {
        self.end - self.top
    }

    pub fn capacity(&self) -> usize {
        self.end
    }

    pub fn allocated(&self) -> usize {
        self.top
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_allocator_new() {
        let allocator = BumpAllocator::new(128);
        assert_eq!(allocator.capacity(), 128);
        assert_eq!(allocator.allocated(), 0);
        assert_eq!(allocator.remaining(), 128);
    }

    #[test]
    fn test_bump_allocator_allocate_multiple() {
        let mut allocator = BumpAllocator::new(128);
        let a = allocator.allocate(2).unwrap();
        let b = allocator.allocate(5).unwrap();
        let c = allocator.allocate(3).unwrap();

        assert_eq!((a, b, c), (0, 2, 7));
        assert_eq!(allocator.allocated(), 10);
    }

    #[test]
    fn test_bump_allocator_exact_fill() {
        let mut allocator = BumpAllocator::new(8);
        allocator.allocate(8).unwrap();
        assert!(allocator.is_full());
        assert!(!allocator.fits(1));
        assert!(allocator.fits(0));
    }

    #[test]
    fn test_bump_allocator_oom_leaves_cursor() {
        let mut allocator = BumpAllocator::new(8);
        allocator.allocate(6).unwrap();

        let err = allocator.allocate(3).unwrap_err();
        assert!(matches!(
            err,
            GcError::OutOfMemory {
                requested: 3,
                available: 2
            }
        ));
        assert_eq!(allocator.top(), 6);

        assert!(allocator.allocate(usize::MAX).is_err());
        assert_eq!(allocator.top(), 6);
    }

    #[test]
    fn test_bump_allocator_reset() {
        let mut allocator = BumpAllocator::new(16);
        allocator.allocate(10).unwrap();
        allocator.reset_to(4);
        assert_eq!(allocator.allocate(1).unwrap(), 4);

        allocator.reset();
        assert_eq!(allocator.allocated(), 0);

        allocator.reset_to(100);
        assert!(allocator.is_full());
    }
}
