//! Root Stack - References the Mutator Declares Live
//!
//! Roots are the only starting points of a collection pass. Generated code
//! pushes every reference that must survive an operation that may allocate,
//! and pops it (re-reading the possibly relocated address) afterwards.
//!
//! # Invariants
//!
//! - Capacity is fixed at construction; storage is reserved up front.
//! - A failed push or pop leaves the stack untouched.
//! - `top_index()` entries, counted from the bottom, are live.

use crate::error::{GcError, Result};
use crate::object::ObjRef;

/// RootStack - bounded stack of live references
#[derive(Debug)]
pub struct RootStack {
    slots: Vec<ObjRef>,
    capacity: usize,
}

impl RootStack {
    /// Create a root stack holding at most `capacity` references
    ///
    /// # Errors
    /// `RootStackAllocation` if the storage cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| GcError::RootStackAllocation { capacity })?;

        Ok(Self { slots, capacity })
    }

    /// Push a reference
    ///
    /// # Errors
    /// `RootStackOverflow` when full; nothing is pushed.
    pub fn push(&mut self, reference: ObjRef) -> Result<()> {
        if self.slots.len() >= self.capacity {
            log::warn!("root stack overflow at capacity {}", self.capacity);
            return Err(GcError::RootStackOverflow {
                capacity: self.capacity,
            });
        }
        self.slots.push(reference);
        Ok(())
    }

    /// Pop the most recently pushed reference
    ///
    /// # Errors
    /// `RootStackEmpty` when there is nothing to pop.
    pub fn pop(&mut self) -> Result<ObjRef> {
        self.slots.pop().ok_or(GcError::RootStackEmpty)
    }

    /// Top reference without popping it
    pub fn peek(&self) -> Option<ObjRef> {
        self.slots.last().copied()
    }

    /// Number of live entries
    #[inline]
    pub fn top_index(&self) -> usize {
        self.slots.len()
    }

    /// Entry at `index` counted from the bottom
    pub fn get(&self, index: usize) -> Option<ObjRef> {
        self.slots.get(index).copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_slice(&self) -> &[ObjRef] {
        &self.slots
    }

    /// Entries `0..count` for in-place rewriting during a pass
    pub(crate) fn live_mut(&mut self, count: usize) -> &mut [ObjRef] {
        &mut self.slots[..count]
    }

    /// Drop entries above `len`
    pub(crate) fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }
}
