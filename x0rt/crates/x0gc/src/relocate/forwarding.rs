//! Relocation Table - Old Address to New Address During One Pass
//!
//! The table replaces in-place forwarding pointers: the vacated space is
//! never written while a pass runs. An entry is created the first time an
//! object is reached and every later reference to the same object resolves
//! to that entry, so each object is copied at most once per pass. That is
//! what keeps shared substructure shared and makes cycles terminate.
//!
//! Usage:
//! 1. Create an empty table at the start of a pass
//! 2. `lookup_or_insert` for every reference found
//! 3. Drop the table when the pass completes

use crate::error::Result;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Outcome of a table lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forwarded {
    /// First visit: the object was copied to this address
    Copied(usize),
    /// Already copied earlier in this pass
    Existing(usize),
}

impl Forwarded {
    /// New address of the object
    #[inline]
    pub fn address(self) -> usize {
        match self {
            Forwarded::Copied(addr) | Forwarded::Existing(addr) => addr,
        }
    }

    #[inline]
    pub fn is_copied(self) -> bool {
        matches!(self, Forwarded::Copied(_))
    }
}

/// RelocationTable - mapping old addresses to new addresses
///
/// Entries keep insertion order, which is the order objects were copied.
#[derive(Debug, Default)]
pub struct RelocationTable {
    entries: IndexMap<usize, usize>,
}

impl RelocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `old_address`, copying the object on first visit
    ///
    /// `copy` performs the physical copy and returns the new address. It
    /// runs at most once per `old_address`; the mapping is recorded as soon
    /// as it returns, before any of the copy's slots are followed.
    ///
    /// # Errors
    /// Propagates the error from `copy`; no entry is recorded in that case.
    pub fn lookup_or_insert<F>(&mut self, old_address: usize, copy: F) -> Result<Forwarded>
    where
        F: FnOnce() -> Result<usize>,
    {
        match self.entries.entry(old_address) {
            Entry::Occupied(entry) => Ok(Forwarded::Existing(*entry.get())),
            Entry::Vacant(entry) => {
                let new_address = copy()?;
                entry.insert(new_address);
                Ok(Forwarded::Copied(new_address))
            }
        }
    }

    /// Lookup forwarding for an old address
    pub fn lookup(&self, old_address: usize) -> Option<usize> {
        self.entries.get(&old_address).copied()
    }

    /// Get entry count
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All (old, new) pairs in copy order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(&old, &new)| (old, new))
    }

    /// Discard all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
