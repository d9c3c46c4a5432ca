//! Relocate Module - Copying Live Objects Between Semi-Spaces
//!
//! One pass moves everything reachable from the roots out of the active
//! space into the (freshly opened) protected space:
//!
//! 1. Relocate each live root in place
//! 2. Cheney scan: walk the copies in destination order and relocate
//!    every vector slot
//! 3. Drop the relocation table
//!
//! `relocate(word)`:
//! - null stays null
//! - an allocated address in the source space goes through the
//!   [`RelocationTable`], which copies it on first visit and returns the
//!   recorded copy after
//! - an address in the destination space is a protected access
//! - anything else is an invalid reference
//!
//! Every root and every copied slot is rewritten exactly once, so the
//! words fed to `relocate` are always pre-pass values. The destination
//! space was protected before the pass; a reference into it is stale from
//! an earlier pass, even when a fresh copy now sits at the same address.
//!
//! The scan is iterative, so deep or cyclic structures need no recursion.

pub mod copy;
pub mod forwarding;

pub use copy::ObjectCopier;
pub use forwarding::{Forwarded, RelocationTable};

use crate::allocator::BumpAllocator;
use crate::error::{GcError, Result};
use crate::heap::{HeapArena, Location, SpaceId};
use crate::object::{ObjRef, ObjectHeader, HEADER_WORDS, NULL_WORD};

/// Summary of a completed relocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelocationSummary {
    /// Objects copied into the destination space
    pub objects_copied: usize,
    /// Words in use in the destination space after the pass
    pub words_copied: usize,
    /// Entries the relocation table held before it was dropped
    pub table_entries: usize,
}

/// Relocator - one copying pass from the active space to the other half
pub struct Relocator<'a> {
    arena: &'a mut HeapArena,
    table: RelocationTable,
    copier: ObjectCopier,
    cursor: BumpAllocator,
    source_top: usize,
    from_space: SpaceId,
    to_space: SpaceId,
}

impl<'a> Relocator<'a> {
    /// Start a pass copying out of the arena's active space
    ///
    /// `source_top` is the allocation cursor of the active space; words at
    /// or above it hold no live objects.
    ///
    /// # Errors
    /// `Internal` if the destination half has not been opened.
    pub fn new(arena: &'a mut HeapArena, source_top: usize) -> Result<Self> {
        let from_space = arena.active();
        let to_space = arena.protected();
        if !arena.is_accessible(to_space) {
            return Err(GcError::Internal(format!(
                "{} space must be opened before relocation",
                to_space
            )));
        }
        let cursor = BumpAllocator::new(arena.space_words());

        Ok(Self {
            arena,
            table: RelocationTable::new(),
            copier: ObjectCopier::new(),
            cursor,
            source_top,
            from_space,
            to_space,
        })
    }

    /// Space objects are copied out of
    pub fn from_space(&self) -> SpaceId {
        self.from_space
    }

    /// Space objects are copied into
    pub fn to_space(&self) -> SpaceId {
        self.to_space
    }

    /// Relocate one reference word and return its new value
    pub fn relocate(&mut self, word: usize) -> Result<usize> {
        if word == NULL_WORD {
            return Ok(NULL_WORD);
        }

        let source = self
            .arena
            .locate(word)
            .ok_or(GcError::InvalidReference { address: word })?;
        if source.space == self.to_space {
            return Err(GcError::ProtectedAccess { address: word });
        }
        if source.offset >= self.source_top {
            return Err(GcError::InvalidReference { address: word });
        }

        let to_space = self.to_space;
        let Self {
            arena,
            table,
            copier,
            cursor,
            ..
        } = self;

        let forwarded = table.lookup_or_insert(word, || {
            let target = copier.copy_object(arena, cursor, to_space, source)?;
            Ok(arena.address_of(target))
        })?;

        Ok(forwarded.address())
    }

    /// Relocate every root in place
    pub fn relocate_roots(&mut self, roots: &mut [ObjRef]) -> Result<()> {
        for root in roots.iter_mut() {
            let new_address = self.relocate(root.addr())?;
            *root = ObjRef::from_addr(new_address).ok_or_else(|| {
                GcError::Internal(format!("root {:?} relocated to null", root))
            })?;
        }
        Ok(())
    }

    /// Cheney scan over the destination space
    ///
    /// Walks copies in the order they were made; each vector slot is
    /// relocated, which may append more copies behind the scan pointer.
    pub fn scan(&mut self) -> Result<()> {
        let mut scan = 0;

        while scan < self.cursor.top() {
            let loc = Location::new(self.to_space, scan);
            let header = ObjectHeader::read(self.arena, loc)?;

            for index in 0..header.slot_count() {
                let slot = loc.add(HEADER_WORDS + index);
                let old = self.arena.read_word(slot)?;
                let new = self.relocate(old)?;
                if new != old {
                    self.arena.write_word(slot, new)?;
                }
            }

            // Valid headers always have a size.
            scan += header.size_words().unwrap_or(HEADER_WORDS);
        }

        Ok(())
    }

    /// Finish the pass, discarding the relocation table
    pub fn finish(self) -> RelocationSummary {
        RelocationSummary {
            objects_copied: self.copier.objects_copied(),
            words_copied: self.cursor.top(),
            table_entries: self.table.entry_count(),
        }
    }
}
