//! Heap Management Module - Semi-Space Arena
//!
//! The heap is one anonymous mapping split into two equal halves. At any
//! moment one half is active (readable, writable, receiving allocations)
//! and the other is protected (no access). A collection copies live
//! objects into the protected half and then swaps the roles.
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────┐
//! │        SpaceId::Low      │       SpaceId::High      │
//! │   space_words usable     │   space_words usable     │
//! │   (+ page padding)       │   (+ page padding)       │
//! └──────────────────────────┴──────────────────────────┘
//!  ^ mapping base             ^ base + space_bytes
//! ```
//!
//! Addresses are resolved to a [`Location`] (space + word offset) by range
//! check against each half, never by rounding.

pub mod page;
pub mod protection;

use crate::error::{GcError, Result};
use crate::object::WORD_SIZE;
use memmap2::{MmapMut, MmapOptions};
use protection::Access;
use std::fmt;

/// One of the two semi-spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceId {
    Low,
    High,
}

impl SpaceId {
    #[inline]
    pub fn other(self) -> Self {
        match self {
            SpaceId::Low => SpaceId::High,
            SpaceId::High => SpaceId::Low,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            SpaceId::Low => 0,
            SpaceId::High => 1,
        }
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceId::Low => write!(f, "low"),
            SpaceId::High => write!(f, "high"),
        }
    }
}

/// Word position inside a semi-space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub space: SpaceId,
    /// Offset in words from the start of the space
    pub offset: usize,
}

impl Location {
    pub fn new(space: SpaceId, offset: usize) -> Self {
        Self { space, offset }
    }

    /// Location `words` further into the same space
    #[inline]
    pub fn add(self, words: usize) -> Self {
        Self {
            space: self.space,
            offset: self.offset + words,
        }
    }
}

/// HeapArena - owner of both semi-spaces
///
/// Exclusively owns the mapping; dropping the arena unmaps both halves.
pub struct HeapArena {
    /// Backing anonymous mapping for both halves
    mapping: MmapMut,

    /// First word of the mapping
    base: *mut usize,

    /// Mapped bytes per half (page multiple)
    space_bytes: usize,

    /// Usable words per half
    space_words: usize,

    /// Half currently serving allocations
    active: SpaceId,

    /// Whether the inactive half is currently accessible
    inactive_open: bool,
}

// The raw base pointer aliases `mapping`, which the arena owns exclusively.
unsafe impl Send for HeapArena {}

impl HeapArena {
    /// Map both semi-spaces for a heap of `heap_size_words` total words
    ///
    /// Each half holds `heap_size_words / 2` usable words and is rounded up
    /// to whole pages. The high half is protected immediately.
    ///
    /// # Errors
    /// - `HeapInitialization` if the size is too small or overflows
    /// - `VirtualMemoryError` if the mapping fails
    /// - `ProtectionFailed` if the high half cannot be protected
    pub fn initialize(heap_size_words: usize) -> Result<Self> {
        let space_words = heap_size_words / 2;
        if space_words == 0 {
            return Err(GcError::HeapInitialization(format!(
                "heap of {} words cannot be split into two spaces",
                heap_size_words
            )));
        }

        let space_bytes = space_words
            .checked_mul(WORD_SIZE)
            .and_then(page::align_to_page)
            .ok_or_else(|| {
                GcError::HeapInitialization(format!(
                    "space of {} words overflows the address space",
                    space_words
                ))
            })?;
        let total_bytes = space_bytes.checked_mul(2).ok_or_else(|| {
            GcError::HeapInitialization("total heap size overflows".to_string())
        })?;

        let mut mapping = MmapOptions::new()
            .len(total_bytes)
            .map_anon()
            .map_err(|e| {
                GcError::VirtualMemoryError(format!(
                    "Failed to map {} bytes for heap: {}",
                    total_bytes, e
                ))
            })?;
        let base = mapping.as_mut_ptr().cast::<usize>();

        let mut arena = Self {
            mapping,
            base,
            space_bytes,
            space_words,
            active: SpaceId::Low,
            inactive_open: true,
        };
        arena.set_access(SpaceId::High, Access::None)?;
        arena.inactive_open = false;

        log::debug!(
            "heap mapped at {:#x}: 2 x {} bytes ({} usable words per space)",
            arena.base as usize,
            space_bytes,
            space_words
        );

        Ok(arena)
    }

    /// Half currently serving allocations
    #[inline]
    pub fn active(&self) -> SpaceId {
        self.active
    }

    /// Half holding stale copies from the previous pass
    #[inline]
    pub fn protected(&self) -> SpaceId {
        self.active.other()
    }

    /// Whether `space` is currently access-protected
    pub fn is_protected(&self, space: SpaceId) -> bool {
        space != self.active && !self.inactive_open
    }

    /// Whether `space` can be read and written right now
    #[inline]
    pub fn is_accessible(&self, space: SpaceId) -> bool {
        !self.is_protected(space)
    }

    /// Usable words per half
    #[inline]
    pub fn space_words(&self) -> usize {
        self.space_words
    }

    /// Mapped bytes for both halves
    pub fn mapped_bytes(&self) -> usize {
        self.mapping.len()
    }

    /// Address of the first word of `space`
    pub fn space_start(&self, space: SpaceId) -> usize {
        self.base as usize + space.index() * self.space_bytes
    }

    /// Resolve an address to the space and word offset it belongs to
    ///
    /// Returns `None` for addresses outside both usable ranges or not
    /// word-aligned.
    pub fn locate(&self, addr: usize) -> Option<Location> {
        [SpaceId::Low, SpaceId::High].into_iter().find_map(|space| {
            let delta = addr.checked_sub(self.space_start(space))?;
            if delta % WORD_SIZE != 0 {
                return None;
            }
            let offset = delta / WORD_SIZE;
            (offset < self.space_words).then_some(Location::new(space, offset))
        })
    }

    /// Space an address belongs to, if any
    pub fn space_of(&self, addr: usize) -> Option<SpaceId> {
        self.locate(addr).map(|loc| loc.space)
    }

    /// Address of a location
    #[inline]
    pub fn address_of(&self, loc: Location) -> usize {
        self.space_start(loc.space) + loc.offset * WORD_SIZE
    }

    /// Read one word
    pub fn read_word(&self, loc: Location) -> Result<usize> {
        self.check_range(loc, 1)?;
        // SAFETY: range checked and the space is accessible.
        Ok(unsafe { self.word_ptr(loc).read() })
    }

    /// Write one word
    pub fn write_word(&mut self, loc: Location, value: usize) -> Result<()> {
        self.check_range(loc, 1)?;
        // SAFETY: range checked and the space is accessible.
        unsafe { self.word_ptr(loc).write(value) };
        Ok(())
    }

    /// Zero `words` consecutive words
    pub fn zero_words(&mut self, loc: Location, words: usize) -> Result<()> {
        self.check_range(loc, words)?;
        // SAFETY: range checked and the space is accessible.
        unsafe { std::ptr::write_bytes(self.word_ptr(loc), 0, words) };
        Ok(())
    }

    /// Copy `words` words between the two halves
    pub fn copy_words(&mut self, from: Location, to: Location, words: usize) -> Result<()> {
        if from.space == to.space {
            return Err(GcError::Internal(format!(
                "copy within {} space is not a relocation",
                from.space
            )));
        }
        self.check_range(from, words)?;
        self.check_range(to, words)?;
        // SAFETY: both ranges checked, accessible, and in different halves.
        unsafe {
            std::ptr::copy_nonoverlapping(self.word_ptr(from), self.word_ptr(to), words);
        }
        Ok(())
    }

    /// Make the protected half writable for a collection pass
    pub fn open_inactive(&mut self) -> Result<()> {
        if !self.inactive_open {
            self.set_access(self.protected(), Access::ReadWrite)?;
            self.inactive_open = true;
        }
        Ok(())
    }

    /// Exchange active and protected halves
    ///
    /// The former protected half becomes active and writable; the former
    /// active half becomes protected and inaccessible.
    pub fn swap(&mut self) -> Result<()> {
        self.open_inactive()?;
        let vacated = self.active;
        self.active = vacated.other();
        self.set_access(vacated, Access::None)?;
        self.inactive_open = false;

        log::debug!("heap swap: {} space active, {} space protected", self.active, vacated);
        Ok(())
    }

    /// Release both halves
    pub fn teardown(self) {
        drop(self);
    }

    fn check_range(&self, loc: Location, words: usize) -> Result<()> {
        let end = loc.offset.checked_add(words);
        if end.is_none_or(|end| end > self.space_words) {
            return Err(GcError::InvalidReference {
                address: self.space_start(loc.space).wrapping_add(loc.offset.wrapping_mul(WORD_SIZE)),
            });
        }
        if self.is_protected(loc.space) {
            return Err(GcError::ProtectedAccess {
                address: self.address_of(loc),
            });
        }
        Ok(())
    }

    #[inline]
    fn word_ptr(&self, loc: Location) -> *mut usize {
        let space_offset = loc.space.index() * (self.space_bytes / WORD_SIZE);
        // SAFETY: callers checked `loc` against the usable range.
        unsafe { self.base.add(space_offset + loc.offset) }
    }

    fn set_access(&mut self, space: SpaceId, access: Access) -> Result<()> {
        let start = self.space_start(space) as *mut u8;
        // SAFETY: `start` is page-aligned (mapping base plus a page multiple)
        // and the half lies entirely inside `mapping`.
        unsafe { protection::protect(start, self.space_bytes, access) }
    }
}

impl Drop for HeapArena {
    fn drop(&mut self) {
        log::debug!(
            "releasing heap mapping at {:#x} ({} bytes)",
            self.base as usize,
            self.mapping.len()
        );
    }
}

impl fmt::Debug for HeapArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapArena")
            .field("base", &format_args!("{:#x}", self.base as usize))
            .field("space_words", &self.space_words)
            .field("active", &self.active)
            .field("inactive_open", &self.inactive_open)
            .finish()
    }
}
