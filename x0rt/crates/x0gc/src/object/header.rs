//! Object Header - Tag and length words of a heap record
//!
//! Object Layout (one machine word per cell):
//! ┌─────────────────────────────────────────┐
//! │  word 0: tag (0 Int, 1 Bool, 2 Vector)  │
//! ├─────────────────────────────────────────┤
//! │  word 1: value (Int/Bool)               │
//! │          slot count (Vector)            │
//! ├─────────────────────────────────────────┤
//! │  words 2..2+len: slots (Vector only)    │
//! └─────────────────────────────────────────┘

use crate::error::{GcError, Result};
use crate::heap::{HeapArena, Location};
use std::fmt;

/// Number of words before the first vector slot
pub const HEADER_WORDS: usize = 2;

/// Size of an Int or Bool record in words
pub const SCALAR_WORDS: usize = HEADER_WORDS;

/// Object tag stored in word 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Tag {
    Int = 0,
    Bool = 1,
    Vector = 2,
}

impl Tag {
    /// Decode a tag word, `None` for anything outside the three tags
    pub fn from_word(word: usize) -> Option<Self> {
        match word {
            0 => Some(Tag::Int),
            1 => Some(Tag::Bool),
            2 => Some(Tag::Vector),
            _ => None,
        }
    }

    #[inline]
    pub fn as_word(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_scalar(self) -> bool {
        !matches!(self, Tag::Vector)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Int => write!(f, "Int"),
            Tag::Bool => write!(f, "Bool"),
            Tag::Vector => write!(f, "Vector"),
        }
    }
}

/// Decoded first two words of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    pub tag: Tag,
    /// Value for scalars, slot count for vectors
    pub word1: usize,
}

impl ObjectHeader {
    /// Decode header words, `None` if the tag is unknown
    pub fn decode(tag_word: usize, word1: usize) -> Option<Self> {
        Tag::from_word(tag_word).map(|tag| Self { tag, word1 })
    }

    /// Read and decode the header at `loc`
    ///
    /// # Errors
    /// `CorruptObject` for an unknown tag or a record that would run past
    /// the end of its space; arena access errors otherwise.
    pub fn read(arena: &HeapArena, loc: Location) -> Result<Self> {
        let address = arena.address_of(loc);
        let tag_word = arena.read_word(loc)?;
        let word1 = arena.read_word(loc.add(1))?;

        let header = Self::decode(tag_word, word1).ok_or_else(|| GcError::CorruptObject {
            address,
            reason: format!("unknown tag {}", tag_word),
        })?;

        let fits = header
            .size_words()
            .and_then(|size| loc.offset.checked_add(size))
            .is_some_and(|end| end <= arena.space_words());
        if !fits {
            return Err(GcError::CorruptObject {
                address,
                reason: format!("{} of length {} overruns its space", header.tag, word1),
            });
        }

        Ok(header)
    }

    /// Total record size in words including the header
    ///
    /// Returns `None` when a vector length would overflow.
    pub fn size_words(&self) -> Option<usize> {
        match self.tag {
            Tag::Int | Tag::Bool => Some(SCALAR_WORDS),
            Tag::Vector => self.word1.checked_add(HEADER_WORDS),
        }
    }

    /// Number of reference slots following the header
    pub fn slot_count(&self) -> usize {
        match self.tag {
            Tag::Vector => self.word1,
            Tag::Int | Tag::Bool => 0,
        }
    }
}

/// Words needed for a vector of `len` slots
#[inline]
pub fn vector_words(len: usize) -> usize {
    HEADER_WORDS + len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_encoding_is_fixed() {
        assert_eq!(Tag::Int.as_word(), 0);
        assert_eq!(Tag::Bool.as_word(), 1);
        assert_eq!(Tag::Vector.as_word(), 2);
        assert_eq!(Tag::from_word(2), Some(Tag::Vector));
        assert_eq!(Tag::from_word(3), None);
    }

    #[test]
    fn test_header_sizes() {
        let int = ObjectHeader::decode(0, 5).unwrap();
        assert_eq!(int.size_words(), Some(2));
        assert_eq!(int.slot_count(), 0);

        let vec = ObjectHeader::decode(2, 3).unwrap();
        assert_eq!(vec.size_words(), Some(5));
        assert_eq!(vec.slot_count(), 3);

        let huge = ObjectHeader::decode(2, usize::MAX).unwrap();
        assert_eq!(huge.size_words(), None);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(ObjectHeader::decode(7, 0).is_none());
    }

    #[test]
    fn test_read_validates_record() {
        use crate::heap::SpaceId;

        let mut arena = HeapArena::initialize(32).unwrap();
        let at = |offset| Location::new(SpaceId::Low, offset);

        arena.write_word(at(0), Tag::Bool.as_word()).unwrap();
        arena.write_word(at(1), 1).unwrap();
        let header = ObjectHeader::read(&arena, at(0)).unwrap();
        assert_eq!(header.tag, Tag::Bool);

        arena.write_word(at(2), 9).unwrap();
        assert!(matches!(
            ObjectHeader::read(&arena, at(2)),
            Err(GcError::CorruptObject { .. })
        ));

        // 16 usable words; a vector of 15 slots at offset 4 cannot fit.
        arena.write_word(at(4), Tag::Vector.as_word()).unwrap();
        arena.write_word(at(5), 15).unwrap();
        assert!(matches!(
            ObjectHeader::read(&arena, at(4)),
            Err(GcError::CorruptObject { .. })
        ));
    }
}
