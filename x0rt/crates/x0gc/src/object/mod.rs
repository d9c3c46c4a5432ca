//! Object Module - heap object model
//!
//! Objects are word sequences tagged Int, Bool or Vector. A reference to an
//! object is its address, wrapped in [`ObjRef`] so it cannot be null.

pub mod header;

pub use header::{vector_words, ObjectHeader, Tag, HEADER_WORDS, SCALAR_WORDS};

use std::fmt;
use std::num::NonZeroUsize;

/// Size of one heap word in bytes (native pointer width)
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();

/// Word stored in a vector slot that holds no reference
pub const NULL_WORD: usize = 0;

/// Opaque handle to a heap object
///
/// The numeric value is the object's current address. It is only valid
/// until the next collection; anything that must survive a collection has
/// to be on the root stack and re-read from it afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ObjRef(NonZeroUsize);

impl ObjRef {
    /// Wrap an address, `None` for null
    #[inline]
    pub fn from_addr(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(ObjRef)
    }

    #[inline]
    pub fn addr(self) -> usize {
        self.0.get()
    }

    /// Word written into a vector slot for an optional reference
    #[inline]
    pub fn to_slot(reference: Option<ObjRef>) -> usize {
        reference.map_or(NULL_WORD, ObjRef::addr)
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjRef({:#x})", self.addr())
    }
}

/// Owned, structural view of one object
///
/// Used by callers that want to inspect a record without touching raw words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapValue {
    Int(i64),
    Bool(bool),
    Vector(Vec<Option<ObjRef>>),
}

impl HeapValue {
    pub fn tag(&self) -> Tag {
        match self {
            HeapValue::Int(_) => Tag::Int,
            HeapValue::Bool(_) => Tag::Bool,
            HeapValue::Vector(_) => Tag::Vector,
        }
    }
}
