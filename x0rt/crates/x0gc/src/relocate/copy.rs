//! Object Copying - Shallow Copy Into the Destination Space
//!
//! Copy Strategy:
//! 1. Decode the header in the source space
//! 2. Reserve space at the destination cursor
//! 3. Copy tag, length and payload words verbatim
//!
//! Vector slots are copied as-is (still pointing into the source space);
//! the scan that follows rewrites them.

use crate::allocator::BumpAllocator;
use crate::error::{GcError, Result};
use crate::heap::{HeapArena, Location, SpaceId};
use crate::object::ObjectHeader;

/// ObjectCopier - copier for object relocation
#[derive(Debug, Default)]
pub struct ObjectCopier {
    /// Words copied
    words_copied: usize,
    /// Objects copied
    objects_copied: usize,
}

impl ObjectCopier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the object at `source` to the next free words of `destination`
    ///
    /// # Returns
    /// Location of the copy
    ///
    /// # Errors
    /// - `CorruptObject` if the source header is invalid
    /// - `Internal` if the destination space cannot hold the copy, which
    ///   cannot happen while live data fits in the source space
    pub fn copy_object(
        &mut self,
        arena: &mut HeapArena,
        cursor: &mut BumpAllocator,
        destination: SpaceId,
        source: Location,
    ) -> Result<Location> {
        let header = ObjectHeader::read(arena, source)?;
        let size = header.size_words().ok_or_else(|| GcError::CorruptObject {
            address: arena.address_of(source),
            reason: "size overflow".to_string(),
        })?;

        let offset = cursor.allocate(size).map_err(|e| {
            GcError::Internal(format!(
                "destination space exhausted copying {:#x}: {}",
                arena.address_of(source),
                e
            ))
        })?;
        let target = Location::new(destination, offset);
        arena.copy_words(source, target, size)?;

        self.words_copied += size;
        self.objects_copied += 1;

        log::trace!(
            "copied {} ({} words) {:#x} -> {:#x}",
            header.tag,
            size,
            arena.address_of(source),
            arena.address_of(target)
        );

        Ok(target)
    }

    /// Get words copied
    pub fn words_copied(&self) -> usize {
        self.words_copied
    }

    /// Get objects copied
    pub fn objects_copied(&self) -> usize {
        self.objects_copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Tag;

    #[test]
    fn test_copy_scalar_verbatim() {
        let mut arena = HeapArena::initialize(64).unwrap();
        let src = Location::new(SpaceId::Low, 3);
        arena.write_word(src, Tag::Int.as_word()).unwrap();
        arena.write_word(src.add(1), 5).unwrap();
        arena.open_inactive().unwrap();

        let mut cursor = BumpAllocator::new(arena.space_words());
        let mut copier = ObjectCopier::new();
        let dst = copier
            .copy_object(&mut arena, &mut cursor, SpaceId::High, src)
            .unwrap();

        assert_eq!(dst, Location::new(SpaceId::High, 0));
        assert_eq!(arena.read_word(dst).unwrap(), Tag::Int.as_word());
        assert_eq!(arena.read_word(dst.add(1)).unwrap(), 5);
        assert_eq!(copier.words_copied(), 2);
        assert_eq!(copier.objects_copied(), 1);
        assert_eq!(cursor.top(), 2);
    }

    #[test]
    fn test_copy_vector_keeps_old_slots() {
        let mut arena = HeapArena::initialize(64).unwrap();
        let src = Location::new(SpaceId::Low, 0);
        arena.write_word(src, Tag::Vector.as_word()).unwrap();
        arena.write_word(src.add(1), 2).unwrap();
        arena.write_word(src.add(2), 0x1111).unwrap();
        arena.write_word(src.add(3), 0).unwrap();
        arena.open_inactive().unwrap();

        let mut cursor = BumpAllocator::new(arena.space_words());
        let mut copier = ObjectCopier::new();
        let dst = copier
            .copy_object(&mut arena, &mut cursor, SpaceId::High, src)
            .unwrap();

        assert_eq!(arena.read_word(dst.add(2)).unwrap(), 0x1111);
        assert_eq!(cursor.top(), 4);
    }

    #[test]
    fn test_copy_rejects_bad_tag() {
        let mut arena = HeapArena::initialize(64).unwrap();
        let src = Location::new(SpaceId::Low, 0);
        arena.write_word(src, 42).unwrap();
        arena.open_inactive().unwrap();

        let mut cursor = BumpAllocator::new(arena.space_words());
        let result =
            ObjectCopier::new().copy_object(&mut arena, &mut cursor, SpaceId::High, src);
        assert!(matches!(result, Err(GcError::CorruptObject { .. })));
        assert_eq!(cursor.top(), 0);
    }
}
