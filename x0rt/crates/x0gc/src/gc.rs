//! GC Core Module - Runtime Context and Collection Cycle
//!
//! [`GarbageCollector`] owns everything the runtime needs: the semi-space
//! arena, the allocation cursor, the root stack, statistics and the event
//! logger. All mutator operations go through it.
//!
//! A collection is stop-the-world and single-threaded:
//!
//! 1. Open the protected half
//! 2. Relocate roots `0..live_root_count` in place
//! 3. Cheney scan of the copies
//! 4. Swap halves and re-protect the vacated one
//! 5. Resume allocation right after the last copy
//!
//! Any failure inside a pass poisons the collector; every later call
//! returns [`GcError::Poisoned`].

use crate::allocator::BumpAllocator;
use crate::config::GcConfig;
use crate::error::{GcError, Result};
use crate::heap::{HeapArena, Location};
use crate::logging::{GcEvent, GcLogger, GcLoggerConfig};
use crate::object::{
    vector_words, HeapValue, ObjRef, ObjectHeader, Tag, HEADER_WORDS, SCALAR_WORDS,
};
use crate::relocate::{RelocationSummary, Relocator};
use crate::roots::RootStack;
use crate::stats::{GcStats, GcTimer};
use std::fmt;
use std::time::Duration;

/// GC cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcState {
    /// No pass in progress
    Idle,
    /// A pass is running
    Collecting,
    /// A pass failed part-way; the heap must not be used again
    Poisoned,
}

/// Reason for GC trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcReason {
    /// Explicit request from generated code
    Explicit,
    /// An allocation did not fit in the active space
    AllocationFailure { requested: usize, available: usize },
}

impl fmt::Display for GcReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcReason::Explicit => write!(f, "explicit"),
            GcReason::AllocationFailure {
                requested,
                available,
            } => write!(
                f,
                "allocation of {} words ({} available)",
                requested, available
            ),
        }
    }
}

/// Result of one completed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// 1-based cycle number
    pub cycle: u64,
    pub reason: GcReason,
    /// Roots treated as live
    pub live_roots: usize,
    pub objects_copied: usize,
    /// Active-space words in use before the pass
    pub words_before: usize,
    /// Active-space words in use after the pass
    pub words_after: usize,
    pub duration: Duration,
}

impl CycleStats {
    pub fn words_reclaimed(&self) -> usize {
        self.words_before.saturating_sub(self.words_after)
    }
}

/// GarbageCollector - the runtime context
///
/// ## Thread Safety
///
/// Not shareable; callers that need a process-wide instance wrap it in a
/// lock. Every reference handed out is only valid until the next
/// collection; keep it on the root stack to have it updated.
pub struct GarbageCollector {
    /// Both semi-spaces
    arena: HeapArena,

    /// Cursor over the active space
    allocator: BumpAllocator,

    /// Live references declared by the mutator
    roots: RootStack,

    /// GC configuration
    config: GcConfig,

    /// Statistics collector
    stats: GcStats,

    /// Event sink
    logger: GcLogger,

    /// Current GC state
    state: GcState,

    /// Completed passes
    cycle_count: u64,
}

impl GarbageCollector {
    /// Create a collector: map the heap and reserve the root stack
    ///
    /// # Errors
    /// - `Configuration` if `config` fails validation
    /// - `HeapInitialization` / `VirtualMemoryError` / `ProtectionFailed`
    ///   if the heap cannot be mapped and protected
    /// - `RootStackAllocation` if the root stack cannot be reserved
    ///
    /// # Examples
    /// ```rust
    /// use x0gc::{GarbageCollector, GcConfig};
    ///
    /// let mut gc = GarbageCollector::new(GcConfig::with_sizes(1024, 16))?;
    /// let n = gc.alloc_int(5)?;
    /// assert_eq!(gc.int_value(n)?, 5);
    /// # Ok::<(), x0gc::GcError>(())
    /// ```
    pub fn new(config: GcConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| GcError::Configuration(format!("Invalid configuration: {}", e)))?;

        let arena = HeapArena::initialize(config.heap_size_words)?;
        let allocator = BumpAllocator::new(arena.space_words());
        let roots = RootStack::with_capacity(config.root_stack_capacity)?;
        let logger = GcLogger::new(GcLoggerConfig::from_gc_config(&config));

        log::info!(
            "x0gc initialized: {} words per space, {} root slots",
            arena.space_words(),
            roots.capacity()
        );

        Ok(Self {
            arena,
            allocator,
            roots,
            config,
            stats: GcStats::new(),
            logger,
            state: GcState::Idle,
            cycle_count: 0,
        })
    }

    /// Allocate `words` zeroed words in the active space
    ///
    /// A request that does not fit triggers one collection over the whole
    /// root stack; if it still does not fit the result is `OutOfMemory`.
    /// Any reference not on the root stack is stale afterwards.
    ///
    /// # Errors
    /// - `InvalidSize` for zero words
    /// - `OutOfMemory` when the live data leaves too little room
    /// - collection errors (the collector is then poisoned)
    pub fn allocate(&mut self, words: usize) -> Result<ObjRef> {
        self.ensure_usable()?;
        if words == 0 {
            return Err(GcError::InvalidSize { words });
        }

        if !self.allocator.fits(words) {
            let available = self.allocator.remaining();
            self.logger.log(GcEvent::AllocationFailure {
                requested: words,
                available,
            });
            self.stats.record_allocation_trigger();

            let live_roots = self.roots.top_index();
            self.run_cycle(
                live_roots,
                GcReason::AllocationFailure {
                    requested: words,
                    available,
                },
            )?;

            if !self.allocator.fits(words) {
                let available = self.allocator.remaining();
                log::error!(
                    "out of memory: {} words requested, {} available after collection",
                    words,
                    available
                );
                return Err(GcError::OutOfMemory {
                    requested: words,
                    available,
                });
            }
        }

        let offset = self.allocator.allocate(words)?;
        let loc = Location::new(self.arena.active(), offset);
        self.arena.zero_words(loc, words)?;
        self.stats.record_allocation(words);

        let address = self.arena.address_of(loc);
        ObjRef::from_addr(address)
            .ok_or_else(|| GcError::Internal("allocation produced a null address".to_string()))
    }

    /// Collect, treating root stack entries `0..live_root_count` as live
    ///
    /// Entries at or above `live_root_count` are left untouched and are
    /// stale after the pass.
    ///
    /// # Errors
    /// - `InvalidArgument` if `live_root_count` exceeds the root stack top
    /// - `Poisoned` if an earlier pass failed
    /// - any pass failure, which poisons the collector
    pub fn collect(&mut self, live_root_count: usize) -> Result<CycleStats> {
        self.ensure_usable()?;
        let top = self.roots.top_index();
        if live_root_count > top {
            return Err(GcError::InvalidArgument(format!(
                "live root count {} exceeds root stack top {}",
                live_root_count, top
            )));
        }

        self.run_cycle(live_root_count, GcReason::Explicit)
    }

    /// Run one pass with state transitions, logging and statistics
    fn run_cycle(&mut self, live_roots: usize, reason: GcReason) -> Result<CycleStats> {
        let cycle = self.cycle_count + 1;
        let words_before = self.allocator.top();

        self.state = GcState::Collecting;
        self.logger.log(GcEvent::CycleStart {
            cycle,
            reason: reason.to_string(),
            live_roots,
        });

        let timer = GcTimer::new();
        let summary = match self.execute_pass(live_roots) {
            Ok(summary) => summary,
            Err(e) => {
                self.state = GcState::Poisoned;
                log::error!("collection {} failed, collector poisoned: {}", cycle, e);
                return Err(e);
            }
        };
        let duration = timer.elapsed();

        self.state = GcState::Idle;
        self.cycle_count = cycle;
        self.stats.record_collection(
            summary.objects_copied,
            words_before,
            summary.words_copied,
            duration,
        );

        let cycle_stats = CycleStats {
            cycle,
            reason,
            live_roots,
            objects_copied: summary.objects_copied,
            words_before,
            words_after: summary.words_copied,
            duration,
        };
        self.finalize_cycle(&cycle_stats, &summary, &timer);

        Ok(cycle_stats)
    }

    fn execute_pass(&mut self, live_roots: usize) -> Result<RelocationSummary> {
        self.arena.open_inactive()?;

        let mut relocator = Relocator::new(&mut self.arena, self.allocator.top())?;
        relocator.relocate_roots(self.roots.live_mut(live_roots))?;
        relocator.scan()?;
        let summary = relocator.finish();

        self.arena.swap()?;
        self.allocator.reset_to(summary.words_copied);

        Ok(summary)
    }

    fn finalize_cycle(&self, stats: &CycleStats, summary: &RelocationSummary, timer: &GcTimer) {
        self.logger.log(GcEvent::RelocateStats {
            relocated_count: summary.objects_copied,
            words_moved: summary.words_copied,
            table_entries: summary.table_entries,
        });
        self.logger.log(GcEvent::ProtectionChange {
            active: self.arena.active().to_string(),
            protected: self.arena.protected().to_string(),
        });
        self.logger.log(GcEvent::CycleEnd {
            cycle: stats.cycle,
            duration_ms: timer.elapsed_ms(),
            words_live: stats.words_after,
            words_reclaimed: stats.words_reclaimed(),
        });
        self.logger.log(GcEvent::HeapStats {
            used_words: self.used_words(),
            space_words: self.arena.space_words(),
            utilization: self.utilization(),
        });
    }

    fn ensure_usable(&self) -> Result<()> {
        match self.state {
            GcState::Poisoned => Err(GcError::Poisoned),
            _ => Ok(()),
        }
    }

    // ---- Root stack ----

    /// Push a reference onto the root stack
    ///
    /// # Errors
    /// - `ProtectedAccess` for a reference left stale by an earlier pass
    /// - `InvalidReference` / `CorruptObject` for anything that is not an
    ///   allocated object in the active space
    /// - `RootStackOverflow` when the stack is full
    pub fn root_push(&mut self, reference: ObjRef) -> Result<()> {
        self.ensure_usable()?;
        self.check_object(reference)?;
        self.roots.push(reference)
    }

    /// Pop the top root, returning its current address
    pub fn root_pop(&mut self) -> Result<ObjRef> {
        self.ensure_usable()?;
        self.roots.pop()
    }

    /// Number of entries on the root stack
    pub fn root_top(&self) -> usize {
        self.roots.top_index()
    }

    pub fn roots(&self) -> &RootStack {
        &self.roots
    }

    // ---- Typed object access ----

    /// Allocate an Int
    pub fn alloc_int(&mut self, value: i64) -> Result<ObjRef> {
        self.alloc_scalar(Tag::Int, value as usize)
    }

    /// Allocate a Bool
    pub fn alloc_bool(&mut self, value: bool) -> Result<ObjRef> {
        self.alloc_scalar(Tag::Bool, usize::from(value))
    }

    fn alloc_scalar(&mut self, tag: Tag, word1: usize) -> Result<ObjRef> {
        let obj = self.allocate(SCALAR_WORDS)?;
        let loc = self.location_of(obj)?;
        self.arena.write_word(loc, tag.as_word())?;
        self.arena.write_word(loc.add(1), word1)?;
        Ok(obj)
    }

    /// Allocate a Vector holding `elements`
    ///
    /// The elements are rooted for the duration of the allocation, so they
    /// stay valid even if it triggers a collection.
    pub fn alloc_vector(&mut self, elements: &[Option<ObjRef>]) -> Result<ObjRef> {
        self.ensure_usable()?;
        for element in elements.iter().flatten() {
            self.check_object(*element)?;
        }

        let base = self.roots.top_index();
        for element in elements.iter().flatten() {
            if let Err(e) = self.roots.push(*element) {
                self.roots.truncate(base);
                return Err(e);
            }
        }

        let allocated = self.allocate(vector_words(elements.len()));
        let mut rooted = self.roots.as_slice()[base..].iter().copied();
        let slots: Vec<usize> = elements
            .iter()
            .map(|element| match element {
                Some(_) => ObjRef::to_slot(rooted.next()),
                None => ObjRef::to_slot(None),
            })
            .collect();
        self.roots.truncate(base);

        let obj = allocated?;
        let loc = self.location_of(obj)?;
        self.arena.write_word(loc, Tag::Vector.as_word())?;
        self.arena.write_word(loc.add(1), elements.len())?;
        for (index, &slot) in slots.iter().enumerate() {
            self.arena.write_word(loc.add(HEADER_WORDS + index), slot)?;
        }
        Ok(obj)
    }

    /// Decoded header of a live object
    pub fn header(&self, obj: ObjRef) -> Result<ObjectHeader> {
        self.check_object(obj).map(|(_, header)| header)
    }

    pub fn tag_of(&self, obj: ObjRef) -> Result<Tag> {
        self.header(obj).map(|header| header.tag)
    }

    /// Value of an Int
    pub fn int_value(&self, obj: ObjRef) -> Result<i64> {
        let header = self.expect_tag(obj, Tag::Int)?;
        Ok(header.word1 as i64)
    }

    /// Value of a Bool
    pub fn bool_value(&self, obj: ObjRef) -> Result<bool> {
        let header = self.expect_tag(obj, Tag::Bool)?;
        Ok(header.word1 != 0)
    }

    /// Slot count of a Vector
    pub fn vector_len(&self, obj: ObjRef) -> Result<usize> {
        self.expect_tag(obj, Tag::Vector).map(|header| header.word1)
    }

    /// Reference in slot `index` of a Vector, `None` for a null slot
    pub fn vector_get(&self, obj: ObjRef, index: usize) -> Result<Option<ObjRef>> {
        let slot = self.slot_location(obj, index)?;
        Ok(ObjRef::from_addr(self.arena.read_word(slot)?))
    }

    /// Store a reference (or null) in slot `index` of a Vector
    ///
    /// # Errors
    /// `InvalidArgument` for an index past the end; the value must itself be
    /// a live object.
    pub fn vector_set(&mut self, obj: ObjRef, index: usize, value: Option<ObjRef>) -> Result<()> {
        self.ensure_usable()?;
        let slot = self.slot_location(obj, index)?;
        if let Some(value) = value {
            self.check_object(value)?;
        }
        self.arena.write_word(slot, ObjRef::to_slot(value))
    }

    /// Structural view of a live object
    pub fn value(&self, obj: ObjRef) -> Result<HeapValue> {
        let (loc, header) = self.check_object(obj)?;
        match header.tag {
            Tag::Int => Ok(HeapValue::Int(header.word1 as i64)),
            Tag::Bool => Ok(HeapValue::Bool(header.word1 != 0)),
            Tag::Vector => {
                let slots = (0..header.word1)
                    .map(|i| {
                        self.arena
                            .read_word(loc.add(HEADER_WORDS + i))
                            .map(ObjRef::from_addr)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(HeapValue::Vector(slots))
            }
        }
    }

    /// Raw word `index` of an object, counting the tag as word 0
    pub fn read_word(&self, obj: ObjRef, index: usize) -> Result<usize> {
        let loc = self.word_location(obj, index)?;
        self.arena.read_word(loc)
    }

    /// Overwrite raw word `index` of an object
    ///
    /// No layout checks are made; writing a bad tag or length corrupts the
    /// heap and is reported by the next collection.
    pub fn write_word(&mut self, obj: ObjRef, index: usize, value: usize) -> Result<()> {
        self.ensure_usable()?;
        let loc = self.word_location(obj, index)?;
        self.arena.write_word(loc, value)
    }

    /// Location of an allocated word in the active space
    fn location_of(&self, obj: ObjRef) -> Result<Location> {
        self.word_location(obj, 0)
    }

    fn word_location(&self, obj: ObjRef, index: usize) -> Result<Location> {
        let address = obj.addr();
        let loc = self
            .arena
            .locate(address)
            .ok_or(GcError::InvalidReference { address })?;
        if loc.space != self.arena.active() {
            return Err(GcError::ProtectedAccess { address });
        }

        let word = loc.offset.checked_add(index);
        if word.is_none_or(|word| word >= self.allocator.top()) {
            return Err(GcError::InvalidReference { address });
        }
        Ok(loc.add(index))
    }

    /// Validate a reference to a whole, allocated object
    fn check_object(&self, obj: ObjRef) -> Result<(Location, ObjectHeader)> {
        let loc = self.location_of(obj)?;
        let header = ObjectHeader::read(&self.arena, loc)?;

        let end = header
            .size_words()
            .and_then(|size| loc.offset.checked_add(size));
        if end.is_none_or(|end| end > self.allocator.top()) {
            return Err(GcError::CorruptObject {
                address: obj.addr(),
                reason: "object extends past the allocation cursor".to_string(),
            });
        }
        Ok((loc, header))
    }

    fn expect_tag(&self, obj: ObjRef, expected: Tag) -> Result<ObjectHeader> {
        let header = self.header(obj)?;
        if header.tag != expected {
            return Err(GcError::InvalidArgument(format!(
                "expected {} at {:?}, found {}",
                expected, obj, header.tag
            )));
        }
        Ok(header)
    }

    fn slot_location(&self, obj: ObjRef, index: usize) -> Result<Location> {
        let (loc, header) = self.check_object(obj)?;
        if header.tag != Tag::Vector {
            return Err(GcError::InvalidArgument(format!(
                "expected Vector at {:?}, found {}",
                obj, header.tag
            )));
        }
        if index >= header.word1 {
            return Err(GcError::InvalidArgument(format!(
                "slot {} out of bounds for vector of length {}",
                index, header.word1
            )));
        }
        Ok(loc.add(HEADER_WORDS + index))
    }

    // ---- Introspection ----

    pub fn arena(&self) -> &HeapArena {
        &self.arena
    }

    /// Get current GC state
    pub fn state(&self) -> GcState {
        self.state
    }

    pub fn is_poisoned(&self) -> bool {
        self.state == GcState::Poisoned
    }

    /// Completed collection passes
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Words allocated in the active space
    pub fn used_words(&self) -> usize {
        self.allocator.top()
    }

    /// Words still available in the active space
    pub fn free_words(&self) -> usize {
        self.allocator.remaining()
    }

    /// Fraction of the active space in use
    pub fn utilization(&self) -> f64 {
        self.allocator.allocated() as f64 / self.allocator.capacity() as f64
    }

    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    pub fn logger(&self) -> &GcLogger {
        &self.logger
    }

    /// Release the heap and the root stack
    pub fn shutdown(self) {
        log::info!(
            "x0gc shutting down after {} collections ({} allocations)",
            self.cycle_count,
            self.stats.allocations
        );
        let Self { arena, .. } = self;
        arena.teardown();
    }
}

impl fmt::Debug for GarbageCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GarbageCollector")
            .field("arena", &self.arena)
            .field("used_words", &self.used_words())
            .field("roots", &self.roots.top_index())
            .field("state", &self.state)
            .field("cycle_count", &self.cycle_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::SpaceId;

    fn gc(heap_words: usize) -> GarbageCollector {
        GarbageCollector::new(GcConfig::with_sizes(heap_words, 16)).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = GarbageCollector::new(GcConfig::with_sizes(1, 16));
        assert!(matches!(result, Err(GcError::Configuration(_))));
    }

    #[test]
    fn test_allocation_is_zeroed_and_bumps() {
        let mut gc = gc(256);
        let a = gc.allocate(3).unwrap();
        let b = gc.allocate(2).unwrap();

        assert_eq!(b.addr() - a.addr(), 3 * crate::object::WORD_SIZE);
        assert_eq!(gc.used_words(), 5);
        assert_eq!(gc.int_value(a).unwrap(), 0);
        assert!(matches!(gc.allocate(0), Err(GcError::InvalidSize { .. })));
    }

    #[test]
    fn test_collect_moves_rooted_objects() {
        let mut gc = gc(256);
        let n = gc.alloc_int(42).unwrap();
        gc.alloc_int(7).unwrap();
        gc.root_push(n).unwrap();

        let cycle = gc.collect(1).unwrap();
        assert_eq!(cycle.objects_copied, 1);
        assert_eq!(cycle.words_before, 4);
        assert_eq!(cycle.words_after, 2);
        assert_eq!(cycle.words_reclaimed(), 2);

        let moved = gc.root_pop().unwrap();
        assert_ne!(moved, n);
        assert_eq!(gc.arena().space_of(moved.addr()), Some(SpaceId::High));
        assert_eq!(gc.int_value(moved).unwrap(), 42);
        assert_eq!(gc.used_words(), 2);
    }

    #[test]
    fn test_stale_reference_is_protected() {
        let mut gc = gc(256);
        let n = gc.alloc_int(1).unwrap();
        gc.collect(0).unwrap();
        assert!(matches!(
            gc.int_value(n),
            Err(GcError::ProtectedAccess { .. })
        ));
    }

    #[test]
    fn test_collect_rejects_excess_live_count() {
        let mut gc = gc(256);
        assert!(matches!(
            gc.collect(1),
            Err(GcError::InvalidArgument(_))
        ));
        assert_eq!(gc.state(), GcState::Idle);
    }

    #[test]
    fn test_allocation_failure_collects_once() {
        // 16 words per space.
        let mut gc = gc(32);
        for _ in 0..8 {
            gc.alloc_int(1).unwrap();
        }
        assert_eq!(gc.free_words(), 0);

        let n = gc.alloc_int(2).unwrap();
        assert_eq!(gc.cycle_count(), 1);
        assert_eq!(gc.stats().allocation_triggered, 1);
        assert_eq!(gc.int_value(n).unwrap(), 2);
    }

    #[test]
    fn test_out_of_memory_when_live_data_fills_space() {
        let mut gc = gc(32);
        let v = gc.alloc_vector(&[None; 14]).unwrap();
        gc.root_push(v).unwrap();

        let err = gc.alloc_int(1).unwrap_err();
        assert!(matches!(
            err,
            GcError::OutOfMemory {
                requested: 2,
                available: 0
            }
        ));
        assert!(!gc.is_poisoned());
        assert_eq!(gc.vector_len(gc.roots().get(0).unwrap()).unwrap(), 14);
    }

    #[test]
    fn test_root_push_validates_reference() {
        let mut gc = gc(256);
        assert!(matches!(
            gc.root_push(ObjRef::from_addr(8).unwrap()),
            Err(GcError::InvalidReference { address: 8 })
        ));

        let n = gc.alloc_int(1).unwrap();
        gc.collect(0).unwrap();
        assert!(matches!(
            gc.root_push(n),
            Err(GcError::ProtectedAccess { .. })
        ));
        assert_eq!(gc.root_top(), 0);
        assert!(!gc.is_poisoned());
    }

    #[test]
    fn test_stale_root_poisons() {
        let mut gc = gc(256);
        let a = gc.alloc_int(1).unwrap();
        let b = gc.alloc_int(2).unwrap();
        gc.root_push(a).unwrap();
        gc.root_push(b).unwrap();
        // The upper root is left behind in the vacated space.
        gc.collect(1).unwrap();

        assert!(matches!(
            gc.collect(2),
            Err(GcError::ProtectedAccess { .. })
        ));
        assert!(gc.is_poisoned());
        assert!(matches!(gc.alloc_int(1), Err(GcError::Poisoned)));
        assert!(matches!(gc.collect(0), Err(GcError::Poisoned)));
    }

    #[test]
    fn test_vector_accessors() {
        let mut gc = gc(256);
        let a = gc.alloc_int(1).unwrap();
        let b = gc.alloc_bool(true).unwrap();
        let v = gc.alloc_vector(&[Some(a), None]).unwrap();

        assert_eq!(gc.vector_len(v).unwrap(), 2);
        assert_eq!(gc.vector_get(v, 0).unwrap(), Some(a));
        assert_eq!(gc.vector_get(v, 1).unwrap(), None);

        gc.vector_set(v, 1, Some(b)).unwrap();
        assert_eq!(
            gc.value(v).unwrap(),
            HeapValue::Vector(vec![Some(a), Some(b)])
        );
        assert!(matches!(
            gc.vector_get(v, 2),
            Err(GcError::InvalidArgument(_))
        ));
        assert!(matches!(gc.int_value(v), Err(GcError::InvalidArgument(_))));
        assert_eq!(gc.roots().top_index(), 0);
    }

    #[test]
    fn test_alloc_vector_roots_elements_across_collection() {
        // 16 words per space: 8 scalars fill it.
        let mut gc = gc(32);
        let keep = gc.alloc_int(99).unwrap();
        for _ in 0..7 {
            gc.alloc_int(0).unwrap();
        }

        let v = gc.alloc_vector(&[Some(keep)]).unwrap();
        assert_eq!(gc.cycle_count(), 1);
        let element = gc.vector_get(v, 0).unwrap().unwrap();
        assert_ne!(element, keep);
        assert_eq!(gc.int_value(element).unwrap(), 99);
        assert_eq!(gc.root_top(), 0);
    }

    #[test]
    fn test_raw_words_bounded_by_cursor() {
        let mut gc = gc(256);
        let n = gc.alloc_int(5).unwrap();
        assert_eq!(gc.read_word(n, 0).unwrap(), Tag::Int.as_word());
        assert_eq!(gc.read_word(n, 1).unwrap(), 5);
        assert!(matches!(
            gc.read_word(n, 2),
            Err(GcError::InvalidReference { .. })
        ));

        gc.write_word(n, 1, 6).unwrap();
        assert_eq!(gc.int_value(n).unwrap(), 6);
    }

    #[test]
    fn test_logger_records_cycle() {
        let mut gc = gc(256);
        gc.collect(0).unwrap();
        let events = gc.logger().get_events();
        assert!(events
            .iter()
            .any(|(_, e)| matches!(e, GcEvent::CycleEnd { cycle: 1, .. })));
    }
}
