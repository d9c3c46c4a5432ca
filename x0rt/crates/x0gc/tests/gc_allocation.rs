//! Allocation Tests - Bump Allocation, Reclamation and Exhaustion
//!
//! Small heaps (32 words per space) make every word count visible.

mod common;

use common::{GcFixture, SMALL_HEAP_WORDS};
use x0gc::allocator::words_for_bytes;
use x0gc::{GcError, GcReason, WORD_SIZE};

/// ============================================================================
/// RECLAMATION
/// ============================================================================

/// A request refused while garbage is rooted succeeds once it is unrooted
#[test]
fn test_capacity_reclamation() {
    let mut f = GcFixture::small();
    let space = f.gc.arena().space_words();
    assert_eq!(space, 32);

    // 16 words held live by the root stack.
    let ballast = f.vector(&[None; 14]);
    f.push(ballast);

    let err = f.gc.allocate(20).unwrap_err();
    assert!(matches!(
        err,
        GcError::OutOfMemory {
            requested: 20,
            available: 16
        }
    ));
    assert_eq!(f.gc.cycle_count(), 1);

    f.pop();
    let obj = f.gc.allocate(20).unwrap();
    assert_eq!(f.gc.cycle_count(), 2);
    assert_eq!(f.gc.used_words(), 20);
    assert_eq!(f.gc.arena().space_of(obj.addr()), Some(f.gc.arena().active()));
}

#[test]
fn test_cursor_resumes_after_live_words() {
    let mut f = GcFixture::with_defaults();
    let keep = f.int(1);
    for i in 0..10 {
        f.int(i);
    }
    f.push(keep);
    f.collect_all();
    assert_eq!(f.gc.used_words(), 2);

    let next = f.int(2);
    let keep = f.roots()[0];
    assert_eq!(next.addr() - keep.addr(), 2 * WORD_SIZE);
}

#[test]
fn test_steady_state_allocation_loop() {
    let mut f = GcFixture::small();
    let counter = f.vector(&[None]);
    f.push(counter);

    for i in 0..1_000 {
        let n = f.int(i);
        let counter = f.roots()[0];
        f.gc.vector_set(counter, 0, Some(n)).unwrap();
    }

    assert!(f.gc.cycle_count() > 0);
    assert_eq!(f.gc.stats().allocation_triggered, f.gc.cycle_count());
    let counter = f.roots()[0];
    let last = f.gc.vector_get(counter, 0).unwrap().unwrap();
    assert_eq!(f.gc.int_value(last).unwrap(), 999);
}

/// Collections triggered by allocation carry the request in their reason
#[test]
fn test_allocation_failure_reason() {
    let mut f = GcFixture::small();
    for _ in 0..16 {
        f.int(0);
    }
    let before = f.gc.logger().event_count();

    f.int(1);
    assert_eq!(f.gc.cycle_count(), 1);
    assert!(f.gc.logger().event_count() > before);

    let reason = GcReason::AllocationFailure {
        requested: 2,
        available: 0,
    };
    assert_eq!(reason.to_string(), "allocation of 2 words (0 available)");
}

/// ============================================================================
/// EXHAUSTION AND SIZES
/// ============================================================================

#[test]
fn test_oversized_request_is_out_of_memory() {
    let mut f = GcFixture::small();
    let space = f.gc.arena().space_words();

    let err = f.gc.allocate(space + 1).unwrap_err();
    assert!(matches!(err, GcError::OutOfMemory { .. }));
    assert!(err.is_recoverable());
    assert!(!f.gc.is_poisoned());

    // The collector is still usable.
    f.gc.allocate(space).unwrap();
    assert_eq!(f.gc.free_words(), 0);
}

#[test]
fn test_zero_size_rejected() {
    let mut f = GcFixture::small();
    assert!(matches!(
        f.gc.allocate(0),
        Err(GcError::InvalidSize { words: 0 })
    ));
    assert_eq!(f.gc.used_words(), 0);
}

#[test]
fn test_byte_sizes_round_up_to_words() {
    let mut f = GcFixture::small();
    let words = words_for_bytes(2 * WORD_SIZE as i64 + 1).unwrap();
    assert_eq!(words, 3);

    f.gc.allocate(words).unwrap();
    assert_eq!(f.gc.used_words(), 3);
    assert!(words_for_bytes(0).is_err());
    assert!(words_for_bytes(-16).is_err());
}

#[test]
fn test_reused_space_is_zeroed() {
    let mut f = GcFixture::small();
    let stale = f.int(7);
    let low = f.gc.arena().active();

    // Two empty passes bring the same half back into service.
    f.gc.collect(0).unwrap();
    f.gc.collect(0).unwrap();
    assert_eq!(f.gc.arena().active(), low);

    let fresh = f.gc.allocate(2).unwrap();
    assert_eq!(fresh, stale);
    assert_eq!(f.gc.read_word(fresh, 0).unwrap(), 0);
    assert_eq!(f.gc.read_word(fresh, 1).unwrap(), 0);
}

#[test]
fn test_stats_track_allocations_and_cycles() {
    let mut f = GcFixture::with_sizes(SMALL_HEAP_WORDS, 4);
    for i in 0..20 {
        f.int(i);
    }

    let stats = f.gc.stats().clone();
    assert_eq!(stats.allocations, 20);
    assert_eq!(stats.words_allocated, 40);
    assert_eq!(stats.cycles, f.gc.cycle_count());
    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.words_reclaimed, 32);
}
