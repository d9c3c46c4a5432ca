//! Test Utilities for the X0GC Test Suite
//!
//! - [`GcFixture`]: a collector sized for the test at hand
//! - [`snapshot`]: canonical form of the graph reachable from a set of
//!   roots, so graphs can be compared across a collection regardless of
//!   where their objects live

#![allow(dead_code)]

use std::collections::HashMap;
use x0gc::{CycleStats, GarbageCollector, GcConfig, HeapValue, ObjRef};

/// Heap for most tests (32Ki words per space)
pub const DEFAULT_HEAP_WORDS: usize = 64 * 1024;

/// Heap small enough to fill by hand (32 words per space)
pub const SMALL_HEAP_WORDS: usize = 64;

pub const DEFAULT_ROOTS: usize = 64;

/// ============================================================================
/// GC FIXTURE
/// ============================================================================

/// Test fixture owning one collector
pub struct GcFixture {
    pub gc: GarbageCollector,
    pub config: GcConfig,
}

impl GcFixture {
    pub fn with_defaults() -> Self {
        Self::with_sizes(DEFAULT_HEAP_WORDS, DEFAULT_ROOTS)
    }

    pub fn small() -> Self {
        Self::with_sizes(SMALL_HEAP_WORDS, DEFAULT_ROOTS)
    }

    pub fn with_sizes(heap_size_words: usize, root_stack_capacity: usize) -> Self {
        let config = GcConfig::with_sizes(heap_size_words, root_stack_capacity);
        let gc = GarbageCollector::new(config.clone())
            .expect("GC initialization should succeed with valid config");
        Self { gc, config }
    }

    pub fn int(&mut self, value: i64) -> ObjRef {
        self.gc.alloc_int(value).expect("Int allocation")
    }

    pub fn boolean(&mut self, value: bool) -> ObjRef {
        self.gc.alloc_bool(value).expect("Bool allocation")
    }

    pub fn vector(&mut self, elements: &[Option<ObjRef>]) -> ObjRef {
        self.gc.alloc_vector(elements).expect("Vector allocation")
    }

    pub fn push(&mut self, obj: ObjRef) {
        self.gc.root_push(obj).expect("root push");
    }

    pub fn pop(&mut self) -> ObjRef {
        self.gc.root_pop().expect("root pop")
    }

    /// Collect with every root stack entry live
    pub fn collect_all(&mut self) -> CycleStats {
        let live = self.gc.root_top();
        self.gc.collect(live).expect("collection should succeed")
    }

    /// Current root stack contents, bottom first
    pub fn roots(&self) -> Vec<ObjRef> {
        self.gc.roots().as_slice().to_vec()
    }

    /// Snapshot of everything reachable from the root stack
    pub fn snapshot(&self) -> GraphSnapshot {
        snapshot(&self.gc, &self.roots())
    }
}

/// ============================================================================
/// GRAPH SNAPSHOTS
/// ============================================================================

/// Object with references replaced by node numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Int(i64),
    Bool(bool),
    Vector(Vec<Option<usize>>),
}

/// Reachable graph numbered in breadth-first order from the roots
///
/// Two graphs have equal snapshots exactly when they are isomorphic with
/// the roots in the same order; aliasing shows up as repeated numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSnapshot {
    pub roots: Vec<usize>,
    pub nodes: Vec<Node>,
}

pub fn snapshot(gc: &GarbageCollector, roots: &[ObjRef]) -> GraphSnapshot {
    let mut ids = HashMap::new();
    let mut order = Vec::new();

    let roots = roots
        .iter()
        .map(|&r| intern(&mut ids, &mut order, r))
        .collect();

    let mut nodes = Vec::new();
    let mut next = 0;
    while next < order.len() {
        let obj = order[next];
        let node = match gc.value(obj).expect("reachable object must be readable") {
            HeapValue::Int(v) => Node::Int(v),
            HeapValue::Bool(b) => Node::Bool(b),
            HeapValue::Vector(slots) => Node::Vector(
                slots
                    .into_iter()
                    .map(|slot| slot.map(|r| intern(&mut ids, &mut order, r)))
                    .collect(),
            ),
        };
        nodes.push(node);
        next += 1;
    }

    GraphSnapshot { roots, nodes }
}

fn intern(ids: &mut HashMap<ObjRef, usize>, order: &mut Vec<ObjRef>, obj: ObjRef) -> usize {
    *ids.entry(obj).or_insert_with(|| {
        order.push(obj);
        order.len() - 1
    })
}

/// Offset of a reference from the start of the active space, in words
pub fn active_offset(gc: &GarbageCollector, obj: ObjRef) -> usize {
    let start = gc.arena().space_start(gc.arena().active());
    (obj.addr() - start) / x0gc::WORD_SIZE
}
