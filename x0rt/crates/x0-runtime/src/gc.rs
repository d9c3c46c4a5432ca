//! GC Runtime - C FFI wrapper for X0GC
//!
//! Generated code links against these symbols. The collector lives in one
//! process-wide slot; every entry point locks it for the duration of the
//! call.
//!
//! Error policy:
//! - capacity errors and bad arguments are logged and reported through
//!   the return value (null, `false`)
//! - fatal errors release the heap and exit with the error's sentinel

use parking_lot::{Mutex, MutexGuard};
use std::ffi::c_void;
use x0gc::allocator::words_for_bytes;
use x0gc::{GarbageCollector, GcConfig, GcError, ObjRef};

static RUNTIME: Mutex<Option<GarbageCollector>> = parking_lot::const_mutex(None);

/// How long a signal waits for an in-flight call before exiting anyway
#[cfg(unix)]
const SIGNAL_LOCK_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(500);

/// Initialize the runtime with a heap of `heap_size_words` total words
///
/// Returns `false` for unusable sizes. Mapping, protection or root stack
/// failures terminate the process.
#[no_mangle]
pub extern "C" fn gc_init(heap_size_words: i64, root_stack_size: i64) -> bool {
    let mut guard = RUNTIME.lock();
    if guard.is_some() {
        log::warn!("gc_init: runtime already initialized");
        return true;
    }

    let (Ok(heap_size_words), Ok(root_stack_capacity)) = (
        usize::try_from(heap_size_words),
        usize::try_from(root_stack_size),
    ) else {
        log::error!(
            "gc_init: negative size (heap {}, roots {})",
            heap_size_words,
            root_stack_size
        );
        return false;
    };

    let config = GcConfig {
        heap_size_words,
        root_stack_capacity,
        ..GcConfig::from_env()
    };

    match GarbageCollector::new(config) {
        Ok(gc) => {
            *guard = Some(gc);
        },
        Err(e) if e.is_fatal() => terminate(guard, &e),
        Err(e) => {
            log::error!("gc_init: {}", e);
            return false;
        },
    }
    drop(guard);

    install_signal_cleanup();
    true
}

#[cfg(unix)]
fn install_signal_cleanup() {
    if let Err(e) = crate::signals::install() {
        log::warn!("gc_init: signal cleanup not installed: {}", e);
    }
}

#[cfg(not(unix))]
fn install_signal_cleanup() {}

/// Allocate `size` bytes (rounded up to whole words), zero-filled
///
/// Returns null for a non-positive size or when the heap is exhausted.
#[no_mangle]
pub extern "C" fn gc_malloc(size: i64) -> *mut c_void {
    let words = match words_for_bytes(size) {
        Ok(words) => words,
        Err(e) => {
            log::warn!("gc_malloc({}): {}", size, e);
            return std::ptr::null_mut();
        },
    };

    with_runtime("gc_malloc", |gc| gc.allocate(words))
        .map_or(std::ptr::null_mut(), |obj| obj.addr() as *mut c_void)
}

/// Collect with the bottom `live_root_count` root stack entries live
#[no_mangle]
pub extern "C" fn gc_collect(live_root_count: i64) {
    let Ok(count) = usize::try_from(live_root_count) else {
        log::warn!("gc_collect: negative live root count {}", live_root_count);
        return;
    };
    with_runtime("gc_collect", |gc| gc.collect(count));
}

/// Push a reference; `false` on overflow or a null reference
///
/// A reference left stale by an earlier collection terminates the process.
#[no_mangle]
pub extern "C" fn root_stack_push(object: *mut i64) -> bool {
    let Some(reference) = ObjRef::from_addr(object as usize) else {
        log::warn!("root_stack_push: null reference");
        return false;
    };
    with_runtime("root_stack_push", |gc| gc.root_push(reference)).is_some()
}

/// Pop the top reference (its current address); null when empty
#[no_mangle]
pub extern "C" fn root_stack_pop() -> *mut i64 {
    with_runtime("root_stack_pop", |gc| gc.root_pop())
        .map_or(std::ptr::null_mut(), |obj| obj.addr() as *mut i64)
}

/// Number of entries on the root stack, 0 before initialization
#[no_mangle]
pub extern "C" fn root_stack_top() -> i64 {
    RUNTIME
        .lock()
        .as_ref()
        .map_or(0, |gc| i64::try_from(gc.root_top()).unwrap_or(i64::MAX))
}

/// Release the heap and root stack
#[no_mangle]
pub extern "C" fn gc_destroy() {
    match RUNTIME.lock().take() {
        Some(gc) => gc.shutdown(),
        None => log::warn!("gc_destroy: runtime not initialized"),
    }
}

/// Run `op` against the runtime, applying the error policy
fn with_runtime<T>(
    name: &str,
    op: impl FnOnce(&mut GarbageCollector) -> x0gc::Result<T>,
) -> Option<T> {
    let mut guard = RUNTIME.lock();
    let Some(gc) = guard.as_mut() else {
        log::error!("{}: runtime not initialized", name);
        return None;
    };

    match op(gc) {
        Ok(value) => Some(value),
        Err(e) if e.is_fatal() => terminate(guard, &e),
        Err(e) => {
            log::warn!("{}: {}", name, e);
            None
        },
    }
}

/// Release the heap and exit with the error's sentinel
fn terminate(mut guard: MutexGuard<'_, Option<GarbageCollector>>, error: &GcError) -> ! {
    log::error!("fatal runtime error: {}", error);
    if let Some(gc) = guard.take() {
        gc.shutdown();
    }
    drop(guard);
    std::process::exit(error.exit_code())
}

/// Release the heap on behalf of a signal
///
/// Waits briefly for an in-flight call; if the lock is never released the
/// process exits with the mapping still in place.
#[cfg(unix)]
pub(crate) fn release_for_signal() {
    match RUNTIME.try_lock_for(SIGNAL_LOCK_TIMEOUT) {
        Some(mut guard) => {
            if let Some(gc) = guard.take() {
                gc.shutdown();
            }
        },
        None => log::error!("runtime busy, exiting without releasing the heap"),
    }
}
