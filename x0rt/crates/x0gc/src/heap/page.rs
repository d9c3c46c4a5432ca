//! Page Helpers - System Page Size and Rounding
//!
//! Page protection works on whole pages, so each semi-space is rounded up
//! to a page multiple before the heap is mapped.

use std::sync::atomic::{AtomicUsize, Ordering};

/// System page size (cached)
static SYSTEM_PAGE_SIZE: AtomicUsize = AtomicUsize::new(0);

/// Get system page size dynamically
///
/// Returns actual system page size from OS.
/// Caches result for performance.
pub fn get_page_size() -> usize {
    let cached = SYSTEM_PAGE_SIZE.load(Ordering::Relaxed);
    if cached != 0 {
        return cached;
    }

    let size = page_size::get();
    SYSTEM_PAGE_SIZE.store(size, Ordering::Relaxed);
    size
}

/// Align size to page boundary (round up)
///
/// Returns `None` if rounding overflows.
pub fn align_to_page(size: usize) -> Option<usize> {
    let ps = get_page_size();
    size.checked_add(ps - 1).map(|s| s & !(ps - 1))
}

/// Check if address is page-aligned
pub fn is_page_aligned(addr: usize) -> bool {
    addr.is_multiple_of(get_page_size())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        let ps = get_page_size();
        assert!(ps.is_power_of_two());
        assert_eq!(get_page_size(), ps);
    }

    #[test]
    fn test_align_to_page() {
        let ps = get_page_size();
        assert_eq!(align_to_page(0), Some(0));
        assert_eq!(align_to_page(1), Some(ps));
        assert_eq!(align_to_page(ps), Some(ps));
        assert_eq!(align_to_page(ps + 1), Some(2 * ps));
        assert_eq!(align_to_page(usize::MAX), None);
        assert!(is_page_aligned(2 * ps));
        assert!(!is_page_aligned(ps + 8));
    }
}
