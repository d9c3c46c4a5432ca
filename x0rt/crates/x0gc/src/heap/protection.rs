//! Page Protection - Toggle access rights on a semi-space
//!
//! Platform Support:
//! - Unix: mprotect(PROT_NONE / PROT_READ | PROT_WRITE)
//! - Windows: VirtualProtect(PAGE_NOACCESS / PAGE_READWRITE)

use crate::error::{GcError, Result};

/// Access rights applied to a whole semi-space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any access faults
    None,
    /// Readable and writable
    ReadWrite,
}

/// Change protection of `len` bytes starting at `ptr`
///
/// # Safety
/// `ptr` must be page-aligned and `ptr..ptr+len` must lie inside a live
/// mapping owned by the caller. After `Access::None` the caller must not
/// touch the range until it is made `ReadWrite` again.
#[cfg(unix)]
pub unsafe fn protect(ptr: *mut u8, len: usize, access: Access) -> Result<()> {
    let prot = match access {
        Access::None => libc::PROT_NONE,
        Access::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
    };

    if libc::mprotect(ptr.cast::<libc::c_void>(), len, prot) != 0 {
        let err = std::io::Error::last_os_error();
        return Err(GcError::ProtectionFailed(format!(
            "mprotect({:p}, {}, {:?}) failed: {}",
            ptr, len, access, err
        )));
    }

    Ok(())
}

/// Change protection of `len` bytes starting at `ptr`
///
/// # Safety
/// Same contract as the unix variant.
#[cfg(windows)]
pub unsafe fn protect(ptr: *mut u8, len: usize, access: Access) -> Result<()> {
    use windows_sys::Win32::System::Memory::{VirtualProtect, PAGE_NOACCESS, PAGE_READWRITE};

    let flags = match access {
        Access::None => PAGE_NOACCESS,
        Access::ReadWrite => PAGE_READWRITE,
    };
    let mut old = 0;

    if VirtualProtect(ptr.cast(), len, flags, &mut old) == 0 {
        let err = std::io::Error::last_os_error();
        return Err(GcError::ProtectionFailed(format!(
            "VirtualProtect({:p}, {}, {:?}) failed: {}",
            ptr, len, access, err
        )));
    }

    Ok(())
}
