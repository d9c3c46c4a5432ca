//! Signal Cleanup - release the heap when the process is interrupted
//!
//! Handlers for the termination signals (SIGHUP, SIGINT, SIGQUIT, SIGTERM)
//! and the fault signals (SIGSEGV, SIGBUS, SIGFPE) only write the signal
//! number into a pipe. A watcher thread reads it, releases the runtime
//! through the normal lock and exits with the signal number as status.
//!
//! A fault handler cannot return (the faulting instruction would repeat),
//! so the faulting thread is parked until the watcher ends the process.
//!
//! Handlers run with `SA_ONSTACK`. Threads started by std already have an
//! alternate signal stack; the thread that installs the handlers gets one
//! if it has none. A stack overflow on such a thread therefore reaches the
//! watcher and exits with SIGSEGV's number, in place of std's overflow
//! message. Foreign threads without an alternate stack handle the signal on
//! their own stack, where a guard-page overflow cannot be reported.

use std::io;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Once;

const TERMINATION_SIGNALS: [libc::c_int; 4] =
    [libc::SIGHUP, libc::SIGINT, libc::SIGQUIT, libc::SIGTERM];
const FAULT_SIGNALS: [libc::c_int; 3] = [libc::SIGSEGV, libc::SIGBUS, libc::SIGFPE];

/// Alternate stack size for the installing thread
const ALT_STACK_SIZE: usize = 64 * 1024;

/// Write end of the pipe, -1 until installed
static WRITE_FD: AtomicI32 = AtomicI32::new(-1);
static INSTALL: Once = Once::new();

/// Install the handlers and start the watcher (once per process)
pub(crate) fn install() -> io::Result<()> {
    let mut result = Ok(());
    INSTALL.call_once(|| result = install_bridge());
    result
}

fn install_bridge() -> io::Result<()> {
    let mut fds: [libc::c_int; 2] = [-1; 2];
    // SAFETY: `fds` has room for the two descriptors pipe(2) writes.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let [read_fd, write_fd] = fds;

    // A full pipe must never block a handler.
    // SAFETY: `write_fd` was just returned by pipe(2).
    if unsafe { libc::fcntl(write_fd, libc::F_SETFL, libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    WRITE_FD.store(write_fd, Ordering::SeqCst);

    ensure_alt_stack()?;

    std::thread::Builder::new()
        .name("x0-signal-watch".to_string())
        .spawn(move || watch(read_fd))?;

    let handler: extern "C" fn(libc::c_int) = forward;
    for signo in TERMINATION_SIGNALS.into_iter().chain(FAULT_SIGNALS) {
        // SAFETY: a zeroed sigaction is a valid starting point; the fields
        // used are set below.
        let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART | libc::SA_ONSTACK;
        // SAFETY: `action` is a live, exclusively borrowed sigaction.
        let installed = unsafe {
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(signo, &action, std::ptr::null_mut())
        };
        if installed != 0 {
            return Err(io::Error::last_os_error());
        }
    }

    log::debug!(
        "signal cleanup installed for {:?} and {:?}",
        TERMINATION_SIGNALS,
        FAULT_SIGNALS
    );
    Ok(())
}

/// Give the calling thread an alternate signal stack if it has none
fn ensure_alt_stack() -> io::Result<()> {
    // SAFETY: a zeroed stack_t is valid output storage for sigaltstack(2).
    let mut current: libc::stack_t = unsafe { std::mem::zeroed() };
    // SAFETY: querying only; `current` is a live local.
    if unsafe { libc::sigaltstack(std::ptr::null(), &mut current) } != 0 {
        return Err(io::Error::last_os_error());
    }
    if current.ss_flags & libc::SS_DISABLE == 0 {
        return Ok(());
    }

    // Installed once per process and never freed.
    let stack: &'static mut [u8] = Box::leak(vec![0u8; ALT_STACK_SIZE].into_boxed_slice());
    let alt = libc::stack_t {
        ss_sp: stack.as_mut_ptr().cast(),
        ss_flags: 0,
        ss_size: stack.len(),
    };
    // SAFETY: `alt` describes a leaked buffer that outlives the thread.
    if unsafe { libc::sigaltstack(&alt, std::ptr::null_mut()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Async-signal-safe handler: forward the signal number to the watcher
extern "C" fn forward(signo: libc::c_int) {
    let fd = WRITE_FD.load(Ordering::Relaxed);
    if fd >= 0 {
        let byte = signo as u8;
        // SAFETY: write(2) is async-signal-safe; `byte` outlives the call.
        unsafe {
            libc::write(fd, (&byte as *const u8).cast(), 1);
        }
    }

    if FAULT_SIGNALS.contains(&signo) {
        loop {
            // SAFETY: pause(2) is async-signal-safe.
            unsafe {
                libc::pause();
            }
        }
    }
}

fn watch(read_fd: RawFd) {
    let mut byte = 0u8;
    loop {
        // SAFETY: reading one byte into a live local.
        let n = unsafe { libc::read(read_fd, (&mut byte as *mut u8).cast(), 1) };
        if n == 1 {
            break;
        }
        let err = io::Error::last_os_error();
        if n < 0 && err.kind() == io::ErrorKind::Interrupted {
            continue;
        }
        log::error!("signal watcher stopped: {}", err);
        return;
    }

    let signo = i32::from(byte);
    log::warn!("received signal {}, releasing the heap", signo);
    crate::gc::release_for_signal();
    std::process::exit(signo);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alt_stack_present_after_ensure() {
        ensure_alt_stack().unwrap();

        // SAFETY: query into a zeroed local.
        let mut current: libc::stack_t = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { libc::sigaltstack(std::ptr::null(), &mut current) }, 0);
        assert_eq!(current.ss_flags & libc::SS_DISABLE, 0);
        assert!(current.ss_size > 0);
    }
}
