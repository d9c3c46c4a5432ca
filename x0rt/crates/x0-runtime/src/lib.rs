//! X0 Runtime Library
//!
//! Provides runtime support for compiled X0 programs:
//! - Heap initialization, allocation and collection (via X0GC)
//! - The root stack used by generated code
//! - Heap release on SIGINT, SIGTERM and SIGSEGV
//! - Integer console I/O

mod gc;
mod io;
#[cfg(unix)]
mod signals;

pub use gc::*;
pub use io::*;
