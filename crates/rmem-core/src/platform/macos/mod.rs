//! # macOS / iOS Backend
//!
//! Mach-based memory access. A process is addressed through its **task port**,
//! a Mach port right that grants control over the process's address space:
//!
//! - `mach_task_self()`: the caller's own task port (always available)
//! - `task_for_pid()`: another process's task port (needs root or the
//!   `com.apple.security.cs.debugger` entitlement, and SIP must allow it)
//!
//! Ports obtained from `task_for_pid()` are send rights in our IPC space and
//! are released with `mach_port_deallocate()`.
//!
//! ## References
//!
//! - [Apple Mach Kernel Programming](https://developer.apple.com/library/archive/documentation/Darwin/Conceptual/KernelProgramming/Mach/Mach.html)
//! - [task_for_pid(3) man page](https://developer.apple.com/library/archive/documentation/Darwin/Reference/ManPages/man3/task_for_pid.3.html)

pub mod error;
mod memory;

use libc::c_int;
use mach2::kern_return::KERN_SUCCESS;
use mach2::mach_port::mach_port_deallocate;
use mach2::port::{MACH_PORT_NULL, mach_port_t};
use mach2::traps::{mach_task_self, task_for_pid};
use tracing::debug;

pub use error::MachError;
pub use memory::{read_memory, write_memory};

use crate::error::{MemoryError, NativeErrorCode, Result};

pub type NativeHandle = mach_port_t;

pub fn describe_error(code: NativeErrorCode) -> String
{
    MachError::from(code).to_string()
}

pub fn current_process() -> NativeHandle
{
    // SAFETY: mach_task_self() has no preconditions.
    unsafe { mach_task_self() }
}

pub fn open_process(pid: u32) -> Result<NativeHandle>
{
    let pid = c_int::try_from(pid).map_err(|_| MemoryError::System {
        operation: "task_for_pid",
        code: mach2::kern_return::KERN_INVALID_ARGUMENT,
    })?;

    let mut task: mach_port_t = MACH_PORT_NULL;
    // SAFETY: `task` outlives the call and receives the port name.
    let kr = unsafe { task_for_pid(mach_task_self(), pid, &mut task) };
    if kr != KERN_SUCCESS {
        return Err(MemoryError::System {
            operation: "task_for_pid",
            code: kr,
        });
    }
    Ok(task)
}

pub fn close_process(task: NativeHandle)
{
    // SAFETY: `task` is a send right obtained from `task_for_pid()`.
    let kr = unsafe { mach_port_deallocate(mach_task_self(), task) };
    if kr != KERN_SUCCESS {
        debug!(error = %MachError::from(kr), "mach_port_deallocate failed");
    }
}
