//! # Platform-Specific Implementations
//!
//! This module contains the native transfer primitive for each supported
//! operating system. Exactly one backend is compiled in, selected with
//! `#[cfg(target_os)]`:
//!
//! - **Linux / Android**: `process_vm_readv()` / `process_vm_writev()` on a pid
//!   - See: [process_vm_readv(2) man page](https://man7.org/linux/man-pages/man2/process_vm_readv.2.html)
//! - **macOS / iOS**: `mach_vm_read_overwrite()` / `mach_vm_write()` on a Mach task port
//!   - See: [Apple Mach Kernel Programming](https://developer.apple.com/library/archive/documentation/Darwin/Conceptual/KernelProgramming/Mach/Mach.html)
//! - **Windows**: `ReadProcessMemory()` / `WriteProcessMemory()` on a process `HANDLE`
//!   - See: [ReadProcessMemory](https://learn.microsoft.com/en-us/windows/win32/api/memoryapi/nf-memoryapi-readprocessmemory)
//!
//! Every backend exposes the same surface (`read_memory`, `write_memory`,
//! `describe_error`, plus handle acquisition). The functions in this module
//! wrap it with the shared rules:
//!
//! - A zero-length transfer succeeds without a system call.
//! - Exactly `buffer.len()` bytes move on success. Anything less is a
//!   [`MemoryError::PartialTransfer`](crate::error::MemoryError::PartialTransfer).
//! - Nothing is retried.

use tracing::trace;

use crate::error::{self, ErrorCode, NativeErrorCode, Result};
use crate::types::Address;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "android"))]
use linux as native;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub mod macos;
#[cfg(any(target_os = "macos", target_os = "ios"))]
use macos as native;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as native;

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    windows
)))]
compile_error!("rmem-core supports Linux, Android, macOS, iOS and Windows only");

pub mod handle;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use macos::MachError;

/// The operating system's process handle type
///
/// - **Linux**: `pid_t`
/// - **Windows**: `HANDLE`
/// - **macOS**: `mach_port_t` (task port)
pub type NativeHandle = native::NativeHandle;

/// Read `buffer.len()` bytes at `address` in the process behind `handle`
pub fn read_memory(handle: NativeHandle, address: Address, buffer: &mut [u8]) -> Result<()>
{
    if buffer.is_empty() {
        return Ok(());
    }
    trace!(%address, size = buffer.len(), "read_memory");
    native::read_memory(handle, address, buffer)
}

/// Error-code form of [`read_memory`]
pub fn read_memory_ec(handle: NativeHandle, address: Address, buffer: &mut [u8], ec: &mut ErrorCode)
{
    error::report(read_memory(handle, address, buffer), ec);
}

/// Write `buffer` at `address` in the process behind `handle`
pub fn write_memory(handle: NativeHandle, address: Address, buffer: &[u8]) -> Result<()>
{
    if buffer.is_empty() {
        return Ok(());
    }
    trace!(%address, size = buffer.len(), "write_memory");
    native::write_memory(handle, address, buffer)
}

/// Error-code form of [`write_memory`]
pub fn write_memory_ec(handle: NativeHandle, address: Address, buffer: &[u8], ec: &mut ErrorCode)
{
    error::report(write_memory(handle, address, buffer), ec);
}

/// Human-readable message for a native error code.
pub(crate) fn describe_error(code: NativeErrorCode) -> String
{
    native::describe_error(code)
}
