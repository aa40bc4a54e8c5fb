//! # Windows Memory Operations
//!
//! Cross-process memory access with `ReadProcessMemory()` / `WriteProcessMemory()`.
//!
//! The process handle must carry `PROCESS_VM_READ` for reads and
//! `PROCESS_VM_WRITE | PROCESS_VM_OPERATION` for writes.
//!
//! ## Failure Classification
//!
//! - `FALSE` with `ERROR_PARTIAL_COPY` (299): part of the range was not
//!   accessible. Reported as a partial transfer with the byte count the call
//!   returned.
//! - `FALSE` with any other code: reported as a system failure carrying
//!   `GetLastError()`.
//! - `TRUE` with fewer bytes than requested: also a partial transfer.
//!
//! ## References
//!
//! - [ReadProcessMemory](https://learn.microsoft.com/en-us/windows/win32/api/memoryapi/nf-memoryapi-readprocessmemory)
//! - [WriteProcessMemory](https://learn.microsoft.com/en-us/windows/win32/api/memoryapi/nf-memoryapi-writeprocessmemory)

use std::ffi::c_void;
use std::io;

use tracing::debug;
use windows_sys::Win32::Foundation::{CloseHandle, ERROR_PARTIAL_COPY, GetLastError, HANDLE};
use windows_sys::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
use windows_sys::Win32::System::Threading::{
    GetCurrentProcess, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION, PROCESS_VM_READ,
    PROCESS_VM_WRITE,
};

use crate::error::{MemoryError, NativeErrorCode, Result};
use crate::types::Address;

pub type NativeHandle = HANDLE;

pub fn read_memory(process: NativeHandle, address: Address, buffer: &mut [u8]) -> Result<()>
{
    let mut moved = 0usize;
    // SAFETY: `buffer` is valid for `buffer.len()` bytes of writes and
    // `moved` outlives the call.
    let ok = unsafe {
        ReadProcessMemory(
            process,
            address.as_ptr::<c_void>(),
            buffer.as_mut_ptr().cast::<c_void>(),
            buffer.len(),
            &mut moved,
        )
    };
    classify("ReadProcessMemory", ok != 0, moved, buffer.len())
}

pub fn write_memory(process: NativeHandle, address: Address, buffer: &[u8]) -> Result<()>
{
    let mut moved = 0usize;
    // SAFETY: `buffer` is valid for `buffer.len()` bytes of reads.
    let ok = unsafe {
        WriteProcessMemory(
            process,
            address.as_ptr::<c_void>(),
            buffer.as_ptr().cast::<c_void>(),
            buffer.len(),
            &mut moved,
        )
    };
    classify("WriteProcessMemory", ok != 0, moved, buffer.len())
}

fn classify(operation: &'static str, ok: bool, transferred: usize, requested: usize) -> Result<()>
{
    if !ok {
        // SAFETY: reads the calling thread's last-error value.
        let code = unsafe { GetLastError() };
        if code != ERROR_PARTIAL_COPY {
            return Err(MemoryError::System {
                operation,
                code: code as NativeErrorCode,
            });
        }
    }

    if !ok || transferred != requested {
        return Err(MemoryError::PartialTransfer {
            operation,
            requested,
            transferred,
        });
    }
    Ok(())
}

pub fn describe_error(code: NativeErrorCode) -> String
{
    io::Error::from_raw_os_error(code).to_string()
}

/// Pseudo-handle for the calling process; never needs closing.
pub fn current_process() -> NativeHandle
{
    // SAFETY: GetCurrentProcess() has no preconditions.
    unsafe { GetCurrentProcess() }
}

pub fn open_process(pid: u32) -> Result<NativeHandle>
{
    let access = PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION | PROCESS_QUERY_INFORMATION;
    // SAFETY: plain FFI call; a null return is handled below.
    let handle = unsafe { OpenProcess(access, 0, pid) };
    if handle.is_null() {
        // SAFETY: reads the calling thread's last-error value.
        let code = unsafe { GetLastError() };
        return Err(MemoryError::System {
            operation: "OpenProcess",
            code: code as NativeErrorCode,
        });
    }
    Ok(handle)
}

pub fn close_process(process: NativeHandle)
{
    // SAFETY: only called for handles returned by `open_process`.
    if unsafe { CloseHandle(process) } == 0 {
        // SAFETY: reads the calling thread's last-error value.
        let code = unsafe { GetLastError() };
        debug!(code, "CloseHandle failed");
    }
}
