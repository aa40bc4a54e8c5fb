//! # Linux Memory Operations
//!
//! Cross-process memory access with `process_vm_readv()` / `process_vm_writev()`.
//!
//! Both calls take one local and one remote `iovec` and move the bytes in a
//! single syscall, without stopping the target (unlike `ptrace(PEEKDATA)`).
//! The caller needs `PTRACE_MODE_ATTACH` rights over the target, which usually
//! means same uid plus a permissive `kernel.yama.ptrace_scope`, or
//! `CAP_SYS_PTRACE`.
//!
//! ## Failure Classification
//!
//! - Return value `-1`: the kernel rejected the transfer and `errno` says why
//!   (`EFAULT`, `EPERM`, `ESRCH`, ...).
//! - Return value below the requested size: the range ran into an unmapped
//!   page part way through. Reported as a partial transfer.
//!
//! ## References
//!
//! - [process_vm_readv(2) man page](https://man7.org/linux/man-pages/man2/process_vm_readv.2.html)

use std::io;

use libc::{c_void, iovec, pid_t};

use crate::error::{MemoryError, NativeErrorCode, Result};
use crate::types::Address;

pub type NativeHandle = pid_t;

pub fn read_memory(pid: NativeHandle, address: Address, buffer: &mut [u8]) -> Result<()>
{
    let local = iovec {
        iov_base: buffer.as_mut_ptr().cast::<c_void>(),
        iov_len: buffer.len(),
    };
    let remote = iovec {
        iov_base: address.as_mut_ptr::<c_void>(),
        iov_len: buffer.len(),
    };

    // SAFETY: `local` covers exactly `buffer`, which is valid for writes.
    // The kernel validates `remote` against the target's address space.
    let moved = unsafe { libc::process_vm_readv(pid, &local, 1, &remote, 1, 0) };
    classify("process_vm_readv", moved, buffer.len())
}

pub fn write_memory(pid: NativeHandle, address: Address, buffer: &[u8]) -> Result<()>
{
    let local = iovec {
        iov_base: buffer.as_ptr().cast_mut().cast::<c_void>(),
        iov_len: buffer.len(),
    };
    let remote = iovec {
        iov_base: address.as_mut_ptr::<c_void>(),
        iov_len: buffer.len(),
    };

    // SAFETY: `local` covers exactly `buffer`; the kernel only reads from it.
    let moved = unsafe { libc::process_vm_writev(pid, &local, 1, &remote, 1, 0) };
    classify("process_vm_writev", moved, buffer.len())
}

fn classify(operation: &'static str, moved: isize, requested: usize) -> Result<()>
{
    if moved < 0 {
        return Err(MemoryError::System {
            operation,
            code: last_errno(),
        });
    }

    let transferred = moved as usize;
    if transferred != requested {
        return Err(MemoryError::PartialTransfer {
            operation,
            requested,
            transferred,
        });
    }
    Ok(())
}

fn last_errno() -> NativeErrorCode
{
    io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO)
}

pub fn describe_error(code: NativeErrorCode) -> String
{
    io::Error::from_raw_os_error(code).to_string()
}

pub fn current_process() -> NativeHandle
{
    // SAFETY: getpid() has no preconditions and cannot fail.
    unsafe { libc::getpid() }
}

/// Linux addresses processes by pid, so opening only validates the number.
///
/// Access rights are checked by the kernel on every transfer instead.
pub fn open_process(pid: u32) -> Result<NativeHandle>
{
    match pid_t::try_from(pid) {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(MemoryError::System {
            operation: "open_process",
            code: libc::ESRCH,
        }),
    }
}

pub fn close_process(_pid: NativeHandle) {}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_short_transfer_is_partial()
    {
        let err = classify("process_vm_readv", 4, 8).unwrap_err();
        assert_eq!(
            err,
            MemoryError::PartialTransfer {
                operation: "process_vm_readv",
                requested: 8,
                transferred: 4,
            }
        );
    }

    #[test]
    fn test_open_rejects_invalid_pids()
    {
        assert!(open_process(0).is_err());
        assert!(open_process(u32::MAX).is_err());
        assert_eq!(open_process(1).unwrap(), 1);
    }

    #[test]
    fn test_describe_errno()
    {
        assert!(!describe_error(libc::EFAULT).is_empty());
    }
}
