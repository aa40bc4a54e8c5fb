//! # Error Types
//!
//! Error handling for remote memory operations.
//!
//! Every operation in this crate comes in two call conventions:
//!
//! - **Result-returning** (`read`, `write`, ...): failures are returned as a
//!   [`MemoryError`] and propagate with `?`.
//! - **Error-code** (`read_ec`, `write_ec`, ...): failures are written into a
//!   caller-supplied [`ErrorCode`] slot and the call returns normally.
//!
//! Both conventions share a single classification, so a given failure always
//! maps to the same [`ErrorCode`] regardless of which form was called.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use std::fmt;

use thiserror::Error;

/// Raw error code reported by the operating system
///
/// - **Linux**: `errno` after `process_vm_readv()` / `process_vm_writev()`
/// - **Windows**: `GetLastError()` after `ReadProcessMemory()` / `WriteProcessMemory()`
/// - **macOS**: the `kern_return_t` returned by the Mach call
pub type NativeErrorCode = i32;

/// Main error type for memory operations
///
/// ## Error Categories
///
/// 1. **Environmental failures**: `System`, `PartialTransfer`. These depend on
///    the state of the target process and are reported through both call
///    conventions.
/// 2. **Contract violations**: `AddressOverflow`, `EmptyPointerChain`,
///    `BufferTooSmall`. These are programming errors. The Result-returning
///    forms return them like any other error, but the error-code forms panic
///    instead of writing them into an [`ErrorCode`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError
{
    /// The operating system rejected the transfer
    ///
    /// Common causes:
    /// - The address is not mapped in the target process
    /// - Insufficient permissions (`EPERM`, `ERROR_ACCESS_DENIED`, `KERN_PROTECTION_FAILURE`)
    /// - The process handle is invalid or the process has exited
    #[error("{operation} failed: {}", describe(.code))]
    System
    {
        /// Name of the native call that failed
        operation: &'static str,
        /// Native error code (see [`NativeErrorCode`])
        code: NativeErrorCode,
    },

    /// The transfer moved fewer bytes than requested
    ///
    /// This happens when the requested range starts in mapped memory but runs
    /// into an unmapped or protected page. It is never treated as success.
    #[error("{operation} transferred {transferred} of {requested} bytes")]
    PartialTransfer
    {
        /// Name of the native call that came up short
        operation: &'static str,
        /// Number of bytes the caller asked for
        requested: usize,
        /// Number of bytes actually moved (may be unknown and reported as 0)
        transferred: usize,
    },

    /// An address input does not fit in the platform's pointer width
    ///
    /// `value` is the input's bit pattern read as an unsigned integer.
    #[error("address 0x{value:x} does not fit in a {width}-bit address")]
    AddressOverflow
    {
        /// The rejected input
        value: u128,
        /// Width of the canonical address type in bits
        width: u32,
    },

    /// A pointer chain was traversed without any offsets
    #[error("pointer chain needs at least one offset")]
    EmptyPointerChain,

    /// An explicit transfer size exceeds the local buffer
    #[error("buffer holds {available} bytes but {requested} were requested")]
    BufferTooSmall
    {
        /// Number of bytes the caller asked to transfer
        requested: usize,
        /// Size of the local buffer in bytes
        available: usize,
    },
}

impl MemoryError
{
    /// Classification of this error for the error-code convention
    ///
    /// Returns `None` for contract violations, which never reach an
    /// [`ErrorCode`] slot.
    pub fn error_code(&self) -> Option<ErrorCode>
    {
        match self {
            MemoryError::System { code, .. } => Some(ErrorCode::System(*code)),
            MemoryError::PartialTransfer { .. } => Some(ErrorCode::OutOfRange),
            MemoryError::AddressOverflow { .. } | MemoryError::EmptyPointerChain | MemoryError::BufferTooSmall { .. } => {
                None
            }
        }
    }

    /// Returns `true` for programming errors (see [`MemoryError`] categories).
    pub fn is_contract_violation(&self) -> bool
    {
        self.error_code().is_none()
    }
}

/// Convenience type alias for `Result<T, MemoryError>`
///
/// ```rust
/// use rmem_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Outcome slot for the error-code call convention
///
/// The `_ec` methods overwrite the slot on every call: `Success` when the
/// transfer completed, otherwise the failure's classification.
///
/// ## Example
///
/// ```rust
/// use rmem_core::{ErrorCode, Memory};
///
/// let memory = Memory::current();
/// let value = 26i32;
/// let mut ec = ErrorCode::default();
///
/// let read = memory.read_ec::<i32, _>(&value as *const i32, &mut ec);
/// assert!(ec.is_success());
/// assert_eq!(read, 26);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode
{
    /// The last operation completed
    #[default]
    Success,
    /// The operating system rejected the last operation
    System(NativeErrorCode),
    /// The last operation moved fewer bytes than requested
    OutOfRange,
}

impl ErrorCode
{
    /// `true` if the last operation completed
    pub const fn is_success(self) -> bool
    {
        matches!(self, ErrorCode::Success)
    }

    /// `true` if the last operation failed
    pub const fn is_failure(self) -> bool
    {
        !self.is_success()
    }

    /// Native error code, if the operating system reported one
    pub const fn native_code(self) -> Option<NativeErrorCode>
    {
        match self {
            ErrorCode::System(code) => Some(code),
            _ => None,
        }
    }

    /// Reset the slot to `Success`.
    pub fn clear(&mut self)
    {
        *self = ErrorCode::Success;
    }
}

impl fmt::Display for ErrorCode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ErrorCode::Success => f.write_str("success"),
            ErrorCode::System(code) => f.write_str(&crate::platform::describe_error(*code)),
            ErrorCode::OutOfRange => f.write_str("result out of range"),
        }
    }
}

fn describe(code: &NativeErrorCode) -> String
{
    crate::platform::describe_error(*code)
}

/// Route a classified result into the error-code convention.
///
/// On success the slot is cleared and the value returned. Environmental
/// failures are written into the slot and `None` is returned.
///
/// # Panics
///
/// Panics on contract violations, which are never written into the slot.
pub(crate) fn report<T>(result: Result<T>, ec: &mut ErrorCode) -> Option<T>
{
    match result {
        Ok(value) => {
            ec.clear();
            Some(value)
        }
        Err(error) => match error.error_code() {
            Some(code) => {
                *ec = code;
                None
            }
            None => panic!("{error}"),
        },
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_report_clears_previous_failure()
    {
        let mut ec = ErrorCode::OutOfRange;
        assert_eq!(report(Ok(5u8), &mut ec), Some(5));
        assert_eq!(ec, ErrorCode::Success);
    }

    #[test]
    fn test_report_writes_classification()
    {
        let mut ec = ErrorCode::Success;
        let result: Result<()> = Err(MemoryError::System {
            operation: "test",
            code: 3,
        });
        assert_eq!(report(result, &mut ec), None);
        assert_eq!(ec, ErrorCode::System(3));
    }

    #[test]
    #[should_panic(expected = "at least one offset")]
    fn test_report_panics_on_contract_violation()
    {
        let mut ec = ErrorCode::Success;
        let _ = report::<()>(Err(MemoryError::EmptyPointerChain), &mut ec);
    }
}
