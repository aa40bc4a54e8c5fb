//! # macOS Mach API Errors
//!
//! Mach APIs return `kern_return_t` values, which are integer error codes.
//! This module turns the ones a memory transfer can produce into readable
//! messages. The raw code is what travels in
//! [`MemoryError::System`](crate::error::MemoryError::System); `MachError` is
//! only used to render it.

use mach2::kern_return::{
    KERN_FAILURE, KERN_INVALID_ADDRESS, KERN_INVALID_ARGUMENT, KERN_INVALID_NAME, KERN_INVALID_RIGHT,
    KERN_INVALID_TASK, KERN_NO_SPACE, KERN_PROTECTION_FAILURE, KERN_RESOURCE_SHORTAGE, KERN_SUCCESS,
    kern_return_t,
};
use thiserror::Error;

/// Mach kernel API error
///
/// ## References
///
/// - [kern_return.h](https://opensource.apple.com/source/xnu/xnu-7195.81.3/osfmk/mach/kern_return.h)
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachError
{
    /// `KERN_SUCCESS` (0)
    #[error("KERN_SUCCESS: Operation succeeded")]
    Success,

    /// `KERN_INVALID_ADDRESS` (1)
    ///
    /// The address is not mapped in the target task, or the range runs past
    /// the end of a mapping.
    #[error("KERN_INVALID_ADDRESS: Address is not mapped in the target task")]
    InvalidAddress,

    /// `KERN_PROTECTION_FAILURE` (2)
    ///
    /// The mapping exists but its protection forbids the access, e.g. writing
    /// to a read-only page.
    #[error("KERN_PROTECTION_FAILURE: Memory protection forbids the access")]
    ProtectionFailure,

    /// `KERN_NO_SPACE` (3)
    #[error("KERN_NO_SPACE: Address range is not available")]
    NoSpace,

    /// `KERN_INVALID_ARGUMENT` (4)
    #[error("KERN_INVALID_ARGUMENT: Invalid task port or argument")]
    InvalidArgument,

    /// `KERN_FAILURE` (5)
    ///
    /// `task_for_pid()` returns this when the caller lacks the debugging
    /// entitlement, when SIP protects the target, or when the pid does not
    /// exist.
    ///
    /// See: [macOS Debugging Entitlements](https://developer.apple.com/documentation/bundleresources/entitlements/com.apple.security.cs.debugger)
    #[error("KERN_FAILURE: Permission denied or process not found")]
    Failure,

    /// `KERN_RESOURCE_SHORTAGE` (6)
    #[error("KERN_RESOURCE_SHORTAGE: Kernel resources exhausted")]
    ResourceShortage,

    /// `KERN_INVALID_NAME` (15)
    #[error("KERN_INVALID_NAME: Task port name is not valid")]
    InvalidName,

    /// `KERN_INVALID_TASK` (16)
    ///
    /// The task port is dead, usually because the process exited.
    #[error("KERN_INVALID_TASK: Target task is no longer valid")]
    InvalidTask,

    /// `KERN_INVALID_RIGHT` (17)
    #[error("KERN_INVALID_RIGHT: Port right is not valid for this operation")]
    InvalidRight,

    /// Any other `kern_return_t`
    #[error("Unknown Mach error: {0}")]
    Unknown(kern_return_t),
}

impl From<kern_return_t> for MachError
{
    fn from(code: kern_return_t) -> Self
    {
        match code {
            KERN_SUCCESS => MachError::Success,
            KERN_INVALID_ADDRESS => MachError::InvalidAddress,
            KERN_PROTECTION_FAILURE => MachError::ProtectionFailure,
            KERN_NO_SPACE => MachError::NoSpace,
            KERN_INVALID_ARGUMENT => MachError::InvalidArgument,
            KERN_FAILURE => MachError::Failure,
            KERN_RESOURCE_SHORTAGE => MachError::ResourceShortage,
            KERN_INVALID_NAME => MachError::InvalidName,
            KERN_INVALID_TASK => MachError::InvalidTask,
            KERN_INVALID_RIGHT => MachError::InvalidRight,
            _ => MachError::Unknown(code),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_known_codes_map_to_variants()
    {
        assert_eq!(MachError::from(1), MachError::InvalidAddress);
        assert_eq!(MachError::from(2), MachError::ProtectionFailure);
        assert_eq!(MachError::from(5), MachError::Failure);
        assert_eq!(MachError::from(4242), MachError::Unknown(4242));
    }

    #[test]
    fn test_messages_name_the_constant()
    {
        assert!(MachError::InvalidAddress.to_string().starts_with("KERN_INVALID_ADDRESS"));
    }
}
