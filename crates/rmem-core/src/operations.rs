//! # Memory Operations Policy
//!
//! The seam between the typed facade and the platform primitive. A
//! [`MemoryOperations`] implementation decides how a raw byte transfer reaches
//! the target process:
//!
//! - [`ProcessOperations`] forwards straight to the native primitive for one
//!   process handle. It does not touch addresses or buffers.
//! - [`BasedOperations`] wraps another policy and makes every address relative
//!   to a fixed base (e.g. a module's load address).
//!
//! Custom implementations are how the facade is driven without a real target,
//! which is what the crate's own tests do.

use std::fmt;

use crate::error::{self, ErrorCode, Result};
use crate::platform;
use crate::platform::handle::{AsNativeHandle, ProcessHandle};
use crate::types::Address;

/// Raw byte transfers against one target
///
/// Implementations must move exactly `buffer.len()` bytes or fail. A short
/// transfer is reported as
/// [`MemoryError::PartialTransfer`](crate::error::MemoryError::PartialTransfer),
/// never as success.
pub trait MemoryOperations
{
    /// Fill `buffer` from `address` in the target
    fn read(&self, address: Address, buffer: &mut [u8]) -> Result<()>;

    /// Copy `buffer` to `address` in the target
    fn write(&self, address: Address, buffer: &[u8]) -> Result<()>;

    /// Error-code form of [`read`](MemoryOperations::read)
    fn read_ec(&self, address: Address, buffer: &mut [u8], ec: &mut ErrorCode)
    {
        error::report(self.read(address, buffer), ec);
    }

    /// Error-code form of [`write`](MemoryOperations::write)
    fn write_ec(&self, address: Address, buffer: &[u8], ec: &mut ErrorCode)
    {
        error::report(self.write(address, buffer), ec);
    }
}

impl<O: MemoryOperations + ?Sized> MemoryOperations for &O
{
    fn read(&self, address: Address, buffer: &mut [u8]) -> Result<()>
    {
        (**self).read(address, buffer)
    }

    fn write(&self, address: Address, buffer: &[u8]) -> Result<()>
    {
        (**self).write(address, buffer)
    }
}

/// Native transfers bound to one process handle
///
/// `H` is anything that yields a native handle: an owned [`ProcessHandle`],
/// a shared `Arc<ProcessHandle>`, or a raw
/// [`NativeHandle`](crate::platform::NativeHandle).
pub struct ProcessOperations<H = ProcessHandle>
{
    handle: H,
}

impl<H: AsNativeHandle> ProcessOperations<H>
{
    /// Bind the platform primitive to `handle`
    pub fn new(handle: H) -> Self
    {
        Self { handle }
    }

    /// The bound handle
    pub fn handle(&self) -> &H
    {
        &self.handle
    }

    /// Unwrap the bound handle
    pub fn into_inner(self) -> H
    {
        self.handle
    }
}

impl<H: AsNativeHandle> MemoryOperations for ProcessOperations<H>
{
    fn read(&self, address: Address, buffer: &mut [u8]) -> Result<()>
    {
        platform::read_memory(self.handle.as_native_handle(), address, buffer)
    }

    fn write(&self, address: Address, buffer: &[u8]) -> Result<()>
    {
        platform::write_memory(self.handle.as_native_handle(), address, buffer)
    }
}

impl<H: fmt::Debug> fmt::Debug for ProcessOperations<H>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ProcessOperations").field("handle", &self.handle).finish()
    }
}

/// Base-relative addressing on top of another policy
///
/// Every address is offset by the base (with wrapping) before it is
/// forwarded, so `read(Address::new(0x10), ..)` touches `base + 0x10`.
///
/// ## Example
///
/// ```rust
/// use rmem_core::operations::{BasedOperations, MemoryOperations, ProcessOperations};
/// use rmem_core::platform::handle::ProcessHandle;
/// use rmem_core::types::Address;
///
/// let values = [10u8, 20, 30, 40];
/// let ops = BasedOperations::new(
///     ProcessOperations::new(ProcessHandle::current()),
///     Address::truncating(values.as_ptr()),
/// );
///
/// let mut byte = [0u8];
/// ops.read(Address::new(2), &mut byte).unwrap();
/// assert_eq!(byte, [30]);
/// ```
#[derive(Debug, Clone)]
pub struct BasedOperations<O>
{
    inner: O,
    base: Address,
}

impl<O: MemoryOperations> BasedOperations<O>
{
    /// Wrap `inner` so that every address is relative to `base`
    pub fn new(inner: O, base: Address) -> Self
    {
        Self { inner, base }
    }

    /// The current base address
    pub fn base_address(&self) -> Address
    {
        self.base
    }

    /// Replace the base address
    pub fn set_base_address(&mut self, base: Address)
    {
        self.base = base;
    }

    /// The wrapped policy
    pub fn inner(&self) -> &O
    {
        &self.inner
    }

    fn rebase(&self, address: Address) -> Address
    {
        self.base + address.value()
    }
}

impl<O: MemoryOperations> MemoryOperations for BasedOperations<O>
{
    fn read(&self, address: Address, buffer: &mut [u8]) -> Result<()>
    {
        self.inner.read(self.rebase(address), buffer)
    }

    fn write(&self, address: Address, buffer: &[u8]) -> Result<()>
    {
        self.inner.write(self.rebase(address), buffer)
    }
}
