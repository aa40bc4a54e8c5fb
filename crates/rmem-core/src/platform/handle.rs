//! # Process Handles
//!
//! A [`ProcessHandle`] is the capability that grants memory access to a target
//! process. It wraps the platform's [`NativeHandle`] and remembers whether this
//! crate acquired it:
//!
//! - [`ProcessHandle::current`]: the calling process (never released)
//! - [`ProcessHandle::open`]: another process by pid (released on drop)
//! - [`ProcessHandle::from_raw`]: a handle the caller already owns (never released)
//!
//! Anything that can yield a native handle implements [`AsNativeHandle`], which
//! is what [`ProcessOperations`](crate::operations::ProcessOperations) is
//! generic over.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use super::{NativeHandle, native};
use crate::error::Result;

/// Access to a platform process handle
pub trait AsNativeHandle
{
    /// The raw handle, valid for as long as `self` is alive
    fn as_native_handle(&self) -> NativeHandle;
}

impl AsNativeHandle for NativeHandle
{
    fn as_native_handle(&self) -> NativeHandle
    {
        *self
    }
}

impl<T: AsNativeHandle + ?Sized> AsNativeHandle for &T
{
    fn as_native_handle(&self) -> NativeHandle
    {
        (**self).as_native_handle()
    }
}

impl<T: AsNativeHandle + ?Sized> AsNativeHandle for Arc<T>
{
    fn as_native_handle(&self) -> NativeHandle
    {
        (**self).as_native_handle()
    }
}

impl<T: AsNativeHandle + ?Sized> AsNativeHandle for Rc<T>
{
    fn as_native_handle(&self) -> NativeHandle
    {
        (**self).as_native_handle()
    }
}

/// A process handle, released on drop when owned
///
/// ## Example
///
/// ```rust
/// use rmem_core::platform::handle::ProcessHandle;
///
/// let handle = ProcessHandle::current();
/// assert!(!handle.is_owned());
/// ```
pub struct ProcessHandle
{
    raw: NativeHandle,
    owned: bool,
}

impl ProcessHandle
{
    /// Handle to the calling process
    pub fn current() -> Self
    {
        Self {
            raw: native::current_process(),
            owned: false,
        }
    }

    /// Open the process with the given pid for memory access
    ///
    /// - **Linux**: validates the pid; access is checked per transfer
    /// - **macOS**: `task_for_pid()`
    /// - **Windows**: `OpenProcess()` with `PROCESS_VM_READ | PROCESS_VM_WRITE |
    ///   PROCESS_VM_OPERATION | PROCESS_QUERY_INFORMATION`
    ///
    /// ## Errors
    ///
    /// Returns [`MemoryError::System`](crate::error::MemoryError::System) when
    /// the process does not exist or the caller lacks the rights to open it.
    pub fn open(pid: u32) -> Result<Self>
    {
        let raw = native::open_process(pid)?;
        debug!(pid, "opened process handle");
        Ok(Self { raw, owned: true })
    }

    /// Wrap a handle the caller owns; it is not released on drop.
    ///
    /// An invalid or stale handle is not detected here. Transfers through it
    /// fail with the operating system's error instead.
    pub fn from_raw(raw: NativeHandle) -> Self
    {
        Self { raw, owned: false }
    }

    /// The wrapped native handle
    pub fn raw(&self) -> NativeHandle
    {
        self.raw
    }

    /// `true` if dropping this value releases the native handle
    pub fn is_owned(&self) -> bool
    {
        self.owned
    }
}

impl AsNativeHandle for ProcessHandle
{
    fn as_native_handle(&self) -> NativeHandle
    {
        self.raw
    }
}

impl Drop for ProcessHandle
{
    fn drop(&mut self)
    {
        if self.owned {
            debug!("releasing process handle");
            native::close_process(self.raw);
        }
    }
}

impl fmt::Debug for ProcessHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ProcessHandle")
            .field("raw", &self.raw)
            .field("owned", &self.owned)
            .finish()
    }
}

// SAFETY: a Windows process HANDLE is a kernel object reference that may be
// used from any thread; the raw pointer type only hides that.
#[cfg(windows)]
unsafe impl Send for ProcessHandle {}

// SAFETY: see `Send`; the handle is never mutated after construction.
#[cfg(windows)]
unsafe impl Sync for ProcessHandle {}
