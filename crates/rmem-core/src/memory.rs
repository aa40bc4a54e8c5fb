//! # Typed Memory Facade
//!
//! [`Memory`] is the user-facing API. It turns typed requests ("read an `i32`
//! at this pointer", "follow these offsets") into raw byte transfers on a
//! [`MemoryOperations`] policy.
//!
//! ## Call Conventions
//!
//! Every operation exists twice:
//!
//! - `read`, `write`, ...: return [`Result`] and propagate with `?`
//! - `read_ec`, `write_ec`, ...: write the outcome into an [`ErrorCode`] slot
//!
//! Both classify failures identically. Contract violations (an address that
//! does not fit, an empty pointer chain, a size larger than the buffer) are
//! returned as errors by the first form and panic in the second.
//!
//! ## Strong Guarantee
//!
//! A failed read never leaves a destination half-written. `read_into` and
//! `read_buffer` stage the bytes in a temporary and copy them over only after
//! the whole transfer succeeded. Configurations with
//! [`Config::STAGED_READS`] off (the `unsafe-reads` feature) skip the staging
//! and give up this guarantee.
//!
//! ## Example
//!
//! ```rust
//! use rmem_core::Memory;
//!
//! let memory = Memory::current();
//! let mut health = 26i32;
//!
//! assert_eq!(memory.read::<i32, _>(&health).unwrap(), 26);
//! memory.write(&mut health as *mut i32, &99i32).unwrap();
//! assert_eq!(memory.read::<i32, _>(&health as *const i32 as usize).unwrap(), 99);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};

use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::chain::{ChainPointer, PointerChain};
use crate::config::{Config, DefaultConfig};
use crate::error::{self, ErrorCode, MemoryError, Result};
use crate::operations::{MemoryOperations, ProcessOperations};
use crate::platform::handle::{AsNativeHandle, ProcessHandle};
use crate::types::plain::{bytes_of, bytes_of_mut, slice_bytes, slice_bytes_mut, uninit_bytes_mut};
use crate::types::{Address, IntoAddress, Plain};

/// Transfers up to this size are staged on the stack.
const INLINE_STAGING: usize = 256;

/// Typed access to the memory of one target process
///
/// `O` is the transfer policy, usually [`ProcessOperations`]. `C` selects the
/// compile-time checks (see [`Config`]).
///
/// The facade holds no mutable state, so a `Memory` can be shared between
/// threads whenever `O` allows it.
pub struct Memory<O, C = DefaultConfig>
{
    ops: O,
    _config: PhantomData<fn() -> C>,
}

impl Memory<ProcessOperations>
{
    /// Facade over the calling process
    pub fn current() -> Self
    {
        Self::new(ProcessOperations::new(ProcessHandle::current()))
    }

    /// Facade over the process with the given pid
    ///
    /// See [`ProcessHandle::open`] for the platform requirements.
    pub fn open(pid: u32) -> Result<Self>
    {
        Ok(Self::new(ProcessOperations::new(ProcessHandle::open(pid)?)))
    }
}

impl<H: AsNativeHandle> Memory<ProcessOperations<H>>
{
    /// Facade over an existing handle
    pub fn from_handle(handle: H) -> Self
    {
        Self::new(ProcessOperations::new(handle))
    }
}

impl<O: MemoryOperations> Memory<O>
{
    /// Facade over `ops` with the feature-driven [`DefaultConfig`]
    pub fn new(ops: O) -> Self
    {
        Self::with_config(ops)
    }
}

impl<O: MemoryOperations, C: Config> Memory<O, C>
{
    /// Facade over `ops` with an explicit configuration
    ///
    /// ```rust
    /// use rmem_core::config::StrictConfig;
    /// use rmem_core::operations::ProcessOperations;
    /// use rmem_core::platform::handle::ProcessHandle;
    /// use rmem_core::Memory;
    ///
    /// let memory = Memory::<_, StrictConfig>::with_config(ProcessOperations::new(ProcessHandle::current()));
    /// assert!(memory.read::<u8, _>(u128::MAX).is_err());
    /// ```
    pub fn with_config(ops: O) -> Self
    {
        Self {
            ops,
            _config: PhantomData,
        }
    }

    /// The transfer policy
    pub fn operations(&self) -> &O
    {
        &self.ops
    }

    /// Unwrap the transfer policy
    pub fn into_operations(self) -> O
    {
        self.ops
    }

    // ---- reads ----

    /// Read a `T` at `address`
    ///
    /// ## Errors
    ///
    /// - [`MemoryError::AddressOverflow`] if `address` does not fit in a `usize`
    /// - [`MemoryError::System`] if the operating system rejected the read
    /// - [`MemoryError::PartialTransfer`] if fewer than `size_of::<T>()` bytes arrived
    pub fn read<T: Plain, A: IntoAddress>(&self, address: A) -> Result<T>
    {
        self.read_at(C::normalize(address)?)
    }

    /// Error-code form of [`read`](Self::read)
    ///
    /// Returns `T::zeroed()` when the read fails.
    ///
    /// # Panics
    ///
    /// Panics if `address` does not fit in a `usize`.
    pub fn read_ec<T: Plain, A: IntoAddress>(&self, address: A, ec: &mut ErrorCode) -> T
    {
        error::report(self.read(address), ec).unwrap_or_else(<T as Plain>::zeroed)
    }

    /// Read `size_of::<T>()` bytes at `address` into `value`
    ///
    /// `value` is untouched when the read fails.
    pub fn read_into<T: Plain, A: IntoAddress>(&self, address: A, value: &mut T) -> Result<()>
    {
        let address = C::normalize(address)?;
        if C::STAGED_READS {
            *value = self.read_at(address)?;
            Ok(())
        } else {
            self.ops.read(address, bytes_of_mut(value))
        }
    }

    /// Error-code form of [`read_into`](Self::read_into)
    ///
    /// # Panics
    ///
    /// Panics if `address` does not fit in a `usize`.
    pub fn read_into_ec<T: Plain, A: IntoAddress>(&self, address: A, value: &mut T, ec: &mut ErrorCode)
    {
        error::report(self.read_into(address, value), ec);
    }

    /// Read `size` bytes at `address` into the front of `buffer`
    ///
    /// `size` is a byte count and may be smaller than `size_of_val(buffer)`;
    /// bytes past it are not touched. The whole buffer is untouched when the
    /// read fails.
    ///
    /// ## Errors
    ///
    /// Returns [`MemoryError::BufferTooSmall`] if `size` exceeds the buffer,
    /// plus everything [`read`](Self::read) can return.
    pub fn read_buffer<T: Plain, A: IntoAddress>(&self, address: A, buffer: &mut [T], size: usize) -> Result<()>
    {
        let available = mem::size_of_val(buffer);
        if size > available {
            return Err(MemoryError::BufferTooSmall {
                requested: size,
                available,
            });
        }

        let address = C::normalize(address)?;
        let target = &mut slice_bytes_mut(buffer)[..size];
        if C::STAGED_READS {
            let mut staging: SmallVec<[u8; INLINE_STAGING]> = smallvec![0; size];
            self.ops.read(address, &mut staging)?;
            target.copy_from_slice(&staging);
            Ok(())
        } else {
            self.ops.read(address, target)
        }
    }

    /// Error-code form of [`read_buffer`](Self::read_buffer)
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the buffer or `address` does not fit in a `usize`.
    pub fn read_buffer_ec<T: Plain, A: IntoAddress>(
        &self,
        address: A,
        buffer: &mut [T],
        size: usize,
        ec: &mut ErrorCode,
    )
    {
        error::report(self.read_buffer(address, buffer, size), ec);
    }

    /// Fill `buffer` with the bytes at `address`
    pub fn read_bytes<A: IntoAddress>(&self, address: A, buffer: &mut [u8]) -> Result<()>
    {
        let size = buffer.len();
        self.read_buffer(address, buffer, size)
    }

    /// Error-code form of [`read_bytes`](Self::read_bytes)
    pub fn read_bytes_ec<A: IntoAddress>(&self, address: A, buffer: &mut [u8], ec: &mut ErrorCode)
    {
        error::report(self.read_bytes(address, buffer), ec);
    }

    // ---- writes ----

    /// Write `value` at `address`
    pub fn write<T: Plain, A: IntoAddress>(&self, address: A, value: &T) -> Result<()>
    {
        let address = C::normalize(address)?;
        self.ops.write(address, bytes_of(value))
    }

    /// Error-code form of [`write`](Self::write)
    ///
    /// # Panics
    ///
    /// Panics if `address` does not fit in a `usize`.
    pub fn write_ec<T: Plain, A: IntoAddress>(&self, address: A, value: &T, ec: &mut ErrorCode)
    {
        error::report(self.write(address, value), ec);
    }

    /// Write the first `size` bytes of `buffer` at `address`
    pub fn write_buffer<T: Plain, A: IntoAddress>(&self, address: A, buffer: &[T], size: usize) -> Result<()>
    {
        let available = mem::size_of_val(buffer);
        if size > available {
            return Err(MemoryError::BufferTooSmall {
                requested: size,
                available,
            });
        }

        let address = C::normalize(address)?;
        self.ops.write(address, &slice_bytes(buffer)[..size])
    }

    /// Error-code form of [`write_buffer`](Self::write_buffer)
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the buffer or `address` does not fit in a `usize`.
    pub fn write_buffer_ec<T: Plain, A: IntoAddress>(&self, address: A, buffer: &[T], size: usize, ec: &mut ErrorCode)
    {
        error::report(self.write_buffer(address, buffer, size), ec);
    }

    /// Write `buffer` at `address`
    pub fn write_bytes<A: IntoAddress>(&self, address: A, buffer: &[u8]) -> Result<()>
    {
        self.write_buffer(address, buffer, buffer.len())
    }

    /// Error-code form of [`write_bytes`](Self::write_bytes)
    pub fn write_bytes_ec<A: IntoAddress>(&self, address: A, buffer: &[u8], ec: &mut ErrorCode)
    {
        error::report(self.write_bytes(address, buffer), ec);
    }

    // ---- pointer chains ----

    /// Follow a chain of pointers starting at `base`
    ///
    /// With offsets `[o1, ..., on]` this computes
    ///
    /// ```text
    /// read::<Ptr>(read::<usize>(... read::<usize>(base) + o1 ...) + o(n-1)) + on
    /// ```
    ///
    /// i.e. every offset but the last is added to a pointer-sized word read
    /// from the target, and the last is added to the final `Ptr` read. Offsets
    /// are applied with wrapping arithmetic.
    ///
    /// ## Errors
    ///
    /// Returns [`MemoryError::EmptyPointerChain`] if `offsets` is empty. Any
    /// failed read aborts the traversal with that read's error.
    pub fn traverse_pointers_chain<Ptr: ChainPointer, A: IntoAddress>(&self, base: A, offsets: &[isize]) -> Result<Ptr>
    {
        self.traverse_pointers_chain_with::<usize, Ptr, A>(base, offsets)
    }

    /// [`traverse_pointers_chain`](Self::traverse_pointers_chain) with
    /// intermediate words of type `W`
    ///
    /// Use `W = u32` to walk the structures of a 32-bit target from a 64-bit
    /// process.
    pub fn traverse_pointers_chain_with<W: ChainPointer, Ptr: ChainPointer, A: IntoAddress>(
        &self,
        base: A,
        offsets: &[isize],
    ) -> Result<Ptr>
    {
        let (last, links) = offsets.split_last().ok_or(MemoryError::EmptyPointerChain)?;

        let mut address = C::normalize(base)?;
        for (step, offset) in links.iter().enumerate() {
            let word: W = self.read_at(address)?;
            address = C::normalize(word.wrapping_offset(*offset))?;
            trace!(step, %address, "pointer chain step");
        }

        let value: Ptr = self.read_at(address)?;
        Ok(value.wrapping_offset(*last))
    }

    /// Error-code form of [`traverse_pointers_chain`](Self::traverse_pointers_chain)
    ///
    /// Returns `Ptr::zeroed()` when a read fails.
    ///
    /// # Panics
    ///
    /// Panics if `offsets` is empty or an address does not fit in a `usize`.
    pub fn traverse_pointers_chain_ec<Ptr: ChainPointer, A: IntoAddress>(
        &self,
        base: A,
        offsets: &[isize],
        ec: &mut ErrorCode,
    ) -> Ptr
    {
        error::report(self.traverse_pointers_chain(base, offsets), ec).unwrap_or_else(<Ptr as Plain>::zeroed)
    }

    /// Resolve a stored [`PointerChain`]
    ///
    /// The chain's base is normalized here, so a base that does not fit in a
    /// `usize` fails with [`MemoryError::AddressOverflow`] under a checked
    /// [`Config`].
    pub fn resolve<Ptr: ChainPointer>(&self, chain: &PointerChain) -> Result<Ptr>
    {
        self.traverse_pointers_chain(chain.base(), chain.offsets())
    }

    /// Error-code form of [`resolve`](Self::resolve)
    pub fn resolve_ec<Ptr: ChainPointer>(&self, chain: &PointerChain, ec: &mut ErrorCode) -> Ptr
    {
        self.traverse_pointers_chain_ec(chain.base(), chain.offsets(), ec)
    }

    /// Read a whole `T`, materializing it only after a complete transfer
    fn read_at<T: Plain>(&self, address: Address) -> Result<T>
    {
        let mut staging = MaybeUninit::<T>::zeroed();
        self.ops.read(address, uninit_bytes_mut(&mut staging))?;
        // SAFETY: the transfer filled all `size_of::<T>()` bytes, and `T: Plain`
        // takes any bit pattern (or the caller vouched for it under `unchecked-types`).
        Ok(unsafe { staging.assume_init() })
    }
}

impl<O: Clone, C> Clone for Memory<O, C>
{
    fn clone(&self) -> Self
    {
        Self {
            ops: self.ops.clone(),
            _config: PhantomData,
        }
    }
}

impl<O: fmt::Debug, C> fmt::Debug for Memory<O, C>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Memory").field("ops", &self.ops).finish_non_exhaustive()
    }
}
