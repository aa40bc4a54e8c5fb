//! Byte-blob value types.

use std::mem::{self, MaybeUninit};
use std::slice;

/// A type that can be moved between processes as raw bytes
///
/// The facade never runs constructors or destructors for values it reads or
/// writes. It copies `size_of::<T>()` bytes and reinterprets them, so `T` must
/// accept every bit pattern and must not contain padding.
///
/// By default this is exactly the set of types implementing
/// [`bytemuck::AnyBitPattern`] and [`bytemuck::NoUninit`]: the primitive
/// integers and floats, arrays of them, and structs that derive
/// `bytemuck::Pod`. The check happens at compile time:
///
#[cfg_attr(not(feature = "unchecked-types"), doc = "```compile_fail")]
#[cfg_attr(feature = "unchecked-types", doc = "```ignore")]
/// use rmem_core::Memory;
///
/// let memory = Memory::current();
/// let flag = true;
/// // `bool` does not accept every bit pattern
/// let _ = memory.read::<bool, _>(&flag);
/// ```
///
/// With the `unchecked-types` cargo feature enabled, every `Copy + 'static`
/// type is accepted. Reading a type with validity invariants (`bool`, enums,
/// references) is then undefined behavior if the remote bytes violate them,
/// and the caller carries that risk.
///
/// # Safety
///
/// Implementors must be valid for any bit pattern, including all zeroes, and
/// must not contain uninitialized (padding) bytes.
pub unsafe trait Plain: sealed::Bytes
{
    /// The value-initialized (all zero) instance
    ///
    /// Only used for the fallback value of failed error-code reads. Under
    /// `unchecked-types` it panics for types that reject all zeroes.
    fn zeroed() -> Self
    {
        // SAFETY: implementors are valid for the all-zero bit pattern.
        unsafe { mem::zeroed() }
    }
}

mod sealed
{
    #[cfg(not(feature = "unchecked-types"))]
    pub trait Bytes: bytemuck::AnyBitPattern + bytemuck::NoUninit {}

    #[cfg(not(feature = "unchecked-types"))]
    impl<T: bytemuck::AnyBitPattern + bytemuck::NoUninit> Bytes for T {}

    #[cfg(feature = "unchecked-types")]
    pub trait Bytes: Copy + 'static {}

    #[cfg(feature = "unchecked-types")]
    impl<T: Copy + 'static> Bytes for T {}
}

// SAFETY: `sealed::Bytes` is `AnyBitPattern + NoUninit` by default; under
// `unchecked-types` the obligation moves to the caller.
unsafe impl<T: sealed::Bytes> Plain for T {}

/// View a value as its bytes.
#[cfg(not(feature = "unchecked-types"))]
pub(crate) fn bytes_of<T: Plain>(value: &T) -> &[u8]
{
    bytemuck::bytes_of(value)
}

/// View a value as mutable bytes.
#[cfg(not(feature = "unchecked-types"))]
pub(crate) fn bytes_of_mut<T: Plain>(value: &mut T) -> &mut [u8]
{
    bytemuck::bytes_of_mut(value)
}

/// View a slice of values as its bytes.
#[cfg(not(feature = "unchecked-types"))]
pub(crate) fn slice_bytes<T: Plain>(values: &[T]) -> &[u8]
{
    bytemuck::cast_slice(values)
}

/// View a slice of values as mutable bytes.
#[cfg(not(feature = "unchecked-types"))]
pub(crate) fn slice_bytes_mut<T: Plain>(values: &mut [T]) -> &mut [u8]
{
    bytemuck::cast_slice_mut(values)
}

#[cfg(feature = "unchecked-types")]
pub(crate) fn bytes_of<T: Plain>(value: &T) -> &[u8]
{
    // SAFETY: the caller vouched that `T` has no padding.
    unsafe { slice::from_raw_parts((value as *const T).cast::<u8>(), mem::size_of::<T>()) }
}

#[cfg(feature = "unchecked-types")]
pub(crate) fn bytes_of_mut<T: Plain>(value: &mut T) -> &mut [u8]
{
    // SAFETY: the caller vouched that `T` accepts the bytes written through the slice.
    unsafe { slice::from_raw_parts_mut((value as *mut T).cast::<u8>(), mem::size_of::<T>()) }
}

#[cfg(feature = "unchecked-types")]
pub(crate) fn slice_bytes<T: Plain>(values: &[T]) -> &[u8]
{
    // SAFETY: as in `bytes_of`, for `values.len()` contiguous elements.
    unsafe { slice::from_raw_parts(values.as_ptr().cast::<u8>(), mem::size_of_val(values)) }
}

#[cfg(feature = "unchecked-types")]
pub(crate) fn slice_bytes_mut<T: Plain>(values: &mut [T]) -> &mut [u8]
{
    // SAFETY: as in `bytes_of_mut`, for `values.len()` contiguous elements.
    unsafe { slice::from_raw_parts_mut(values.as_mut_ptr().cast::<u8>(), mem::size_of_val(values)) }
}

/// View zero-filled staging storage as mutable bytes.
///
/// Only sound for storage created with [`MaybeUninit::zeroed`]: every byte,
/// padding included, must already be initialized.
pub(crate) fn uninit_bytes_mut<T: Plain>(staging: &mut MaybeUninit<T>) -> &mut [u8]
{
    // SAFETY: the storage is zero-filled, and no `T` is observed until the
    // caller decides the bytes form a valid value.
    unsafe { slice::from_raw_parts_mut(staging.as_mut_ptr().cast::<u8>(), mem::size_of::<T>()) }
}
