//! Canonical address type and address normalization.

use std::fmt;
use std::mem;
use std::ops::{Add, Sub};
use std::ptr::NonNull;

use crate::error::{MemoryError, Result};

/// Strongly typed address in the target process
///
/// This wrapper around `usize` is the canonical address representation used by
/// every layer of the crate. Whatever the caller passes in (an integer of any
/// width, a raw pointer, a reference) is normalized into an `Address` through
/// [`IntoAddress`] before it reaches a platform primitive.
///
/// ## Why `usize`?
///
/// The native transfer primitives all take pointer-width addresses
/// (`process_vm_readv` iovecs, `ReadProcessMemory` base pointers). Mach takes a
/// 64-bit `mach_vm_address_t`, which a `usize` always fits into on supported
/// targets.
///
/// ## Example
///
/// ```rust
/// use rmem_core::types::Address;
///
/// let addr = Address::from(0x1000usize);
/// let next_addr = addr + 0x100; // Add offset
/// assert_eq!(next_addr.value(), 0x1100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(usize);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Width of the canonical address type in bits
    pub const BITS: u32 = usize::BITS;

    /// Create a new address from a `usize` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: usize) -> Self
    {
        Address(value)
    }

    /// Get the raw `usize` value of this address
    pub const fn value(self) -> usize
    {
        self.0
    }

    /// Normalize any address-like input, failing if it does not fit
    ///
    /// Inputs no wider than `usize` always succeed (signed inputs are
    /// sign-extended, as with `as`). Wider inputs fail with
    /// [`MemoryError::AddressOverflow`] when their unsigned bit pattern exceeds
    /// `usize::MAX`.
    ///
    /// ```rust
    /// use rmem_core::types::Address;
    ///
    /// assert_eq!(Address::checked(0x1000u16).unwrap().value(), 0x1000);
    /// assert!(Address::checked(u128::MAX).is_err());
    /// ```
    pub fn checked<A: IntoAddress>(input: A) -> Result<Self>
    {
        if A::WIDTH > mem::size_of::<usize>() {
            let bits = input.to_bits();
            if bits > usize::MAX as u128 {
                return Err(MemoryError::AddressOverflow {
                    value: bits,
                    width: Self::BITS,
                });
            }
        }
        Ok(Address(input.truncate()))
    }

    /// Normalize any address-like input, silently truncating wide values
    pub fn truncating<A: IntoAddress>(input: A) -> Self
    {
        Address(input.truncate())
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use rmem_core::types::Address;
    ///
    /// let addr = Address::from(0x1000usize);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100usize)));
    /// assert_eq!(addr.checked_add(usize::MAX), None); // Overflow
    /// ```
    pub fn checked_add(self, offset: usize) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset from this address, checking for underflow
    pub fn checked_sub(self, offset: usize) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }

    /// Apply a signed offset with wrapping pointer arithmetic
    ///
    /// ```rust
    /// use rmem_core::types::Address;
    ///
    /// let addr = Address::from(0x1000usize);
    /// assert_eq!(addr.offset(-0x10), Address::from(0xff0usize));
    /// assert_eq!(addr.offset(0x10), Address::from(0x1010usize));
    /// ```
    pub const fn offset(self, offset: isize) -> Self
    {
        Address(self.0.wrapping_add_signed(offset))
    }

    /// The address as a raw pointer (meaningful only in the process it came from)
    pub const fn as_ptr<T>(self) -> *const T
    {
        self.0 as *const T
    }

    /// The address as a raw mutable pointer
    pub const fn as_mut_ptr<T>(self) -> *mut T
    {
        self.0 as *mut T
    }
}

impl From<usize> for Address
{
    fn from(value: usize) -> Self
    {
        Address(value)
    }
}

impl From<Address> for usize
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:0width$x}", self.0, width = mem::size_of::<usize>() * 2)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<usize> for Address
{
    type Output = Address;

    fn add(self, rhs: usize) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<usize> for Address
{
    type Output = Address;

    fn sub(self, rhs: usize) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}

/// Anything that can name a location in a target process
///
/// Implemented for every primitive integer, raw pointers, references,
/// `NonNull` and [`Address`] itself. Pointers are interpreted as their numeric
/// value.
pub trait IntoAddress: Copy
{
    /// Size of the input type in bytes
    const WIDTH: usize = mem::size_of::<Self>();

    /// The input's bit pattern, read as an unsigned integer of the same width
    fn to_bits(self) -> u128;

    /// The input converted with `as` semantics (sign-extending or truncating)
    fn truncate(self) -> usize;
}

macro_rules! impl_into_address_for_int {
    ($($int:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl IntoAddress for $int
            {
                #[inline]
                fn to_bits(self) -> u128
                {
                    self as $unsigned as u128
                }

                #[inline]
                fn truncate(self) -> usize
                {
                    self as usize
                }
            }
        )*
    };
}

impl_into_address_for_int! {
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    u128 => u128,
    usize => usize,
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
    i128 => u128,
    isize => usize,
}

impl IntoAddress for Address
{
    fn to_bits(self) -> u128
    {
        self.0 as u128
    }

    fn truncate(self) -> usize
    {
        self.0
    }
}

impl<T: ?Sized> IntoAddress for *const T
{
    fn to_bits(self) -> u128
    {
        self.truncate() as u128
    }

    fn truncate(self) -> usize
    {
        self.cast::<u8>() as usize
    }
}

impl<T: ?Sized> IntoAddress for *mut T
{
    fn to_bits(self) -> u128
    {
        self.truncate() as u128
    }

    fn truncate(self) -> usize
    {
        self.cast::<u8>() as usize
    }
}

impl<T: ?Sized> IntoAddress for NonNull<T>
{
    fn to_bits(self) -> u128
    {
        self.truncate() as u128
    }

    fn truncate(self) -> usize
    {
        self.as_ptr().cast::<u8>() as usize
    }
}

impl<T: ?Sized> IntoAddress for &T
{
    fn to_bits(self) -> u128
    {
        self.truncate() as u128
    }

    fn truncate(self) -> usize
    {
        (self as *const T).cast::<u8>() as usize
    }
}
