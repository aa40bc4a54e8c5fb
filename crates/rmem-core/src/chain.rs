//! Reusable pointer chains.

use std::{fmt, mem};

use smallvec::SmallVec;

use crate::types::{IntoAddress, Plain};

/// An integer type that can hold a pointer read from the target
///
/// Used for the intermediate words of a pointer chain and for its final
/// element. `u32` covers 32-bit targets, `u64` 64-bit ones, `usize` the host's
/// own width.
pub trait ChainPointer: Plain + IntoAddress
{
    /// Add a signed offset with wrapping arithmetic
    fn wrapping_offset(self, offset: isize) -> Self;
}

macro_rules! impl_chain_pointer {
    ($($ty:ty),*) => {
        $(
            impl ChainPointer for $ty
            {
                #[inline]
                fn wrapping_offset(self, offset: isize) -> Self
                {
                    self.wrapping_add(offset as $ty)
                }
            }
        )*
    };
}

impl_chain_pointer!(u32, u64, usize);

/// A base address plus the offsets to follow from it
///
/// Resolving the chain reads a word at `base`, adds the first offset, reads a
/// word there, and so on. The last offset is added to the final value read
/// rather than dereferenced. See
/// [`Memory::traverse_pointers_chain`](crate::Memory::traverse_pointers_chain).
///
/// The base is kept as given and normalized each time the chain is resolved,
/// so a base wider than the host pointer is rejected or truncated according
/// to the resolving facade's [`Config`](crate::config::Config).
///
/// ```rust
/// use rmem_core::chain::PointerChain;
///
/// let chain = PointerChain::new(0x1000usize).offset(0x10).offset(-8);
/// assert_eq!(chain.base(), 0x1000);
/// assert_eq!(chain.offsets(), &[0x10, -8]);
/// assert_eq!(chain.to_string(), "[0x1000] -> +0x10 -> -0x8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerChain
{
    base: u128,
    offsets: SmallVec<[isize; 8]>,
}

impl PointerChain
{
    /// Start a chain at `base` with no offsets
    pub fn new<A: IntoAddress>(base: A) -> Self
    {
        Self::with_offsets(base, &[])
    }

    /// Start a chain at `base` with the given offsets
    pub fn with_offsets<A: IntoAddress>(base: A, offsets: &[isize]) -> Self
    {
        Self {
            base: widen(base),
            offsets: SmallVec::from_slice(offsets),
        }
    }

    /// Append an offset (builder style)
    pub fn offset(mut self, offset: isize) -> Self
    {
        self.offsets.push(offset);
        self
    }

    /// Append an offset
    pub fn push(&mut self, offset: isize)
    {
        self.offsets.push(offset);
    }

    /// The base as given, widened to 128 bits
    ///
    /// Inputs no wider than `usize` are converted with `as` semantics, wider
    /// ones keep their full bit pattern.
    pub fn base(&self) -> u128
    {
        self.base
    }

    pub fn offsets(&self) -> &[isize]
    {
        &self.offsets
    }

    /// Number of offsets (dereferences plus the final adjustment)
    pub fn len(&self) -> usize
    {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.offsets.is_empty()
    }
}

impl fmt::Display for PointerChain
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "[0x{:x}]", self.base)?;
        for offset in &self.offsets {
            if *offset < 0 {
                write!(f, " -> -0x{:x}", offset.unsigned_abs())?;
            } else {
                write!(f, " -> +0x{offset:x}")?;
            }
        }
        Ok(())
    }
}

/// Widen `input` so that normalizing the result matches normalizing `input`
fn widen<A: IntoAddress>(input: A) -> u128
{
    if A::WIDTH > mem::size_of::<usize>() {
        input.to_bits()
    } else {
        input.truncate() as u128
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_wrapping_offset_per_width()
    {
        assert_eq!(0x10u32.wrapping_offset(-0x20), 0xffff_fff0);
        assert_eq!(0x10u64.wrapping_offset(-0x10), 0);
        assert_eq!(usize::MAX.wrapping_offset(1), 0);
    }

    #[test]
    fn test_builder_and_push_agree()
    {
        let mut pushed = PointerChain::new(0x40u64);
        pushed.push(8);
        pushed.push(0);
        assert_eq!(pushed, PointerChain::new(0x40u64).offset(8).offset(0));
        assert_eq!(pushed, PointerChain::with_offsets(0x40u64, &[8, 0]));
        assert_eq!(pushed.len(), 2);
        assert!(!pushed.is_empty());
    }

    #[test]
    fn test_base_keeps_wide_bits()
    {
        let wide = (1u128 << 64) | 0x1000;
        assert_eq!(PointerChain::new(wide).base(), wide);
        assert_eq!(PointerChain::new(-1isize).base(), usize::MAX as u128);
        assert_eq!(PointerChain::new(0x20u8).to_string(), "[0x20]");
    }
}
