//! # Build-Time Configuration
//!
//! The facade's safety checks are selected at compile time, never at run time.
//! A [`Config`] supplies them as associated constants, so a disabled check
//! compiles away entirely.
//!
//! [`DefaultConfig`] follows the crate's cargo features:
//!
//! | Feature               | Effect                                                   |
//! |-----------------------|----------------------------------------------------------|
//! | `unchecked-addresses` | `CHECKED_ADDRESSES = false`: wide inputs are truncated   |
//! | `unsafe-reads`        | `STAGED_READS = false`: reads land directly in the target|
//! | `unchecked-types`     | [`Plain`](crate::types::Plain) accepts any `Copy` type   |
//!
//! [`StrictConfig`] and [`FastConfig`] pin the checks on or off regardless of
//! features.

use crate::error::Result;
use crate::types::{Address, IntoAddress};

/// Compile-time switches for [`Memory`](crate::Memory)
pub trait Config: 'static
{
    /// Reject address inputs that do not fit in a `usize`
    const CHECKED_ADDRESSES: bool;

    /// Stage incoming bytes and commit them only after a complete transfer
    ///
    /// When `false`, a failed `read_into` / `read_buffer` may leave the
    /// destination partially overwritten.
    const STAGED_READS: bool;

    /// Normalize an address input according to `CHECKED_ADDRESSES`
    fn normalize<A: IntoAddress>(input: A) -> Result<Address>
    {
        if Self::CHECKED_ADDRESSES {
            Address::checked(input)
        } else {
            Ok(Address::truncating(input))
        }
    }
}

/// Configuration driven by the crate's cargo features
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConfig;

impl Config for DefaultConfig
{
    const CHECKED_ADDRESSES: bool = !cfg!(feature = "unchecked-addresses");
    const STAGED_READS: bool = !cfg!(feature = "unsafe-reads");
}

/// Every check enabled
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictConfig;

impl Config for StrictConfig
{
    const CHECKED_ADDRESSES: bool = true;
    const STAGED_READS: bool = true;
}

/// Address checks and read staging disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct FastConfig;

impl Config for FastConfig
{
    const CHECKED_ADDRESSES: bool = false;
    const STAGED_READS: bool = false;
}
