//! # Types
//!
//! Platform-agnostic types used throughout the crate.
//!
//! - [`Address`]: the canonical, pointer-width address every layer works with
//! - [`IntoAddress`]: the inputs that normalize into an [`Address`]
//! - [`Plain`]: the values that may be copied to and from a target process as raw bytes

pub mod address;
pub mod plain;

// Re-export all public types
pub use address::{Address, IntoAddress};
pub use plain::Plain;
