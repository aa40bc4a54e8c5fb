//! # rmem-core
//!
//! Typed read/write access to the memory of another process.
//!
//! This crate provides:
//! - A native transfer primitive per platform ([`platform`])
//! - Process handle acquisition ([`platform::handle::ProcessHandle`])
//! - A pluggable transfer policy ([`operations::MemoryOperations`])
//! - The typed facade: values, buffers, pointer chains ([`Memory`])
//!
//! ## Platform Support
//!
//! - **Linux / Android**: `process_vm_readv()` / `process_vm_writev()`
//! - **macOS / iOS**: `mach_vm_read_overwrite()` / `mach_vm_write()`
//! - **Windows**: `ReadProcessMemory()` / `WriteProcessMemory()`
//!
//! ## Example
//!
//! ```rust
//! use rmem_core::{ErrorCode, Memory};
//!
//! let memory = Memory::current();
//! let score = 1200u32;
//!
//! // Result convention
//! assert_eq!(memory.read::<u32, _>(&score).unwrap(), 1200);
//!
//! // Error-code convention
//! let mut ec = ErrorCode::default();
//! let value: u32 = memory.read_ec(&score as *const u32 as usize, &mut ec);
//! assert!(ec.is_success());
//! assert_eq!(value, 1200);
//! ```
//!
//! ## Cargo Features
//!
//! - `unchecked-addresses`: truncate wide address inputs instead of rejecting them
//! - `unchecked-types`: accept any `Copy` type, not only byte-blob types
//! - `unsafe-reads`: read straight into destinations without staging
//!
//! ## Why unsafe code is needed
//!
//! The transfer primitives are raw system calls that write into caller
//! buffers. We wrap them in safe functions whose buffers are always Rust
//! slices of the right length.

#![allow(unsafe_code)] // Required for process_vm_readv, Mach and Win32 calls

pub mod chain;
pub mod config;
pub mod error;
pub mod memory;
pub mod operations;
pub mod platform;
pub mod prelude;
pub mod types;

// Re-export commonly used types
pub use chain::{ChainPointer, PointerChain};
pub use config::{Config, DefaultConfig};
pub use error::{ErrorCode, MemoryError, NativeErrorCode, Result};
pub use memory::Memory;
pub use operations::{BasedOperations, MemoryOperations, ProcessOperations};
pub use platform::NativeHandle;
pub use platform::handle::{AsNativeHandle, ProcessHandle};
pub use types::{Address, IntoAddress, Plain};
