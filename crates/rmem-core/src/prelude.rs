//! Common module for library exports

pub use crate::chain::{ChainPointer, PointerChain};
pub use crate::config::{Config, DefaultConfig, FastConfig, StrictConfig};
pub use crate::error::{ErrorCode, MemoryError, Result};
pub use crate::memory::Memory;
pub use crate::operations::{BasedOperations, MemoryOperations, ProcessOperations};
pub use crate::platform::handle::{AsNativeHandle, ProcessHandle};
pub use crate::types::{Address, IntoAddress, Plain};
