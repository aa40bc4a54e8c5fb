//! In-memory stand-in for a target process, shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use rmem_core::error::{MemoryError, Result};
use rmem_core::operations::MemoryOperations;
use rmem_core::types::Address;

/// Native code reported for addresses outside the image.
pub const FAULT: i32 = 14;

/// A flat byte image mapped at `base`
///
/// Transfers fully inside the image succeed. Transfers that start inside but
/// run off the end move the bytes that fit and report a partial transfer,
/// like a real kernel hitting an unmapped page. Transfers that start outside
/// fail with [`FAULT`].
pub struct FakeProcess
{
    base: usize,
    image: Mutex<Vec<u8>>,
    transfers: Mutex<Vec<(Address, usize)>>,
}

impl FakeProcess
{
    pub fn new(base: usize, size: usize) -> Self
    {
        Self {
            base,
            image: Mutex::new(vec![0; size]),
            transfers: Mutex::new(Vec::new()),
        }
    }

    pub fn base(&self) -> usize
    {
        self.base
    }

    pub fn end(&self) -> usize
    {
        self.base + self.image.lock().unwrap().len()
    }

    /// Poke bytes directly into the image
    pub fn poke(&self, address: usize, bytes: &[u8])
    {
        let offset = address - self.base;
        self.image.lock().unwrap()[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Peek bytes directly from the image
    pub fn peek(&self, address: usize, len: usize) -> Vec<u8>
    {
        let offset = address - self.base;
        self.image.lock().unwrap()[offset..offset + len].to_vec()
    }

    /// Every (address, size) the facade asked for, in order
    pub fn transfers(&self) -> Vec<(Address, usize)>
    {
        self.transfers.lock().unwrap().clone()
    }

    fn locate(&self, operation: &'static str, address: Address, requested: usize) -> Result<(usize, usize)>
    {
        self.transfers.lock().unwrap().push((address, requested));

        let len = self.image.lock().unwrap().len();
        let start = address.value();
        if start < self.base || start >= self.base + len {
            return Err(MemoryError::System { operation, code: FAULT });
        }
        let offset = start - self.base;
        Ok((offset, requested.min(len - offset)))
    }
}

impl MemoryOperations for FakeProcess
{
    fn read(&self, address: Address, buffer: &mut [u8]) -> Result<()>
    {
        let (offset, available) = self.locate("fake_read", address, buffer.len())?;
        let image = self.image.lock().unwrap();
        buffer[..available].copy_from_slice(&image[offset..offset + available]);

        if available < buffer.len() {
            return Err(MemoryError::PartialTransfer {
                operation: "fake_read",
                requested: buffer.len(),
                transferred: available,
            });
        }
        Ok(())
    }

    fn write(&self, address: Address, buffer: &[u8]) -> Result<()>
    {
        let (offset, available) = self.locate("fake_write", address, buffer.len())?;
        let mut image = self.image.lock().unwrap();
        image[offset..offset + available].copy_from_slice(&buffer[..available]);

        if available < buffer.len() {
            return Err(MemoryError::PartialTransfer {
                operation: "fake_write",
                requested: buffer.len(),
                transferred: available,
            });
        }
        Ok(())
    }
}
