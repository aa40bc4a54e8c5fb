//! # macOS Memory Operations
//!
//! Memory reading and writing using Mach APIs.
//!
//! Both calls work on a task port, obtained from `task_for_pid()` for another
//! process or `mach_task_self()` for the caller.
//!
//! ## Mach Memory APIs
//!
//! - **mach_vm_read_overwrite()**: copy from the target into a caller buffer
//!   and report how many bytes arrived
//! - **mach_vm_write()**: copy a caller buffer into the target
//!
//! ## References
//!
//! - [mach_vm_read_overwrite](https://developer.apple.com/documentation/kernel/1402127-mach_vm_read_overwrite)
//! - [mach_vm_write](https://developer.apple.com/documentation/kernel/1402070-mach_vm_write)

use mach2::kern_return::KERN_SUCCESS;
use mach2::message::mach_msg_type_number_t;
use mach2::port::mach_port_t;
use mach2::vm::{mach_vm_read_overwrite, mach_vm_write};
use mach2::vm_types::{mach_vm_address_t, mach_vm_size_t, vm_offset_t};

use crate::error::{MemoryError, Result};
use crate::types::Address;

/// Read `buffer.len()` bytes from a Mach task
///
/// `mach_vm_read_overwrite()` writes straight into `buffer`, avoiding the
/// kernel-allocated copy that `mach_vm_read()` would hand back.
///
/// ## Mach API: mach_vm_read_overwrite()
///
/// ```c
/// kern_return_t mach_vm_read_overwrite(
///     vm_map_t target_task,        // Task port
///     mach_vm_address_t address,   // Address to read from
///     mach_vm_size_t size,         // Number of bytes to read
///     mach_vm_address_t data,      // Destination in our address space
///     mach_vm_size_t *outsize      // Output: bytes actually read
/// );
/// ```
pub fn read_memory(task: mach_port_t, address: Address, buffer: &mut [u8]) -> Result<()>
{
    let requested = buffer.len();
    let mut outsize: mach_vm_size_t = 0;

    // SAFETY: `buffer` is valid for `requested` bytes of writes and `outsize`
    // outlives the call.
    let kr = unsafe {
        mach_vm_read_overwrite(
            task,
            address.value() as mach_vm_address_t,
            requested as mach_vm_size_t,
            buffer.as_mut_ptr() as mach_vm_address_t,
            &mut outsize,
        )
    };

    if kr != KERN_SUCCESS {
        return Err(MemoryError::System {
            operation: "mach_vm_read_overwrite",
            code: kr,
        });
    }

    let transferred = outsize as usize;
    if transferred != requested {
        return Err(MemoryError::PartialTransfer {
            operation: "mach_vm_read_overwrite",
            requested,
            transferred,
        });
    }
    Ok(())
}

/// Write `buffer` into a Mach task
///
/// `mach_vm_write()` takes a 32-bit count, so buffers larger than
/// `u32::MAX` bytes are sent in chunks. The call is all-or-nothing per chunk;
/// a failure after earlier chunks landed is reported as a partial transfer.
///
/// ## Mach API: mach_vm_write()
///
/// ```c
/// kern_return_t mach_vm_write(
///     vm_map_t target_task,             // Task port
///     mach_vm_address_t address,        // Address to write to
///     vm_offset_t data,                 // Source in our address space
///     mach_msg_type_number_t data_count // Number of bytes to write
/// );
/// ```
pub fn write_memory(task: mach_port_t, address: Address, buffer: &[u8]) -> Result<()>
{
    let mut written = 0usize;

    for chunk in buffer.chunks(mach_msg_type_number_t::MAX as usize) {
        let target = address + written;
        // SAFETY: `chunk` is valid for `chunk.len()` bytes of reads.
        let kr = unsafe {
            mach_vm_write(
                task,
                target.value() as mach_vm_address_t,
                chunk.as_ptr() as vm_offset_t,
                chunk.len() as mach_msg_type_number_t,
            )
        };

        if kr != KERN_SUCCESS {
            if written == 0 {
                return Err(MemoryError::System {
                    operation: "mach_vm_write",
                    code: kr,
                });
            }
            return Err(MemoryError::PartialTransfer {
                operation: "mach_vm_write",
                requested: buffer.len(),
                transferred: written,
            });
        }
        written += chunk.len();
    }
    Ok(())
}
