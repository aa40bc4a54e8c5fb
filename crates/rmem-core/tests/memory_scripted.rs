//! Tests for the typed facade against a scripted target

mod common;

use common::{FAULT, FakeProcess};
use rmem_core::config::{FastConfig, StrictConfig};
use rmem_core::error::{ErrorCode, MemoryError};
use rmem_core::operations::{BasedOperations, MemoryOperations};
use rmem_core::types::Address;
use rmem_core::Memory;

const BASE: usize = 0x4000;
const SIZE: usize = 0x400;

fn target() -> FakeProcess
{
    FakeProcess::new(BASE, SIZE)
}

#[test]
fn test_read_hits_requested_address_and_size()
{
    let fake = target();
    fake.poke(BASE + 0x10, &0x1122_3344u32.to_ne_bytes());

    let memory = Memory::new(&fake);
    assert_eq!(memory.read::<u32, _>(BASE + 0x10).unwrap(), 0x1122_3344);
    assert_eq!(fake.transfers(), vec![(Address::new(BASE + 0x10), 4)]);
}

#[test]
fn test_short_transfer_is_out_of_range()
{
    let fake = target();
    let memory = Memory::new(&fake);
    let end = fake.end();

    let err = memory.read::<u64, _>(end - 3).unwrap_err();
    assert_eq!(
        err,
        MemoryError::PartialTransfer {
            operation: "fake_read",
            requested: 8,
            transferred: 3,
        }
    );

    let mut ec = ErrorCode::default();
    let value: u64 = memory.read_ec(end - 3, &mut ec);
    assert_eq!(ec, ErrorCode::OutOfRange);
    assert_eq!(value, 0);
}

#[test]
fn test_os_rejection_carries_native_code()
{
    let fake = target();
    let memory = Memory::new(&fake);

    let mut ec = ErrorCode::default();
    memory.write_ec(0x10usize, &1u8, &mut ec);
    assert_eq!(ec, ErrorCode::System(FAULT));
    assert_eq!(ec.native_code(), Some(FAULT));
}

#[test]
fn test_success_clears_previous_error()
{
    let fake = target();
    let memory = Memory::new(&fake);

    let mut ec = ErrorCode::default();
    let _: u8 = memory.read_ec(0usize, &mut ec);
    assert!(ec.is_failure());

    let _: u8 = memory.read_ec(BASE, &mut ec);
    assert!(ec.is_success());
}

#[test]
fn test_failed_read_into_leaves_destination_untouched()
{
    let fake = target();
    fake.poke(fake.end() - 2, &[0xaa, 0xbb]);
    let memory = Memory::<_, StrictConfig>::with_config(&fake);

    let mut destination = 0x0102_0304_0506_0708u64;
    let mut ec = ErrorCode::default();
    memory.read_into_ec(fake.end() - 2, &mut destination, &mut ec);

    assert_eq!(ec, ErrorCode::OutOfRange);
    assert_eq!(destination, 0x0102_0304_0506_0708);
}

#[test]
fn test_failed_read_buffer_leaves_destination_untouched()
{
    let fake = target();
    fake.poke(fake.end() - 4, &[1, 2, 3, 4]);
    let memory = Memory::<_, StrictConfig>::with_config(&fake);

    let mut buffer = [0xeeu8; 8];
    let err = memory.read_buffer(fake.end() - 4, &mut buffer, 8).unwrap_err();

    assert_eq!(err.error_code(), Some(ErrorCode::OutOfRange));
    assert_eq!(buffer, [0xee; 8]);
}

#[test]
fn test_unstaged_reads_land_in_destination()
{
    let fake = target();
    fake.poke(fake.end() - 4, &[1, 2, 3, 4]);
    let memory = Memory::<_, FastConfig>::with_config(&fake);

    let mut buffer = [0xeeu8; 8];
    assert!(memory.read_bytes(fake.end() - 4, &mut buffer).is_err());
    assert_eq!(buffer, [1, 2, 3, 4, 0xee, 0xee, 0xee, 0xee]);
}

#[test]
fn test_large_buffers_are_staged_on_the_heap()
{
    let fake = target();
    let pattern: Vec<u8> = (0..SIZE).map(|i| i as u8).collect();
    fake.poke(BASE, &pattern);
    let memory = Memory::new(&fake);

    let mut buffer = vec![0u8; SIZE];
    memory.read_bytes(BASE, &mut buffer).unwrap();
    assert_eq!(buffer, pattern);
}

#[test]
fn test_write_buffer_sends_prefix()
{
    let fake = target();
    let memory = Memory::new(&fake);

    memory.write_buffer(BASE, &[0x0101u16, 0x0202, 0x0303], 3).unwrap();
    assert_eq!(fake.transfers(), vec![(Address::new(BASE), 3)]);
    assert_eq!(fake.peek(BASE, 4), vec![0x01, 0x01, 0x02, 0x00]);
}

#[test]
fn test_write_buffer_rejects_oversized_request()
{
    let fake = target();
    let memory = Memory::new(&fake);

    let err = memory.write_buffer(BASE, &[0u8; 2], 3).unwrap_err();
    assert_eq!(
        err,
        MemoryError::BufferTooSmall {
            requested: 3,
            available: 2,
        }
    );
    assert!(fake.transfers().is_empty());
}

#[test]
fn test_fast_config_truncates_wide_addresses()
{
    let fake = target();
    fake.poke(BASE, &[0x5a]);
    let memory = Memory::<_, FastConfig>::with_config(&fake);

    let wide = (1u128 << 100) | BASE as u128;
    assert_eq!(memory.read::<u8, _>(wide).unwrap(), 0x5a);
}

#[test]
fn test_strict_config_rejects_wide_addresses()
{
    let fake = target();
    let memory = Memory::<_, StrictConfig>::with_config(&fake);

    let wide = (1u128 << 100) | BASE as u128;
    assert!(matches!(
        memory.read::<u8, _>(wide),
        Err(MemoryError::AddressOverflow { .. })
    ));
    assert!(fake.transfers().is_empty());
}

#[test]
fn test_based_operations_offsets_every_address()
{
    let fake = target();
    fake.poke(BASE + 0x20, &77u16.to_ne_bytes());

    let mut ops = BasedOperations::new(&fake, Address::new(BASE));
    assert_eq!(ops.base_address(), Address::new(BASE));

    let mut word = [0u8; 2];
    ops.read(Address::new(0x20), &mut word).unwrap();
    assert_eq!(u16::from_ne_bytes(word), 77);

    ops.set_base_address(Address::new(BASE + 0x10));
    let memory = Memory::new(ops);
    assert_eq!(memory.read::<u16, _>(0x10usize).unwrap(), 77);

    memory.write(0usize, &9u8).unwrap();
    assert_eq!(fake.peek(BASE + 0x10, 1), vec![9]);
    assert_eq!(memory.operations().inner().base(), BASE);
}

#[test]
fn test_operations_ec_forms()
{
    let fake = target();
    let mut ec = ErrorCode::default();

    let mut byte = [0u8];
    fake.read_ec(Address::new(1), &mut byte, &mut ec);
    assert_eq!(ec, ErrorCode::System(FAULT));

    fake.write_ec(Address::new(BASE), &[3], &mut ec);
    assert!(ec.is_success());
    assert_eq!(fake.peek(BASE, 1), vec![3]);
}
