//! Tests for the typed facade against the current process

use std::hint::black_box;

use bytemuck::{Pod, Zeroable};
use rmem_core::{ErrorCode, Memory};

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Vec3
{
    x: f32,
    y: f32,
    z: f32,
}

#[test]
fn test_read_then_write_i32()
{
    let memory = Memory::current();
    let mut x = 26i32;
    let address = &mut x as *mut i32;

    assert_eq!(memory.read::<i32, _>(address).unwrap(), 26);

    memory.write(address, &99i32).unwrap();
    assert_eq!(memory.read::<i32, _>(address).unwrap(), 99);
    assert_eq!(unsafe { address.read_volatile() }, 99);
}

#[test]
fn test_pointer_and_integer_addresses_agree()
{
    let memory = Memory::current();
    let int = black_box(-12345i32);
    let float = black_box(3.5f32);
    let word = black_box(0xdead_beefusize);

    assert_eq!(
        memory.read::<i32, _>(&int as *const i32).unwrap(),
        memory.read::<i32, _>(&int as *const i32 as usize).unwrap()
    );
    assert_eq!(
        memory.read::<f32, _>(&float as *const f32).unwrap(),
        memory.read::<f32, _>(&float as *const f32 as usize).unwrap()
    );
    assert_eq!(
        memory.read::<usize, _>(&word as *const usize).unwrap(),
        memory.read::<usize, _>(&word as *const usize as u64).unwrap()
    );
    assert_eq!(memory.read::<usize, _>(&word).unwrap(), 0xdead_beef);
}

#[test]
fn test_round_trip_both_conventions()
{
    let memory = Memory::current();
    let mut slot = Vec3::zeroed();
    let address = &mut slot as *mut Vec3;
    let value = Vec3 { x: 1.0, y: -2.0, z: 0.5 };

    memory.write(address, &value).unwrap();
    assert_eq!(memory.read::<Vec3, _>(address).unwrap(), value);

    let mut ec = ErrorCode::OutOfRange;
    let other = Vec3 { x: 9.0, y: 8.0, z: 7.0 };
    memory.write_ec(address, &other, &mut ec);
    assert!(ec.is_success());
    assert_eq!(memory.read_ec::<Vec3, _>(address, &mut ec), other);
    assert!(ec.is_success());
}

#[test]
fn test_read_ec_failure_returns_zeroed()
{
    let memory = Memory::current();
    let mut ec = ErrorCode::default();

    let value: u64 = memory.read_ec(0usize, &mut ec);
    assert!(ec.is_failure());
    assert_eq!(value, 0);
}

#[test]
fn test_read_into_keeps_destination_on_failure()
{
    let memory = Memory::current();
    let mut destination = [7u32; 4];
    let mut ec = ErrorCode::default();

    memory.read_into_ec(0usize, &mut destination, &mut ec);
    assert!(ec.is_failure());
    assert_eq!(destination, [7; 4]);

    assert!(memory.read_into(0usize, &mut destination).is_err());
    assert_eq!(destination, [7; 4]);
}

#[test]
fn test_read_into_existing_value()
{
    let memory = Memory::current();
    let source = black_box([1u16, 2, 3]);
    let mut destination = [0u16; 3];

    memory.read_into(&source, &mut destination).unwrap();
    assert_eq!(destination, [1, 2, 3]);
}

#[test]
fn test_read_buffer_partial_size()
{
    let memory = Memory::current();
    let source = black_box([0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66]);
    let mut buffer = [0u16; 3];

    memory.read_buffer(source.as_ptr(), &mut buffer, 4).unwrap();
    assert_eq!(
        bytemuck::cast_slice::<u16, u8>(&buffer),
        &[0x11, 0x22, 0x33, 0x44, 0x00, 0x00]
    );
}

#[test]
fn test_read_buffer_rejects_oversized_request()
{
    let memory = Memory::current();
    let source = [0u8; 16];
    let mut buffer = [0u32; 2];

    let err = memory.read_buffer(source.as_ptr(), &mut buffer, 9).unwrap_err();
    assert!(err.is_contract_violation());
}

#[test]
#[should_panic(expected = "buffer holds 8 bytes but 9 were requested")]
fn test_read_buffer_ec_panics_on_oversized_request()
{
    let memory = Memory::current();
    let source = [0u8; 16];
    let mut buffer = [0u32; 2];
    let mut ec = ErrorCode::default();

    memory.read_buffer_ec(source.as_ptr(), &mut buffer, 9, &mut ec);
}

#[test]
fn test_bytes_round_trip()
{
    let memory = Memory::current();
    let mut target = [0u8; 5];
    let address = target.as_mut_ptr();

    memory.write_bytes(address, b"hello").unwrap();

    let mut copy = [0u8; 5];
    memory.read_bytes(address, &mut copy).unwrap();
    assert_eq!(&copy, b"hello");
    assert_eq!(unsafe { std::ptr::read_volatile(address.cast::<[u8; 5]>()) }, *b"hello");
}

#[test]
fn test_write_buffer_writes_prefix_only()
{
    let memory = Memory::current();
    let mut target = [0u32; 3];
    let address = target.as_mut_ptr();

    memory.write_buffer(address, &[5u32, 6, 7], 8).unwrap();

    let mut copy = [0u32; 3];
    memory.read_bytes(address, bytemuck::cast_slice_mut(&mut copy)).unwrap();
    assert_eq!(copy, [5, 6, 0]);
}

#[test]
fn test_zero_length_transfers_succeed_anywhere()
{
    let memory = Memory::current();
    let mut ec = ErrorCode::System(1);

    memory.read_bytes_ec(0usize, &mut [], &mut ec);
    assert!(ec.is_success());
    memory.write_bytes(0usize, &[]).unwrap();
}

#[cfg(not(feature = "unchecked-addresses"))]
#[test]
fn test_overflowing_address_is_rejected()
{
    let memory = Memory::current();
    let err = memory.read::<u8, _>(u128::MAX).unwrap_err();
    assert!(err.is_contract_violation());
}

#[cfg(not(feature = "unchecked-addresses"))]
#[test]
#[should_panic(expected = "does not fit")]
fn test_overflowing_address_panics_in_ec_form()
{
    let memory = Memory::current();
    let mut ec = ErrorCode::default();
    let _: u8 = memory.read_ec(u128::MAX, &mut ec);
}

#[cfg(feature = "unchecked-types")]
#[test]
fn test_read_types_that_reject_zero()
{
    use std::num::NonZeroU32;
    use std::ptr::NonNull;

    let memory = Memory::current();
    let value = black_box(NonZeroU32::new(7).unwrap());
    assert_eq!(memory.read::<NonZeroU32, _>(&value).unwrap(), value);

    let target = black_box(5u8);
    let pointer = NonNull::from(&target);
    let copy = memory.read::<NonNull<u8>, _>(&pointer).unwrap();
    assert_eq!(copy, pointer);

    let mut into = NonZeroU32::new(1).unwrap();
    memory.read_into(&value, &mut into).unwrap();
    assert_eq!(into.get(), 7);
}
