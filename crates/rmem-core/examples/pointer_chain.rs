//! Walk a linked structure in the current process with a pointer chain
//!
//! Run with `RUST_LOG=rmem_core=trace` to see every transfer:
//!
//! ```text
//! RUST_LOG=rmem_core=trace cargo run -p rmem-core --example pointer_chain
//! ```

use std::ptr::addr_of;

use rmem_core::{ErrorCode, Memory, PointerChain};
use rmem_utils::init_logging;

#[repr(C)]
struct Player
{
    health: u32,
    armor: u32,
    inventory: *const Inventory,
}

#[repr(C)]
struct Inventory
{
    slots: [u32; 4],
    selected: *const Item,
}

#[repr(C)]
struct Item
{
    id: u64,
    count: u64,
}

/// Byte distance between two addresses inside the same object
fn offset_of<T, F>(object: &T, field: *const F) -> isize
{
    field as isize - object as *const T as isize
}

fn main()
{
    let _guard = init_logging().expect("Failed to initialize logging");

    let sword = Item { id: 7, count: 1 };
    let inventory = Inventory {
        slots: [1, 2, 3, 4],
        selected: &sword,
    };
    let player = Player {
        health: 100,
        armor: 25,
        inventory: &inventory,
    };
    let game_state: *const Player = &player;

    let memory = Memory::current();

    tracing::debug!(
        health = player.health,
        armor = player.armor,
        slots = ?inventory.slots,
        item = sword.id,
        "game state"
    );

    // game_state -> player.inventory -> inventory.selected, then the count field
    let chain = PointerChain::new(addr_of!(game_state))
        .offset(offset_of(&player, addr_of!(player.inventory)))
        .offset(offset_of(&inventory, addr_of!(inventory.selected)))
        .offset(offset_of(&sword, addr_of!(sword.count)));
    tracing::info!(%chain, "resolving pointer chain");

    let count_address: usize = match memory.resolve(&chain) {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "pointer chain failed");
            return;
        }
    };

    let mut ec = ErrorCode::default();
    let count: u64 = memory.read_ec(count_address, &mut ec);
    if ec.is_failure() {
        tracing::error!(error = %ec, "reading item count failed");
        return;
    }

    tracing::info!(count_address = format_args!("{count_address:#x}"), count, "selected item");
    assert_eq!(count, sword.count);
}
