//! Tests for sharing one facade between threads

use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use rmem_core::operations::ProcessOperations;
use rmem_core::platform::handle::ProcessHandle;
use rmem_core::Memory;

#[test]
fn test_scoped_threads_share_a_facade()
{
    let memory = Memory::current();
    let left = black_box([1u64; 64]);
    let right = black_box([2u64; 64]);

    thread::scope(|scope| {
        let a = scope.spawn(|| {
            (0..100)
                .map(|_| memory.read::<[u64; 64], _>(&left).unwrap().iter().sum::<u64>())
                .sum::<u64>()
        });
        let b = scope.spawn(|| {
            (0..100)
                .map(|_| memory.read::<[u64; 64], _>(&right).unwrap().iter().sum::<u64>())
                .sum::<u64>()
        });

        assert_eq!(a.join().unwrap(), 64 * 100);
        assert_eq!(b.join().unwrap(), 2 * 64 * 100);
    });
}

#[test]
fn test_shared_handle_across_owned_facades()
{
    let handle = Arc::new(ProcessHandle::current());
    let value = Arc::new(black_box(0x5eed_u32));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let memory = Memory::from_handle(Arc::clone(&handle));
            let address = Arc::as_ptr(&value) as usize;
            let keep_alive = Arc::clone(&value);
            thread::spawn(move || {
                let read = memory.read::<u32, _>(address).unwrap();
                drop(keep_alive);
                read
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap(), 0x5eed);
    }

    let memory = Memory::from_handle(Arc::clone(&handle));
    let ops: &ProcessOperations<Arc<ProcessHandle>> = memory.operations();
    assert!(!ops.handle().is_owned());
    assert_eq!(Arc::strong_count(&handle), 2);
}
