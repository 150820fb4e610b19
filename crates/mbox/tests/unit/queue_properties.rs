//! §8 invariant 3: allocation cursors never hand out a slot already in use
//! and never exceed the queue's capacity, across arbitrary alloc/free
//! interleavings.

use proptest::prelude::*;

use mbox_core::core::queue::entry::{LqState, SqState};
use mbox_core::core::queue::{LoadQueue, StoreQueue, QUEUE_FULL};

const CAPACITY: usize = 8;

#[derive(Clone, Copy, Debug)]
enum Op {
    Alloc,
    Free(usize),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(prop_oneof![Just(Op::Alloc), (0..CAPACITY * 2).prop_map(Op::Free)], 0..200)
}

proptest! {
    #[test]
    fn load_queue_allocation_never_duplicates_or_overflows(ops in ops()) {
        let mut lq = LoadQueue::new(CAPACITY);
        let mut allocated: Vec<u32> = Vec::new();

        for op in ops {
            match op {
                Op::Alloc => {
                    let slot = lq.allocate();
                    if slot == QUEUE_FULL {
                        prop_assert_eq!(allocated.len(), CAPACITY);
                    } else {
                        prop_assert!((slot as usize) < CAPACITY);
                        prop_assert!(!allocated.contains(&slot));
                        allocated.push(slot);
                    }
                }
                Op::Free(i) if !allocated.is_empty() => {
                    let slot = allocated.remove(i % allocated.len());
                    lq.free(slot);
                }
                Op::Free(_) => {}
            }
        }

        for slot in 0..CAPACITY as u32 {
            let occupied = lq.get(slot).state != LqState::QNotInUse;
            prop_assert_eq!(occupied, allocated.contains(&slot));
        }
    }

    #[test]
    fn store_queue_allocation_never_duplicates_or_overflows(ops in ops()) {
        let mut sq = StoreQueue::new(CAPACITY);
        let mut allocated: Vec<u32> = Vec::new();

        for op in ops {
            match op {
                Op::Alloc => {
                    let slot = sq.allocate();
                    if slot == QUEUE_FULL {
                        prop_assert_eq!(allocated.len(), CAPACITY);
                    } else {
                        prop_assert!((slot as usize) < CAPACITY);
                        prop_assert!(!allocated.contains(&slot));
                        allocated.push(slot);
                    }
                }
                Op::Free(i) if !allocated.is_empty() => {
                    let slot = allocated.remove(i % allocated.len());
                    sq.free(slot);
                }
                Op::Free(_) => {}
            }
        }

        for slot in 0..CAPACITY as u32 {
            let occupied = sq.get(slot).state != SqState::QNotInUse;
            prop_assert_eq!(occupied, allocated.contains(&slot));
        }
    }
}
