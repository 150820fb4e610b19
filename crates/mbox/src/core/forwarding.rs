//! Store-to-load forwarding.
//!
//! Selects the youngest store older than a given load that covers its full
//! address range, so the load can be satisfied without touching the cache at
//! all.

use crate::common::access::Width;
use crate::common::addr::VirtAddr;
use crate::core::queue::StoreQueue;

/// Outcome of a forwarding attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum ForwardResult {
    /// A covering store was found; `value` already has the low `len` bytes
    /// of the source masked out and ready for sign/zero extension by the
    /// caller.
    Hit { value: u64 },
    /// No covering store exists; fall through to cache probing.
    Miss,
    /// A store older than the load overlaps its address range but does not
    /// fully cover it. Forwarding is suppressed *and* the cache must not be
    /// probed either — the load stays pending until the overlapping store
    /// commits.
    Stall,
}

/// Evaluates the forwarding predicate for a load at `virt_addr`/`width` with
/// age `load_unique_id` against every candidate entry in `sq`.
///
/// Candidates are restricted by [`crate::core::queue::entry::SqState::forwarding_payload`]
/// to `{Initial, SqWritePending, SqComplete}`. Among entries whose address
/// equals `virt_addr` exactly and whose width covers the load, the one with
/// the greatest `unique_id` wins. An address that merely overlaps — neither
/// equal nor disjoint — stalls the load rather than allowing a cache probe.
pub fn resolve(sq: &StoreQueue, virt_addr: VirtAddr, width: Width, load_unique_id: u64) -> ForwardResult {
    let load_lo = virt_addr.val();
    let load_hi = load_lo + width.bytes();

    let mut best: Option<(u64, u64)> = None; // (unique_id, value)
    let mut overlap_without_cover = false;

    for (_, entry) in sq.forwarding_candidates() {
        let unique_id = entry.unique_id;
        if unique_id >= load_unique_id {
            continue;
        }
        let Some((store_addr, store_value, store_width)) = entry.state.forwarding_payload() else {
            continue;
        };

        let store_lo = store_addr.val();
        let store_hi = store_lo + store_width.bytes();
        let disjoint = store_hi <= load_lo || load_hi <= store_lo;
        if disjoint {
            continue;
        }

        let exact_cover = store_addr.val() == virt_addr.val() && store_width.bytes() >= width.bytes();
        if !exact_cover {
            overlap_without_cover = true;
            continue;
        }

        if best.map(|(best_id, _)| unique_id > best_id).unwrap_or(true) {
            let mask = if width.bytes() >= 8 {
                u64::MAX
            } else {
                (1u64 << (width.bytes() * 8)) - 1
            };
            best = Some((unique_id, store_value & mask));
        }
    }

    match best {
        Some((_, value)) => ForwardResult::Hit { value },
        None if overlap_without_cover => ForwardResult::Stall,
        None => ForwardResult::Miss,
    }
}
