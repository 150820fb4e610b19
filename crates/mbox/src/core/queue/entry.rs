//! LQ/SQ entry state machines.
//!
//! Each state owns exactly the payload meaningful at that point in the
//! entry's life, enforced by construction rather than by an `Option` field
//! that happens to be `None` in the wrong states.

use crate::common::access::Width;
use crate::common::addr::{PhysAddr, VirtAddr};
use crate::core::instr::InstrHandle;

/// A load queue entry's current state and the payload valid in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LqState {
    /// Slot is free.
    QNotInUse,
    /// Slot reserved by the allocator; no payload published yet.
    Assigned,
    /// `ReadMem` has published the virtual address; awaiting translation.
    Initial { virt_addr: VirtAddr },
    /// Translated; awaiting forwarding/cache resolution.
    LqReadPending {
        virt_addr: VirtAddr,
        phys_addr: PhysAddr,
        width: Width,
        io: bool,
    },
    /// Result materialized; awaiting retirement notification.
    LqComplete,
}

/// A single Load Queue entry.
///
/// `unique_id` is cached on the entry itself (rather than fetched through
/// `instr` on every comparison) because age comparison against the whole SQ
/// happens on every scheduler pass a pending load survives; it is captured
/// from the instruction descriptor at publish time and never changes.
#[derive(Clone, Copy, Debug)]
pub struct LqEntry {
    /// Non-owning reference to the issuing instruction. `None` only while
    /// `state` is `QNotInUse`.
    pub instr: Option<InstrHandle>,
    /// Program-order tag, cached from the instruction at publish time.
    pub unique_id: u64,
    /// Access width, staged by `ReadMem` before translation. Carried
    /// separately from `state` because `Initial` predates the translated
    /// payload that `LqReadPending` bundles width into.
    pub pending_width: Option<crate::common::access::Width>,
    /// Current state and its payload.
    pub state: LqState,
    /// Set when the outstanding load is waiting on a MAF entry to refill.
    pub maf_slot: Option<u32>,
    /// Set when the outstanding load is waiting on an IOWB entry.
    pub iowb_slot: Option<u32>,
    /// True if this is a load-locked instruction (establishes the CPU lock
    /// flag on retirement rather than on forwarding).
    pub lock: bool,
}

impl LqEntry {
    /// A free slot.
    pub const fn empty() -> Self {
        Self {
            instr: None,
            unique_id: 0,
            pending_width: None,
            state: LqState::QNotInUse,
            maf_slot: None,
            iowb_slot: None,
            lock: false,
        }
    }
}

/// A store queue entry's current state and the payload valid in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqState {
    /// Slot is free.
    QNotInUse,
    /// Slot reserved by the allocator; no payload published yet.
    Assigned,
    /// `WriteMem` has published virtual address and value; awaiting
    /// translation. Still visible to the forwarding engine.
    Initial { virt_addr: VirtAddr, value: u64, width: Width },
    /// Translated; waiting for the owning instruction to retire before the
    /// store becomes globally visible. Still visible to forwarding.
    SqWritePending {
        virt_addr: VirtAddr,
        phys_addr: PhysAddr,
        value: u64,
        width: Width,
    },
    /// Retired; ready to commit to the Dcache. Still visible to forwarding.
    SqReady {
        virt_addr: VirtAddr,
        phys_addr: PhysAddr,
        value: u64,
        width: Width,
    },
    /// Committed to the Dcache; awaiting slot reclamation. Retains its
    /// payload because it remains a valid forwarding source until reclaimed.
    SqComplete {
        virt_addr: VirtAddr,
        phys_addr: PhysAddr,
        value: u64,
        width: Width,
    },
}

impl SqState {
    /// The address/value/width payload of this entry, if forwarding may
    /// select this entry as a source. The eligible set is exactly
    /// `{Initial, SqWritePending, SqComplete}` — `SqReady` (retired, not yet
    /// committed) is deliberately excluded, matching the forwarding
    /// predicate's state membership.
    pub fn forwarding_payload(&self) -> Option<(VirtAddr, u64, Width)> {
        match *self {
            SqState::Initial { virt_addr, value, width } => Some((virt_addr, value, width)),
            SqState::SqWritePending { virt_addr, value, width, .. } => Some((virt_addr, value, width)),
            SqState::SqComplete { virt_addr, value, width, .. } => Some((virt_addr, value, width)),
            SqState::QNotInUse | SqState::Assigned | SqState::SqReady { .. } => None,
        }
    }
}

/// A single Store Queue entry.
#[derive(Clone, Copy, Debug)]
pub struct SqEntry {
    /// Non-owning reference to the issuing instruction. `None` only while
    /// `state` is `QNotInUse`.
    pub instr: Option<InstrHandle>,
    /// Program-order tag, cached from the instruction at publish time.
    pub unique_id: u64,
    /// Current state and its payload.
    pub state: SqState,
    /// Set once the Ibox has notified retirement (`RetireStore`).
    pub retired: bool,
    /// True if this is a store-conditional entry: commit on `SqReady` is
    /// gated on the CPU lock flag rather than unconditional, and `destv`
    /// reports success/failure (`1`/`0`) rather than the stored value.
    pub lock_cond: bool,
}

impl SqEntry {
    /// A free slot.
    pub const fn empty() -> Self {
        Self {
            instr: None,
            unique_id: 0,
            state: SqState::QNotInUse,
            retired: false,
            lock_cond: false,
        }
    }
}
