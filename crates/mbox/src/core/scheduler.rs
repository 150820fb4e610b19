//! Per-entry state advancement.
//!
//! These functions are the body of one scheduler pass over a single LQ or SQ
//! slot. They are free functions taking borrowed collaborators rather than
//! methods on [`crate::core::mbox::Mbox`] so they can be unit tested against
//! `mockall` fakes without any locking or thread machinery involved.

use tracing::{debug, trace, warn};

use crate::common::access::{AccessType, Width};
use crate::common::addr::{PhysAddr, VirtAddr};
use crate::common::fault::Trap;
use crate::core::access_mode::AccessMode;
use crate::core::collaborators::{BcacheAccess, CacheStatus, CboxDispatch, DcacheAccess, IboxNotify, MissKind, Translator};
use crate::core::forwarding::{self, ForwardResult};
use crate::core::ipr::MboxIprs;
use crate::core::lock::LockState;
use crate::core::queue::entry::{LqEntry, LqState, SqEntry, SqState};
use crate::core::queue::StoreQueue;

/// Records a translation fault's reason into `mmStat`, as PALcode would read
/// it back after `Ibox_Event` dispatches to the fault handler.
fn record_translation_fault(iprs: &mut MboxIprs, trap: Trap) {
    iprs.mm_stat = match trap {
        Trap::Tnv(_) => crate::core::ipr::MmStat { dtb_miss: true, ..Default::default() },
        Trap::Acv(_) => crate::core::ipr::MmStat { acv: true, ..Default::default() },
        Trap::For(_) | Trap::Fow(_) => crate::core::ipr::MmStat { fault: true, ..Default::default() },
        Trap::AlignmentFault(_) => iprs.mm_stat,
    };
}

/// True if `addr` is not naturally aligned to `width` — every Alpha Dstream
/// opcode the Mbox sees requires natural alignment; misaligned accesses
/// (`HW_LD`/`HW_ST` unaligned variants aside, which never reach the Mbox
/// as ordinary queue entries) fault rather than being split or rotated.
fn misaligned(addr: VirtAddr, width: Width) -> bool {
    addr.val() % width.bytes() != 0
}

/// True if a pass over this slot changed its state (made progress).
pub type Progress = bool;

/// Advances one LQ slot by exactly one state-machine step.
#[allow(clippy::too_many_arguments)]
pub fn advance_lq(
    slot: u32,
    entry: &mut LqEntry,
    sq: &StoreQueue,
    translator: &dyn Translator,
    dcache: &mut dyn DcacheAccess,
    bcache: &dyn BcacheAccess,
    cbox: &mut dyn CboxDispatch,
    ibox: &mut dyn IboxNotify,
    lock_state: &mut LockState,
    iprs: &mut MboxIprs,
    mode: AccessMode,
    mmio_base: u64,
) -> Progress {
    let Some(instr) = entry.instr else {
        return false;
    };

    match entry.state {
        LqState::QNotInUse | LqState::Assigned => false,

        LqState::Initial { virt_addr } => {
            let width = entry
                .pending_width
                .expect("Initial state always carries a width staged by ReadMem");
            if misaligned(virt_addr, width) {
                warn!(slot, "load alignment fault");
                ibox.notify_fault(instr, Trap::AlignmentFault(virt_addr.val()));
                *entry = LqEntry::empty();
                return true;
            }
            let result = translator.translate(virt_addr, AccessType::Read, mode);
            match result.trap {
                Some(trap) => {
                    warn!(slot, %trap, "load translation fault");
                    record_translation_fault(iprs, trap);
                    ibox.notify_fault(instr, trap);
                    *entry = LqEntry::empty();
                }
                None => {
                    let io = result.paddr.val() >= mmio_base;
                    trace!(slot, io, "load translated");
                    entry.state = LqState::LqReadPending {
                        virt_addr,
                        phys_addr: result.paddr,
                        width,
                        io,
                    };
                }
            }
            true
        }

        LqState::LqReadPending { virt_addr, phys_addr, width, io } => {
            if io {
                advance_lq_io(slot, entry, phys_addr, width, cbox, ibox, instr)
            } else {
                advance_lq_memory(
                    slot,
                    entry,
                    sq,
                    virt_addr,
                    phys_addr,
                    width,
                    dcache,
                    bcache,
                    cbox,
                    ibox,
                    lock_state,
                    iprs.dc_ctl.enabled,
                    instr,
                )
            }
        }

        LqState::LqComplete => {
            // Finalized inline by whichever branch above produced it; a
            // persistent LqComplete sighting means completion already
            // happened and the slot is stale. Free it defensively.
            *entry = LqEntry::empty();
            true
        }
    }
}

fn advance_lq_io(
    slot: u32,
    entry: &mut LqEntry,
    phys_addr: PhysAddr,
    width: crate::common::access::Width,
    cbox: &mut dyn CboxDispatch,
    _ibox: &mut dyn IboxNotify,
    _instr: crate::core::instr::InstrHandle,
) -> Progress {
    if entry.iowb_slot.is_some() {
        return false; // awaiting IOWBComplete
    }
    match cbox.add_iowb(phys_addr, slot, None, width) {
        Some(idx) => {
            debug!(slot, iowb = idx, "I/O load dispatched");
            entry.iowb_slot = Some(idx);
            true
        }
        None => false, // IOWB full; retry next pass
    }
}

#[allow(clippy::too_many_arguments)]
fn advance_lq_memory(
    slot: u32,
    entry: &mut LqEntry,
    sq: &StoreQueue,
    virt_addr: crate::common::addr::VirtAddr,
    phys_addr: PhysAddr,
    width: crate::common::access::Width,
    dcache: &mut dyn DcacheAccess,
    bcache: &dyn BcacheAccess,
    cbox: &mut dyn CboxDispatch,
    ibox: &mut dyn IboxNotify,
    lock_state: &mut LockState,
    dcache_enabled: bool,
    instr: crate::core::instr::InstrHandle,
) -> Progress {
    let is_lock = entry.lock;

    // Forwarding may supply the value even for a load-locked entry, but a
    // load-locked entry must still touch the cache to register its lock —
    // so a lock load never takes the early-return fast path here, even on a
    // forwarding hit.
    let forwarded = match forwarding::resolve(sq, virt_addr, width, entry.unique_id) {
        ForwardResult::Hit { value } => {
            if !is_lock {
                debug!(slot, value, "load satisfied by forwarding");
                ibox.notify_retirement_ready(instr, value);
                *entry = LqEntry::empty();
                return true;
            }
            Some(value)
        }
        ForwardResult::Stall => {
            trace!(slot, "load stalled on partial store overlap");
            return false;
        }
        ForwardResult::Miss => None,
    };

    let complete = |entry: &mut LqEntry, ibox: &mut dyn IboxNotify, value: u64| {
        if is_lock {
            lock_state.establish(phys_addr);
        }
        ibox.notify_retirement_ready(instr, value);
        *entry = LqEntry::empty();
    };

    // `dcCtl.enabled == false` models PALcode running with the Dcache
    // probed out (e.g. during a flush sequence): every access behaves as a
    // miss rather than actually reading `dcache.status`.
    let probe = if dcache_enabled { dcache.status(virt_addr, phys_addr) } else { CacheStatus::Miss };

    match probe {
        CacheStatus::Hit => {
            let value = forwarded.unwrap_or_else(|| dcache.read(virt_addr, phys_addr, width));
            debug!(slot, value, "load satisfied by dcache");
            complete(entry, ibox, value);
            true
        }
        CacheStatus::Miss => match bcache.status(phys_addr) {
            CacheStatus::Hit => {
                dcache.copy_from_bcache(virt_addr, phys_addr);
                let value = forwarded.unwrap_or_else(|| dcache.read(virt_addr, phys_addr, width));
                debug!(slot, value, "load satisfied by bcache fill");
                complete(entry, ibox, value);
                true
            }
            CacheStatus::Miss => {
                if entry.maf_slot.is_some() {
                    return false; // awaiting MAFComplete
                }
                match cbox.add_maf(MissKind::Ldx, phys_addr, slot, width) {
                    Some(idx) => {
                        debug!(slot, maf = idx, "load miss dispatched to MAF");
                        entry.maf_slot = Some(idx);
                        true
                    }
                    None => false, // MAF full; retry next pass
                }
            }
        },
    }
}

/// Advances one SQ slot by exactly one state-machine step.
#[allow(clippy::too_many_arguments)]
pub fn advance_sq(
    slot: u32,
    entry: &mut SqEntry,
    translator: &dyn Translator,
    dcache: &mut dyn DcacheAccess,
    ibox: &mut dyn IboxNotify,
    lock_state: &mut LockState,
    iprs: &mut MboxIprs,
    mode: AccessMode,
) -> Progress {
    let Some(instr) = entry.instr else {
        return false;
    };

    match entry.state {
        SqState::QNotInUse | SqState::Assigned => false,

        SqState::Initial { virt_addr, value, width } => {
            if misaligned(virt_addr, width) {
                warn!(slot, "store alignment fault");
                ibox.notify_fault(instr, Trap::AlignmentFault(virt_addr.val()));
                *entry = SqEntry::empty();
                return true;
            }
            let result = translator.translate(virt_addr, AccessType::Write, mode);
            match result.trap {
                Some(trap) => {
                    warn!(slot, %trap, "store translation fault");
                    record_translation_fault(iprs, trap);
                    ibox.notify_fault(instr, trap);
                    *entry = SqEntry::empty();
                }
                None => {
                    trace!(slot, "store translated");
                    entry.state = SqState::SqWritePending {
                        virt_addr,
                        phys_addr: result.paddr,
                        value,
                        width,
                    };
                }
            }
            true
        }

        SqState::SqWritePending { virt_addr, phys_addr, value, width } => {
            if !entry.retired {
                return false; // awaiting RetireStore
            }
            trace!(slot, "store retired, ready to commit");
            entry.state = SqState::SqReady {
                virt_addr,
                phys_addr,
                value,
                width,
            };
            true
        }

        SqState::SqReady { virt_addr, phys_addr, value, width } => {
            if entry.lock_cond {
                let success = lock_state.try_store_conditional(phys_addr);
                if success {
                    dcache.write(virt_addr, phys_addr, width, value);
                    debug!(slot, "store-conditional committed");
                } else {
                    debug!(slot, "store-conditional failed: coherence lost");
                }
                ibox.notify_retirement_ready(instr, u64::from(success));
            } else {
                dcache.write(virt_addr, phys_addr, width, value);
                debug!(slot, "store committed to dcache");
                ibox.notify_retirement_ready(instr, value);
            }
            *entry = SqEntry::empty();
            true
        }

        SqState::SqComplete { .. } => {
            *entry = SqEntry::empty();
            true
        }
    }
}
