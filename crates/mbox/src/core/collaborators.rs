//! External-collaborator traits.
//!
//! The Mbox never owns a DTB, Dcache, Bcache, system bus, or instruction
//! window directly in its public API — it calls out to these narrow traits,
//! mirroring the `Device` trait used elsewhere in this codebase to keep a
//! subsystem mockable in isolation. Production wiring supplies real
//! implementations (e.g. [`crate::core::dtb::Dtb`], [`crate::core::cache::CacheSim`]);
//! tests supply `mockall`-generated fakes.

use crate::common::access::{AccessType, Width};
use crate::common::addr::{PhysAddr, VirtAddr};
use crate::common::fault::{TranslationResult, Trap};
use crate::core::access_mode::AccessMode;
use crate::core::instr::InstrHandle;

/// Virtual-to-physical translation, backed by the DTB.
#[cfg_attr(test, mockall::automock)]
pub trait Translator: Send + Sync {
    /// Translates `va` for `access` under `mode`.
    fn translate(&self, va: VirtAddr, access: AccessType, mode: AccessMode) -> TranslationResult;
}

/// Outcome of a cache status probe, as seen by the collaborator interface
/// (deliberately coarser than [`crate::core::cache::ProbeResult`] — callers
/// outside this crate never see way indices).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// The Dcache collaborator: status queries, reads/writes, and fills from the
/// Bcache.
#[cfg_attr(test, mockall::automock)]
pub trait DcacheAccess: Send + Sync {
    /// Probes Dcache residency for `(va, pa)` without side effects.
    fn status(&self, va: VirtAddr, pa: PhysAddr) -> CacheStatus;

    /// Reads `width` bytes starting at `pa` from a resident line.
    ///
    /// Panics if the line is not resident; callers must check `status` first.
    fn read(&mut self, va: VirtAddr, pa: PhysAddr, width: Width) -> u64;

    /// Writes `width` low-order bytes of `value` into a resident line,
    /// marking it dirty.
    ///
    /// Panics if the line is not resident; callers must check `status` first.
    fn write(&mut self, va: VirtAddr, pa: PhysAddr, width: Width, value: u64);

    /// Copies the Bcache's line for `pa` into the Dcache, evicting a victim
    /// if necessary. Returns `true` if the copy happened (i.e. the Bcache
    /// line was in fact resident).
    fn copy_from_bcache(&mut self, va: VirtAddr, pa: PhysAddr) -> bool;

    /// Invalidates the line holding `pa`, if resident. Driven by an external
    /// coherence notification (snoop, eviction) rather than by the Mbox's
    /// own load/store traffic.
    fn invalidate_line(&mut self, pa: PhysAddr);
}

/// The Bcache collaborator: status queries only (the Mbox never reads/writes
/// the Bcache directly; a miss dispatches to the Cbox instead).
#[cfg_attr(test, mockall::automock)]
pub trait BcacheAccess: Send + Sync {
    /// Probes Bcache residency for `pa`.
    fn status(&self, pa: PhysAddr) -> CacheStatus;
}

/// Kind of outstanding miss tracked by a MAF entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissKind {
    /// Load miss.
    Ldx,
    /// Store miss (only used when a store must itself allocate a line, e.g.
    /// under a no-write-allocate policy override; see `core::maf`).
    Stx,
}

/// The Cbox dispatch collaborator: enqueues MAF/IOWB miss requests.
#[cfg_attr(test, mockall::automock)]
pub trait CboxDispatch: Send + Sync {
    /// Enqueues a MAF (cacheable miss) entry. Returns the allocated MAF
    /// index, or `None` if the MAF is full (the caller must retry on a
    /// later scheduler pass).
    fn add_maf(&mut self, kind: MissKind, pa: PhysAddr, owner_slot: u32, len: Width) -> Option<u32>;

    /// Enqueues an IOWB (I/O) entry. `data` is `Some` for a store, `None` for
    /// a load. Returns the allocated IOWB index, or `None` if full.
    fn add_iowb(&mut self, pa: PhysAddr, owner_slot: u32, data: Option<u64>, len: Width) -> Option<u32>;
}

/// The Ibox notification collaborator: faults and retirement-readiness.
#[cfg_attr(test, mockall::automock)]
pub trait IboxNotify: Send + Sync {
    /// Reports an architectural fault raised while processing `instr`.
    fn notify_fault(&mut self, instr: InstrHandle, trap: Trap);

    /// Reports that `instr`'s Mbox work is done and it may retire whenever
    /// program order allows. This is the sole point where the Mbox drives an
    /// instruction's lifecycle state to `WaitingRetirement`; the embedding
    /// instruction window owns the state itself and advances it from here.
    fn notify_retirement_ready(&mut self, instr: InstrHandle, destv: u64);
}
