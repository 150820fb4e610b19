//! Load-lock / store-conditional bookkeeping.
//!
//! The CPU-wide lock flag and the physical line it watches. Forwarding is
//! still permitted to satisfy a load-locked instruction's value, but the
//! lock itself is only established once the load touches the cache (§4.3
//! edge cases), so the scheduler must route every load-locked entry through
//! `TryCaches` regardless of a forwarding hit.

use crate::common::addr::PhysAddr;

/// Per-CPU load-lock state.
#[derive(Clone, Copy, Debug, Default)]
pub struct LockState {
    /// Set once a load-lock retires and the watched line is still coherent.
    flag: bool,
    /// Physical address the flag is watching.
    watched: Option<PhysAddr>,
}

impl LockState {
    /// Establishes the lock on `pa`, as a load-locked instruction retires.
    pub fn establish(&mut self, pa: PhysAddr) {
        self.flag = true;
        self.watched = Some(pa);
    }

    /// Clears the lock unconditionally, e.g. on an external invalidation of
    /// the watched line.
    pub fn clear(&mut self) {
        self.flag = false;
        self.watched = None;
    }

    /// Invalidation hook: if the coherence protocol evicts or invalidates
    /// `pa`, any lock watching it is lost.
    pub fn on_line_invalidated(&mut self, pa: PhysAddr) {
        if self.watched == Some(pa) {
            self.clear();
        }
    }

    /// Attempts a store-conditional against `pa`. Returns `true` (success) if
    /// the flag is set and still watching `pa`; the flag is cleared either
    /// way, per "every store-conditional clears the lock flag regardless of
    /// outcome."
    pub fn try_store_conditional(&mut self, pa: PhysAddr) -> bool {
        let success = self.flag && self.watched == Some(pa);
        self.clear();
        success
    }
}
