//! Fake Dcache/Bcache collaborators, backed by a shared [`super::Backing`].
//!
//! Residency is tracked explicitly (there's no real set-associative geometry
//! here) so a test can put a line in the Bcache but not the Dcache to drive
//! the miss-then-fill path of §4.4, or in neither to force a MAF allocation.

use std::sync::Arc;

use mbox_core::common::addr::{PhysAddr, VirtAddr};
use mbox_core::common::access::Width;
use mbox_core::core::collaborators::{BcacheAccess, CacheStatus, DcacheAccess};

use super::Backing;

fn mask(value: u64, width: Width) -> u64 {
    if width.bytes() >= 8 {
        value
    } else {
        value & ((1u64 << (width.bytes() * 8)) - 1)
    }
}

/// Fake Dcache: status/read/write/fill against the shared backing store.
pub struct FakeDcache(pub Arc<Backing>);

impl DcacheAccess for FakeDcache {
    fn status(&self, _va: VirtAddr, pa: PhysAddr) -> CacheStatus {
        if self.0.dcache_contains(pa.val()) {
            CacheStatus::Hit
        } else {
            CacheStatus::Miss
        }
    }

    fn read(&mut self, _va: VirtAddr, pa: PhysAddr, width: Width) -> u64 {
        mask(self.0.read(pa.val()), width)
    }

    fn write(&mut self, _va: VirtAddr, pa: PhysAddr, width: Width, value: u64) {
        self.0.install_dcache(pa.val());
        self.0.write(pa.val(), mask(value, width));
    }

    fn copy_from_bcache(&mut self, _va: VirtAddr, pa: PhysAddr) -> bool {
        if self.0.bcache_contains(pa.val()) {
            self.0.install_dcache(pa.val());
            true
        } else {
            false
        }
    }

    fn invalidate_line(&mut self, pa: PhysAddr) {
        self.0.invalidate_dcache(pa.val());
    }
}

/// Fake Bcache: status only — the Mbox never reads/writes it directly.
pub struct FakeBcache(pub Arc<Backing>);

impl BcacheAccess for FakeBcache {
    fn status(&self, pa: PhysAddr) -> CacheStatus {
        if self.0.bcache_contains(pa.val()) {
            CacheStatus::Hit
        } else {
            CacheStatus::Miss
        }
    }
}
