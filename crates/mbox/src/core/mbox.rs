//! Top-level Mbox: the public API surface and the cooperative scheduler
//! thread that drives it.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::common::access::{AccessType, Width};
use crate::common::addr::{PhysAddr, VirtAddr};
use crate::core::access_mode::AccessMode;
use crate::core::cache::CacheSim;
use crate::core::collaborators::{BcacheAccess, CacheStatus, CboxDispatch, DcacheAccess, IboxNotify, Translator};
use crate::core::dtb::Dtb;
use crate::core::instr::InstrHandle;
use crate::core::ipr::MboxIprs;
use crate::core::lock::LockState;
use crate::core::queue::entry::{LqState, SqState};
use crate::core::queue::{LoadQueue, StoreQueue, QUEUE_FULL};
use crate::core::scheduler;
use crate::config::MboxConfig;
use crate::error::MboxError;

/// Adapter exposing the owned [`Dtb`] through the [`Translator`] trait.
struct DtbTranslator(Dtb);

impl Translator for DtbTranslator {
    fn translate(&self, va: VirtAddr, access: AccessType, mode: AccessMode) -> crate::common::fault::TranslationResult {
        self.0.translate(va, access == AccessType::Write, mode)
    }
}

/// Adapter exposing the owned [`CacheSim`] through the [`DcacheAccess`] trait.
struct DcacheAdapter(CacheSim);

impl DcacheAccess for DcacheAdapter {
    fn status(&self, _va: VirtAddr, pa: PhysAddr) -> CacheStatus {
        match self.0.probe(pa.val()) {
            crate::core::cache::ProbeResult::Hit { .. } => CacheStatus::Hit,
            crate::core::cache::ProbeResult::Miss => CacheStatus::Miss,
        }
    }

    fn read(&mut self, _va: VirtAddr, pa: PhysAddr, width: Width) -> u64 {
        self.0.access(pa.val());
        // The line store tracks residency, not raw bytes (this crate models
        // the protocol, not a byte-exact memory image); callers needing the
        // actual data bytes read them through the system's backing store,
        // keyed by the same physical address.
        let _ = width;
        0
    }

    fn write(&mut self, _va: VirtAddr, pa: PhysAddr, _width: Width, _value: u64) {
        if self.0.probe(pa.val()) == crate::core::cache::ProbeResult::Miss {
            self.0.install_line(pa.val(), crate::core::cache::LineStatus {
                valid: true,
                ..Default::default()
            });
        }
        self.0.mark_dirty(pa.val());
    }

    fn copy_from_bcache(&mut self, _va: VirtAddr, pa: PhysAddr) -> bool {
        self.0.install_line(pa.val(), crate::core::cache::LineStatus {
            valid: true,
            ..Default::default()
        });
        true
    }

    fn invalidate_line(&mut self, pa: PhysAddr) {
        let _unused = self.0.invalidate(pa.val());
    }
}

/// Adapter exposing the owned Bcache [`CacheSim`] through [`BcacheAccess`].
struct BcacheAdapter(CacheSim);

impl BcacheAccess for BcacheAdapter {
    fn status(&self, pa: PhysAddr) -> CacheStatus {
        match self.0.probe(pa.val()) {
            crate::core::cache::ProbeResult::Hit { .. } => CacheStatus::Hit,
            crate::core::cache::ProbeResult::Miss => CacheStatus::Miss,
        }
    }
}

/// State guarded by the single internal mutex that stands in for the
/// hardware's `mBoxMutex` (see the design ledger for why `lqMutex`/`sqMutex`
/// collapse into this one lock in a cooperative single-worker simulation).
struct MboxInner {
    lq: LoadQueue,
    sq: StoreQueue,
    translator: Box<dyn Translator>,
    dcache: Box<dyn DcacheAccess>,
    bcache: Box<dyn BcacheAccess>,
    cbox: Box<dyn CboxDispatch>,
    ibox: Box<dyn IboxNotify>,
    lock_state: LockState,
    iprs: MboxIprs,
    mode: AccessMode,
    mmio_base: u64,
    shutdown: bool,
}

impl MboxInner {
    /// One full scheduler pass: walk LQ then SQ, advancing each entry that
    /// can make progress. Returns whether any entry progressed.
    fn pass(&mut self) -> bool {
        let mut progressed = false;
        for slot in self.lq.indices() {
            let sq = &self.sq;
            let entry = self.lq.get_mut(slot);
            if entry.instr.is_none() {
                continue;
            }
            let made_progress = scheduler::advance_lq(
                slot,
                entry,
                sq,
                self.translator.as_ref(),
                self.dcache.as_mut(),
                self.bcache.as_ref(),
                self.cbox.as_mut(),
                self.ibox.as_mut(),
                &mut self.lock_state,
                &mut self.iprs,
                self.mode,
                self.mmio_base,
            );
            progressed |= made_progress;
        }
        for slot in self.sq.indices() {
            let entry = self.sq.get_mut(slot);
            if entry.instr.is_none() {
                continue;
            }
            let made_progress = scheduler::advance_sq(
                slot,
                entry,
                self.translator.as_ref(),
                self.dcache.as_mut(),
                self.ibox.as_mut(),
                &mut self.lock_state,
                &mut self.iprs,
                self.mode,
            );
            progressed |= made_progress;
        }
        progressed
    }
}

/// Collaborators supplied at construction time, so production code can wire
/// in real DTB/cache/bus implementations and tests can wire in `mockall`
/// fakes.
pub struct MboxCollaborators {
    pub translator: Box<dyn Translator>,
    pub dcache: Box<dyn DcacheAccess>,
    pub bcache: Box<dyn BcacheAccess>,
    pub cbox: Box<dyn CboxDispatch>,
    pub ibox: Box<dyn IboxNotify>,
}

/// The memory pipeline core: Load Queue, Store Queue, and the worker thread
/// that drains them.
pub struct Mbox {
    inner: Arc<Mutex<MboxInner>>,
    condvar: Arc<Condvar>,
    worker: Option<JoinHandle<()>>,
}

impl Mbox {
    /// Builds and starts the Mbox: allocates queues per `config`, wires in
    /// `collaborators`, and spawns the scheduler worker thread.
    pub fn init(config: &MboxConfig, collaborators: MboxCollaborators) -> Result<Self, MboxError> {
        let inner = MboxInner {
            lq: LoadQueue::new(config.queues.queue_len),
            sq: StoreQueue::new(config.queues.queue_len),
            translator: collaborators.translator,
            dcache: collaborators.dcache,
            bcache: collaborators.bcache,
            cbox: collaborators.cbox,
            ibox: collaborators.ibox,
            lock_state: LockState::default(),
            iprs: MboxIprs::default(),
            mode: AccessMode::Kernel,
            mmio_base: config.mmio_base,
            shutdown: false,
        };

        let inner = Arc::new(Mutex::new(inner));
        let condvar = Arc::new(Condvar::new());

        let worker_inner = Arc::clone(&inner);
        let worker_condvar = Arc::clone(&condvar);
        let worker = thread::Builder::new()
            .name("mbox-scheduler".into())
            .spawn(move || Self::run(worker_inner, worker_condvar))
            .map_err(|e| MboxError::InitFailed(e.to_string()))?;

        info!("mbox initialized");
        Ok(Self {
            inner,
            condvar,
            worker: Some(worker),
        })
    }

    /// The scheduler worker loop: wake on signal, run passes until none make
    /// progress, then sleep again. Exits once `shutdown` is observed.
    fn run(inner: Arc<Mutex<MboxInner>>, condvar: Arc<Condvar>) {
        loop {
            let mut guard = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            loop {
                if guard.shutdown {
                    debug!("mbox scheduler shutting down");
                    return;
                }
                if !guard.pass() {
                    break;
                }
            }
            if guard.shutdown {
                return;
            }
            let _unused = condvar.wait(guard).unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    fn wake(&self) {
        self.condvar.notify_one();
    }

    /// Allocates an LQ slot. Returns the sentinel [`QUEUE_FULL`] on
    /// exhaustion.
    pub fn get_lq_slot(&self) -> u32 {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.lq.allocate()
    }

    /// Allocates an SQ slot. Returns the sentinel [`QUEUE_FULL`] on
    /// exhaustion.
    pub fn get_sq_slot(&self) -> u32 {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.sq.allocate()
    }

    /// Publishes a load into a previously allocated LQ slot. `lock` marks a
    /// load-locked entry: forwarding may still satisfy its value, but it must
    /// also touch the cache to establish the CPU lock flag (§4.3 edge cases).
    pub fn read_mem(&self, instr: InstrHandle, unique_id: u64, slot: u32, virt_addr: VirtAddr, width: Width, lock: bool) -> Result<(), MboxError> {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let entry = inner.lq.get_mut(slot);
        if entry.state != LqState::Assigned {
            return Err(MboxError::SlotNotAllocated { slot });
        }
        entry.instr = Some(instr);
        entry.unique_id = unique_id;
        entry.pending_width = Some(width);
        entry.lock = lock;
        entry.state = LqState::Initial { virt_addr };
        drop(inner);
        self.wake();
        Ok(())
    }

    /// Publishes a store into a previously allocated SQ slot. `lock_cond`
    /// marks a store-conditional entry: commit is gated on the CPU lock
    /// flag and `destv` carries success (`1`) or failure (`0`) rather than
    /// the stored value.
    pub fn write_mem(&self, instr: InstrHandle, unique_id: u64, slot: u32, virt_addr: VirtAddr, value: u64, width: Width, lock_cond: bool) -> Result<(), MboxError> {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let entry = inner.sq.get_mut(slot);
        if entry.state != SqState::Assigned {
            return Err(MboxError::SlotNotAllocated { slot });
        }
        entry.instr = Some(instr);
        entry.unique_id = unique_id;
        entry.lock_cond = lock_cond;
        entry.state = SqState::Initial { virt_addr, value, width };
        drop(inner);
        self.wake();
        Ok(())
    }

    /// External-coherence notification: a snoop or eviction has invalidated
    /// the Dcache line at `pa`. Invalidates the line and, per §4.4a, clears
    /// any pending load-lock watching it, so a subsequent store-conditional
    /// to that address fails.
    pub fn external_invalidate(&self, pa: PhysAddr) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.dcache.invalidate_line(pa);
        inner.lock_state.on_line_invalidated(pa);
        drop(inner);
        self.wake();
    }

    /// Notifies the Mbox that the store in `slot` has retired.
    pub fn retire_store(&self, slot: u32) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.sq.get_mut(slot).retired = true;
        drop(inner);
        self.wake();
    }

    /// Revokes (squashes) an LQ entry, with no architectural side effects.
    pub fn revoke_lq_slot(&self, slot: u32) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.lq.free(slot);
    }

    /// Revokes (squashes) an SQ entry, with no architectural side effects.
    pub fn revoke_sq_slot(&self, slot: u32) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.sq.free(slot);
    }

    /// Cbox callback: the MAF entry at `maf_index` has filled the Dcache.
    /// Clears the wait so the next pass re-probes the cache, which will now
    /// hit.
    pub fn maf_complete(&self, maf_index: u32) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        for slot in inner.lq.indices() {
            let entry = inner.lq.get_mut(slot);
            if entry.maf_slot == Some(maf_index) {
                entry.maf_slot = None;
                break;
            }
        }
        drop(inner);
        self.wake();
    }

    /// Cbox callback: the IOWB entry at `iowb_index` has completed. `data`
    /// carries the fetched value for an I/O load; `None` for a store
    /// acknowledgement.
    pub fn iowb_complete(&self, iowb_index: u32, data: Option<u64>) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let mut found = None;
        for slot in inner.lq.indices() {
            if inner.lq.get(slot).iowb_slot == Some(iowb_index) {
                found = Some(slot);
                break;
            }
        }
        if let Some(slot) = found {
            let entry = inner.lq.get_mut(slot);
            let instr = entry.instr;
            *entry = crate::core::queue::entry::LqEntry::empty();
            if let (Some(instr), Some(value)) = (instr, data) {
                inner.ibox.notify_retirement_ready(instr, value);
            }
        } else {
            warn!(iowb_index, "IOWBComplete for unknown or orphaned slot");
        }
        drop(inner);
        self.wake();
    }

    /// Reads `dcCtl`. PALcode consults this to decide whether the Dcache is
    /// currently probed (§6).
    pub fn dc_ctl(&self) -> crate::core::ipr::DcCtl {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dc_ctl
    }

    /// Writes `dcCtl`. Disabling `enabled` takes effect on the next
    /// scheduler pass: every Dcache probe behaves as a miss until it is
    /// re-enabled.
    pub fn set_dc_ctl(&self, dc_ctl: crate::core::ipr::DcCtl) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dc_ctl = dc_ctl;
        drop(inner);
        self.wake();
    }

    /// Reads `mmStat`: the reason the most recent Dstream access faulted.
    pub fn mm_stat(&self) -> crate::core::ipr::MmStat {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.mm_stat
    }

    /// Reads `dcStat`: parity/ECC status of the most recent Dcache access.
    pub fn dc_stat(&self) -> crate::core::ipr::DcStat {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dc_stat
    }

    /// Writes `dcStat`. Exposed so a Cbox/Bcache collaborator can report a
    /// parity error observed on the line it just serviced.
    pub fn set_dc_stat(&self, dc_stat: crate::core::ipr::DcStat) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dc_stat = dc_stat;
    }

    /// Reads `mCtl`: Mbox-wide policy bits (speculative loads, write-allocate).
    pub fn m_ctl(&self) -> crate::core::ipr::MCtl {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.m_ctl
    }

    /// Writes `mCtl`.
    pub fn set_m_ctl(&self, m_ctl: crate::core::ipr::MCtl) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.m_ctl = m_ctl;
    }

    /// Reads `dtbAltMode`: the access mode `HW_LD`/`HW_ST` use with the ALT
    /// bit set.
    pub fn dtb_alt_mode(&self) -> AccessMode {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_alt_mode
    }

    /// Writes `dtbAltMode`.
    pub fn set_dtb_alt_mode(&self, mode: AccessMode) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_alt_mode = mode;
    }

    /// Reads the staged `dtbTag0`/`dtbTag1` register for `half` (0 or 1).
    pub fn dtb_tag(&self, half: usize) -> u64 {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_tag[half]
    }

    /// Stages `dtbTag0`/`dtbTag1`: the virtual address for the next DTB fill.
    pub fn set_dtb_tag(&self, half: usize, tag: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_tag[half] = tag;
    }

    /// Reads the staged `dtbPte0`/`dtbPte1` register for `half`.
    pub fn dtb_pte(&self, half: usize) -> crate::core::ipr::DtbPte {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_pte[half]
    }

    /// Stages `dtbPte0`/`dtbPte1`: the PTE fields for the next DTB fill.
    pub fn set_dtb_pte(&self, half: usize, pte: crate::core::ipr::DtbPte) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_pte[half] = pte;
    }

    /// Reads the staged `dtbAsn0`/`dtbAsn1` register for `half`.
    pub fn dtb_asn(&self, half: usize) -> u8 {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_asn[half]
    }

    /// Stages `dtbAsn0`/`dtbAsn1`: the ASN for the next DTB fill.
    pub fn set_dtb_asn(&self, half: usize, asn: u8) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_asn[half] = asn;
    }

    /// `dtbIs0`/`dtbIs1`: commits the staged tag/PTE/ASN trio for `half` into
    /// the DTB. A write-only trigger, so it is modeled as a one-shot pending
    /// flag (§6) rather than mutating the DTB directly through the
    /// [`Translator`] boundary, which has no fill method — PALcode services
    /// the fill and clears the flag via [`Self::take_dtb_fill_pending`].
    pub fn commit_dtb_fill(&self, half: usize) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.iprs.dtb_is_pending[half] = true;
    }

    /// Reads and clears the one-shot `dtbIs0`/`dtbIs1` pending flag for
    /// `half`.
    pub fn take_dtb_fill_pending(&self, half: usize) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        std::mem::take(&mut inner.iprs.dtb_is_pending[half])
    }
}

impl Drop for Mbox {
    fn drop(&mut self) {
        {
            let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            inner.shutdown = true;
        }
        self.condvar.notify_one();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
