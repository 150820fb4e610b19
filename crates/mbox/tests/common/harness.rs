//! A `Mbox` wired to the fakes in [`super::mocks`], plus the polling helpers
//! an end-to-end test needs to observe results coming back from the
//! scheduler's own worker thread.

use std::sync::Arc;
use std::time::Duration;

use mbox_core::common::access::Width;
use mbox_core::common::addr::{PhysAddr, VirtAddr};
use mbox_core::common::fault::Trap;
use mbox_core::config::MboxConfig;
use mbox_core::core::instr::InstrHandle;
use mbox_core::{Mbox, MboxCollaborators};

use super::mocks::cbox::CboxHandle;
use super::mocks::ibox::Event;
use super::mocks::{Backing, FakeBcache, FakeCbox, FakeDcache, FakeIbox, FakeTranslator};

/// How long a test will wait for the scheduler thread to report a result
/// before treating it as a failure. Generous because CI machines can be
/// slow and under load; the scheduler itself does no real waiting.
const TIMEOUT: Duration = Duration::from_secs(2);

/// An `Mbox` plus everything needed to drive it and observe its output from
/// outside the crate.
pub struct TestMbox {
    pub mbox: Mbox,
    backing: Arc<Backing>,
    translator: FakeTranslator,
    events: super::mocks::ibox::EventLog,
    cbox: CboxHandle,
}

impl TestMbox {
    /// Builds an `Mbox` at the default queue/cache geometry, wired to fresh
    /// fakes.
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let backing = Arc::new(Backing::new());
        let translator = FakeTranslator::new();
        let cbox = FakeCbox::new(8, 4);
        let ibox = FakeIbox::new();

        let cbox_handle = cbox.handle();
        let events = ibox.handle();

        let collaborators = MboxCollaborators {
            translator: Box::new(translator.clone()),
            dcache: Box::new(FakeDcache(Arc::clone(&backing))),
            bcache: Box::new(FakeBcache(Arc::clone(&backing))),
            cbox: Box::new(cbox),
            ibox: Box::new(ibox),
        };

        let mbox = Mbox::init(&MboxConfig::default(), collaborators).expect("mbox init");

        Self {
            mbox,
            backing,
            translator,
            events,
            cbox: cbox_handle,
        }
    }

    /// Publishes a load. `unique_id` also serves as the instruction handle's
    /// identity, which is unique enough for a single test's scenario.
    pub fn issue_load(&self, unique_id: u64, virt_addr: VirtAddr, width: Width, lock: bool) -> (u32, InstrHandle) {
        let slot = self.mbox.get_lq_slot();
        let instr = InstrHandle::new(unique_id as u32, 0);
        self.mbox
            .read_mem(instr, unique_id, slot, virt_addr, width, lock)
            .expect("read_mem on a freshly allocated slot");
        (slot, instr)
    }

    /// Publishes a store.
    pub fn issue_store(&self, unique_id: u64, virt_addr: VirtAddr, value: u64, width: Width, lock_cond: bool) -> (u32, InstrHandle) {
        let slot = self.mbox.get_sq_slot();
        let instr = InstrHandle::new(unique_id as u32, 0);
        self.mbox
            .write_mem(instr, unique_id, slot, virt_addr, value, width, lock_cond)
            .expect("write_mem on a freshly allocated slot");
        (slot, instr)
    }

    pub fn retire_store(&self, slot: u32) {
        self.mbox.retire_store(slot);
    }

    pub fn external_invalidate(&self, pa: PhysAddr) {
        self.mbox.external_invalidate(pa);
    }

    /// Waits for `instr`'s retirement value, panicking on timeout or if a
    /// fault arrived instead.
    pub fn wait_retired(&self, instr: InstrHandle) -> u64 {
        match self.events.wait_for(instr, TIMEOUT) {
            Some(Event::Retired(_, destv)) => destv,
            Some(Event::Fault(_, trap)) => panic!("expected retirement, got fault {trap}"),
            None => panic!("timed out waiting for retirement of {instr:?}"),
        }
    }

    /// Waits for `instr`'s fault, panicking on timeout or if it retired
    /// instead.
    pub fn wait_fault(&self, instr: InstrHandle) -> Trap {
        match self.events.wait_for(instr, TIMEOUT) {
            Some(Event::Fault(_, trap)) => trap,
            Some(Event::Retired(_, destv)) => panic!("expected fault, got retirement destv={destv}"),
            None => panic!("timed out waiting for fault on {instr:?}"),
        }
    }

    pub fn inject_fault(&self, virt_addr: VirtAddr, trap: Trap) {
        self.translator.inject_fault(virt_addr, trap);
    }

    pub fn install_bcache(&self, pa: PhysAddr) {
        self.backing.install_bcache(pa.val());
    }

    pub fn install_dcache(&self, pa: PhysAddr) {
        self.backing.install_dcache(pa.val());
    }

    pub fn mem_read(&self, pa: PhysAddr) -> u64 {
        self.backing.read(pa.val())
    }

    pub fn mem_write(&self, pa: PhysAddr, value: u64) {
        self.backing.write(pa.val(), value);
    }

    /// Non-blocking check for `instr`'s retirement, for tests that must
    /// assert the *absence* of progress (e.g. a stalled load).
    pub fn poll_retired(&self, instr: InstrHandle) -> Option<u64> {
        match self.events.poll(instr) {
            Some(Event::Retired(_, destv)) => Some(destv),
            _ => None,
        }
    }

    pub fn maf_request(&self, idx: u32) -> Option<super::mocks::cbox::MafRequest> {
        self.cbox.maf_request(idx)
    }

    pub fn iowb_request(&self, idx: u32) -> Option<super::mocks::cbox::IowbRequest> {
        self.cbox.iowb_request(idx)
    }

    /// Polls until the scheduler has dispatched a MAF entry for `owner_slot`.
    pub fn wait_maf_for_slot(&self, owner_slot: u32) -> u32 {
        let deadline = std::time::Instant::now() + TIMEOUT;
        loop {
            if let Some(idx) = self.cbox.find_maf_for_slot(owner_slot) {
                return idx;
            }
            assert!(std::time::Instant::now() < deadline, "timed out waiting for a MAF dispatch on slot {owner_slot}");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Polls until the scheduler has dispatched an IOWB entry for
    /// `owner_slot`.
    pub fn wait_iowb_for_slot(&self, owner_slot: u32) -> u32 {
        let deadline = std::time::Instant::now() + TIMEOUT;
        loop {
            if let Some(idx) = self.cbox.find_iowb_for_slot(owner_slot) {
                return idx;
            }
            assert!(std::time::Instant::now() < deadline, "timed out waiting for an IOWB dispatch on slot {owner_slot}");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn maf_complete(&self, idx: u32) {
        self.mbox.maf_complete(idx);
    }

    pub fn iowb_complete(&self, idx: u32, data: Option<u64>) {
        self.mbox.iowb_complete(idx, data);
    }
}
