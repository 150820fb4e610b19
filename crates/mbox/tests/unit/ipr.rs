//! IPR read/write accessors (§4.7 reset state, §6 PAL-visible surface).

use std::time::Duration;

use mbox_core::common::access::Width;
use mbox_core::common::addr::VirtAddr;
use mbox_core::common::fault::Trap;
use mbox_core::core::access_mode::AccessMode;
use mbox_core::core::ipr::{DcCtl, DtbPte, MCtl};

use crate::common::harness::TestMbox;

/// §4.7 `init()`: both Dcache ways enabled and probing, `dtbAltMode`
/// defaulting to `Kernel`.
#[test]
fn reset_state_matches_architectural_defaults() {
    let h = TestMbox::new();
    let dc_ctl = h.mbox.dc_ctl();
    assert!(dc_ctl.enabled);
    assert_eq!(dc_ctl.set_en, 0b11);
    assert!(!dc_ctl.flush_pending);
    assert_eq!(h.mbox.dtb_alt_mode(), AccessMode::Kernel);
    assert_eq!(h.mbox.mm_stat(), Default::default());
    assert_eq!(h.mbox.m_ctl(), MCtl::default());
}

/// Disabling `dcCtl.enabled` forces every Dcache probe to miss, so a load
/// whose line is resident only in the Dcache (not the Bcache) is treated as
/// a full miss and allocates a MAF entry instead of hitting immediately.
#[test]
fn disabling_dcache_forces_a_miss() {
    let h = TestMbox::new();
    let pa = mbox_core::common::addr::PhysAddr::new(0x9000);
    let va = VirtAddr::new(0x9000);
    h.install_dcache(pa);

    h.mbox.set_dc_ctl(DcCtl { enabled: false, set_en: 0b11, flush_pending: false });

    let (slot, _load) = h.issue_load(1, va, Width::Quadword, false);
    h.wait_maf_for_slot(slot);
}

/// A reported translation-not-valid fault is reflected in `mmStat` the way
/// PALcode would read it back from the fault handler.
#[test]
fn translation_fault_populates_mm_stat() {
    let h = TestMbox::new();
    let va = VirtAddr::new(0x6100);
    h.inject_fault(va, Trap::Tnv(0x6100));

    let (_, load) = h.issue_load(1, va, Width::Quadword, false);
    h.wait_fault(load);

    std::thread::sleep(Duration::from_millis(5));
    let mm_stat = h.mbox.mm_stat();
    assert!(mm_stat.dtb_miss);
    assert!(!mm_stat.acv);
    assert!(!mm_stat.fault);
}

/// An access-violation fault sets `mmStat.acv` rather than `dtbMiss`.
#[test]
fn access_violation_fault_populates_mm_stat() {
    let h = TestMbox::new();
    let va = VirtAddr::new(0x6200);
    h.inject_fault(va, Trap::Acv(0x6200));

    let (_, store) = h.issue_store(1, va, 0, Width::Quadword, false);
    h.wait_fault(store);

    std::thread::sleep(Duration::from_millis(5));
    let mm_stat = h.mbox.mm_stat();
    assert!(mm_stat.acv);
    assert!(!mm_stat.dtb_miss);
}

/// The `dtbTag`/`dtbPte`/`dtbAsn` staging registers and the `dtbIs` one-shot
/// trigger round-trip independently per half.
#[test]
fn dtb_fill_staging_round_trips_per_half() {
    let h = TestMbox::new();
    let pte = DtbPte { pfn: 0x123, for_: false, fow: true, asm: false, gh: 0, read_enable: [true; 4], write_enable: [false; 4] };

    h.mbox.set_dtb_tag(0, 0xDEAD_0000);
    h.mbox.set_dtb_pte(0, pte);
    h.mbox.set_dtb_asn(0, 7);

    assert_eq!(h.mbox.dtb_tag(0), 0xDEAD_0000);
    assert_eq!(h.mbox.dtb_pte(0), pte);
    assert_eq!(h.mbox.dtb_asn(0), 7);
    assert_eq!(h.mbox.dtb_tag(1), 0);

    assert!(!h.mbox.take_dtb_fill_pending(0));
    h.mbox.commit_dtb_fill(0);
    assert!(h.mbox.take_dtb_fill_pending(0));
    // One-shot: a second read observes the flag already cleared.
    assert!(!h.mbox.take_dtb_fill_pending(0));
}
