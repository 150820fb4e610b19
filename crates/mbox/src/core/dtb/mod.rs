//! Data Translation Buffer.
//!
//! A fully-associative cache of recent virtual-to-physical translations,
//! looked up by `(virtual page number, address-space number)`. The DTB never
//! walks a page table itself on a miss — a miss is reported as `Trap::Tnv`
//! and it is PALcode, not the Mbox, that walks the page table and issues a
//! fill (`dtbIs0`/`dtbIs1` IPR writes, routed through [`Dtb::fill`]).

use crate::common::addr::{PhysAddr, VirtAddr};
use crate::common::constants::{AXP_TB_LEN, PAGE_SHIFT};
use crate::common::fault::{TranslationResult, Trap};
use crate::core::access_mode::AccessMode;

/// A resident DTB entry: one page-granularity translation.
#[derive(Clone, Copy, Debug)]
struct DtbEntry {
    vpn: u64,
    asn: u8,
    asm: bool,
    pfn: u64,
    read_enable: [bool; 4],
    write_enable: [bool; 4],
    for_: bool,
    fow: bool,
}

/// Data Translation Buffer: a small, fully-associative set of page
/// translations, probed on every Dstream access before the Dcache.
pub struct Dtb {
    entries: Vec<Option<DtbEntry>>,
    /// Next slot to overwrite on a fill (round-robin, matching the 21264's
    /// "not-last-used" replacement approximated here as simple rotation).
    next_fill: usize,
    current_asn: u8,
}

impl Dtb {
    /// Builds an empty DTB with `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
            next_fill: 0,
            current_asn: 0,
        }
    }

    /// Sets the address-space number used to qualify lookups (mirrors a
    /// `swpctx` PALcall updating the running ASN).
    pub fn set_current_asn(&mut self, asn: u8) {
        self.current_asn = asn;
    }

    fn vpn(addr: VirtAddr) -> u64 {
        addr.val() >> PAGE_SHIFT
    }

    fn find(&self, vpn: u64) -> Option<&DtbEntry> {
        self.entries.iter().flatten().find(|e| {
            e.vpn == vpn && (e.asm || e.asn == self.current_asn)
        })
    }

    /// Translates `addr` for `access` under `mode`.
    ///
    /// On a DTB miss, returns `Trap::Tnv` rather than walking anything: the
    /// caller (PALcode, via the Ibox) is responsible for the page-table walk
    /// and for calling [`Dtb::fill`] afterward.
    pub fn translate(
        &self,
        addr: VirtAddr,
        is_write: bool,
        mode: AccessMode,
    ) -> TranslationResult {
        let vpn = Self::vpn(addr);
        let Some(entry) = self.find(vpn) else {
            return TranslationResult::fault(Trap::Tnv(addr.val()));
        };

        let allowed = if is_write {
            entry.write_enable[mode.index()]
        } else {
            entry.read_enable[mode.index()]
        };
        if !allowed {
            return TranslationResult::fault(Trap::Acv(addr.val()));
        }
        if is_write && entry.fow {
            return TranslationResult::fault(Trap::Fow(addr.val()));
        }
        if !is_write && entry.for_ {
            return TranslationResult::fault(Trap::For(addr.val()));
        }

        let offset = addr.val() & ((1u64 << PAGE_SHIFT) - 1);
        TranslationResult::success(PhysAddr((entry.pfn << PAGE_SHIFT) | offset))
    }

    /// Installs or replaces a translation, as if PALcode had just completed a
    /// page-table walk and written `dtbTag0`/`dtbPte0`/`dtbIs0`.
    #[allow(clippy::too_many_arguments)]
    pub fn fill(
        &mut self,
        vaddr: VirtAddr,
        asn: u8,
        asm: bool,
        pfn: u64,
        read_enable: [bool; 4],
        write_enable: [bool; 4],
        for_: bool,
        fow: bool,
    ) {
        let entry = DtbEntry {
            vpn: Self::vpn(vaddr),
            asn,
            asm,
            pfn,
            read_enable,
            write_enable,
            for_,
            fow,
        };
        let len = self.entries.len();
        self.entries[self.next_fill] = Some(entry);
        self.next_fill = (self.next_fill + 1) % len;
    }

    /// Invalidates every DTB entry (`dtbIa` single-address or all-entry
    /// invalidate IPR write).
    pub fn invalidate_all(&mut self) {
        for slot in &mut self.entries {
            *slot = None;
        }
    }

    /// Invalidates entries matching `asn` only (used by `dtbIap`).
    pub fn invalidate_asn(&mut self, asn: u8) {
        for slot in &mut self.entries {
            if slot.is_some_and(|e| !e.asm && e.asn == asn) {
                *slot = None;
            }
        }
    }
}

impl Default for Dtb {
    fn default() -> Self {
        Self::new(AXP_TB_LEN)
    }
}
