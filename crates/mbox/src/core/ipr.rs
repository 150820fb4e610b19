//! Internal Processor Register state touched by the Mbox.
//!
//! Flat, named fields mirroring the 21264 HRM's Mbox IPR set, rather than a
//! CSR index/decode table: the Mbox only ever touches a fixed handful of
//! these, so there is no dispatch table to build.

use crate::core::access_mode::AccessMode;

/// One data TLB fill register pair, written by PALcode before `dtbIs0/1` commits
/// a new translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DtbPte {
    /// Physical frame number.
    pub pfn: u64,
    /// Fault-on-read.
    pub for_: bool,
    /// Fault-on-write.
    pub fow: bool,
    /// Address-space-match (ignore ASN on lookup).
    pub asm: bool,
    /// Granularity hint (superpage size).
    pub gh: u8,
    /// Per-mode read-enable bits, indexed by [`AccessMode::index`].
    pub read_enable: [bool; 4],
    /// Per-mode write-enable bits, indexed by [`AccessMode::index`].
    pub write_enable: [bool; 4],
}

/// Mbox-visible IPR state: the two DTB fill staging registers, the current
/// address-space number, and the last fault's status.
#[derive(Clone, Copy, Debug)]
pub struct MboxIprs {
    /// `dtbTag0`/`dtbTag1`: virtual address staged for the next DTB fill.
    pub dtb_tag: [u64; 2],
    /// `dtbPte0`/`dtbPte1`: PTE fields staged for the next DTB fill.
    pub dtb_pte: [DtbPte; 2],
    /// `dtbIs0`/`dtbIs1`: write-only triggers that commit the staged
    /// `dtbTag`/`dtbPte` pair into the DTB for mode 0 / mode 1 respectively.
    /// Modeled as a one-shot-pending flag per half rather than a real write
    /// side effect, since PALcode drives the actual DTB fill.
    pub dtb_is_pending: [bool; 2],
    /// `dtbAsn0`/`dtbAsn1`: address space number staged for the next fill.
    pub dtb_asn: [u8; 2],
    /// `dtbAltMode`: access mode used by `HW_LD`/`HW_ST` with the ALT bit set.
    pub dtb_alt_mode: AccessMode,
    /// `mmStat`: status of the most recent Dstream miss/fault.
    pub mm_stat: MmStat,
    /// `mCtl`: Mbox-wide control bits (speculative-load enable, Dcache
    /// write-allocate mode).
    pub m_ctl: MCtl,
    /// `dcCtl`: Dcache control bits (flush requests, per-way enable).
    pub dc_ctl: DcCtl,
    /// `dcStat`: parity/status of the most recent Dcache access.
    pub dc_stat: DcStat,
}

impl Default for MboxIprs {
    /// Architectural reset values (§4.7 `init()`): both Dcache ways enabled
    /// and probing, `dtbAltMode` defaulting to `Kernel`; every other IPR
    /// resets to zero.
    fn default() -> Self {
        Self {
            dtb_tag: [0; 2],
            dtb_pte: [DtbPte::default(); 2],
            dtb_is_pending: [false; 2],
            dtb_asn: [0; 2],
            dtb_alt_mode: AccessMode::default(),
            mm_stat: MmStat::default(),
            m_ctl: MCtl::default(),
            dc_ctl: DcCtl {
                enabled: true,
                set_en: 0b11,
                flush_pending: false,
            },
            dc_stat: DcStat::default(),
        }
    }
}

/// `mmStat` fields: the reason the most recent Dstream operation faulted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MmStat {
    /// Translation not valid.
    pub dtb_miss: bool,
    /// Access violation.
    pub acv: bool,
    /// Fault-on-read / fault-on-write, whichever applied.
    pub fault: bool,
    /// Opcode of the faulting instruction (for PALcode dispatch).
    pub opcode: u8,
}

/// `mCtl` bits: Mbox-wide policy switches, as opposed to `dcCtl`'s
/// per-cache-way bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MCtl {
    /// Speculative (out-of-order) loads are permitted to issue ahead of
    /// older stores to an unknown address.
    pub spec_en: bool,
    /// Stores that miss the Dcache allocate a line rather than writing
    /// through directly.
    pub write_allocate: bool,
}

/// `dcCtl` bits relevant to the Mbox's own cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DcCtl {
    /// Dcache is enabled for probes (disabled during certain PAL sequences).
    pub enabled: bool,
    /// Per-way enable mask; reset value enables both Dcache ways.
    pub set_en: u8,
    /// A full Dcache flush has been requested and not yet serviced.
    pub flush_pending: bool,
}

/// `dcStat` fields: parity/ECC status of the most recent Dcache access, read
/// by PALcode after a reported Dcache fault to distinguish a data error from
/// an ordinary miss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DcStat {
    /// A tag parity error was detected on the last probe.
    pub tperr: bool,
    /// A data parity error was detected on the last read.
    pub dperr: bool,
    /// Raw `set_0_1` pseudo-LRU hint bit for the last-accessed set, mirrored
    /// here from [`crate::core::cache::LineStatus::set_0_1`] for PALcode
    /// that reads it through `dcStat` rather than the cache directly.
    pub set_0_1: bool,
}
