//! Global Mbox Constants.
//!
//! Flat, named constants mirroring the 21264 HRM's Mbox section. These are the
//! values every other module reaches for rather than re-deriving geometry inline.

/// Number of slots in the Load Queue and the Store Queue.
///
/// Also doubles as the "queue full" sentinel returned by the slot allocator.
pub const AXP_MBOX_QUEUE_LEN: usize = 32;

/// Number of entries in the data translation buffer.
pub const AXP_TB_LEN: usize = 32;

/// Number of sets in the two-way set-associative Dcache.
pub const AXP_CACHE_ENTRIES: usize = 512;

/// Associativity of the Dcache.
pub const AXP_CACHE_WAYS: usize = 2;

/// Dcache/Bcache line size in bytes.
pub const AXP_CACHE_LINE_BYTES: usize = 64;

/// Number of entries in the Bcache.
pub const AXP_BCACHE_ENTRIES: usize = 4096;

/// Associativity of the Bcache.
pub const AXP_BCACHE_WAYS: usize = 1;

/// Number of Miss Address File entries.
pub const AXP_MAF_LEN: usize = 8;

/// Number of I/O Write Buffer entries.
pub const AXP_IOWB_LEN: usize = 4;

/// Base physical address of the MMIO aperture; addresses at or above this are I/O.
pub const AXP_MMIO_BASE: u64 = 0x8_0000_0000;

/// Page size in bytes (8 KiB Alpha pages).
pub const PAGE_SIZE: u64 = 8192;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u64 = 13;

/// Width, in bytes, of an Alpha longword access (`AXP_HW_LD_LONGWORD`).
pub const AXP_HW_LD_LONGWORD: u64 = 4;

/// Width, in bytes, of an Alpha quadword access.
pub const AXP_HW_LD_QUADWORD: u64 = 8;
