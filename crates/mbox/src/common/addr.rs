//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses to prevent
//! accidental mixing of address spaces. It provides the following:
//! 1. **Type Safety:** Distinguishes between virtual and physical address spaces at compile time.
//! 2. **Address Manipulation:** Provides helper methods for extracting page offsets and raw values.
//! 3. **DTB Integration:** Acts as the primary interface for memory translation operations.

/// A virtual address in the Alpha 64-bit address space.
///
/// Virtual addresses are produced by the Ebox/Fbox and must be translated to
/// physical addresses through the DTB before the Mbox touches the Dcache/Bcache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtAddr(pub u64);

/// A physical address in the Alpha 64-bit address space.
///
/// Physical address `0` is a perfectly ordinary address; translation failure is
/// never signalled by its value (see [`crate::common::fault::TranslationResult`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub fn val(&self) -> u64 {
        self.0
    }

    /// Extracts the page offset (low 13 bits, 8 KiB Alpha pages).
    pub fn page_offset(&self) -> u64 {
        self.0 & 0x1FFF
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub fn val(&self) -> u64 {
        self.0
    }
}
