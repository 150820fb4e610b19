//! Trap and Translation Result definitions.
//!
//! This module defines the fault vocabulary the Mbox reports up to the Ibox, and
//! the result type produced by a DTB translation. Resolves design note §9(c):
//! a translated physical address of zero is an ordinary address, never a sentinel
//! for failure — translation outcome is carried by `trap`, not inferred from `paddr`.

use std::fmt;

use super::addr::PhysAddr;

/// Faults the Mbox can raise while processing a queue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Translation Not Valid: no DTB entry maps this virtual address.
    Tnv(u64),
    /// Access Control Violation: the DTB entry exists but denies this access.
    Acv(u64),
    /// Fault On Read: the PTE's fault-on-read bit is set for this access.
    For(u64),
    /// Fault On Write: the PTE's fault-on-write bit is set for this access.
    Fow(u64),
    /// The virtual address is not a multiple of the access width.
    AlignmentFault(u64),
}

impl Trap {
    /// The faulting virtual address carried by every variant.
    pub fn addr(&self) -> u64 {
        match *self {
            Trap::Tnv(a) | Trap::Acv(a) | Trap::For(a) | Trap::Fow(a) | Trap::AlignmentFault(a) => {
                a
            }
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::Tnv(addr) => write!(f, "TNV({:#x})", addr),
            Trap::Acv(addr) => write!(f, "ACV({:#x})", addr),
            Trap::For(addr) => write!(f, "FOR({:#x})", addr),
            Trap::Fow(addr) => write!(f, "FOW({:#x})", addr),
            Trap::AlignmentFault(addr) => write!(f, "AlignmentFault({:#x})", addr),
        }
    }
}

impl std::error::Error for Trap {}

/// Result of a virtual-to-physical translation performed by the DTB collaborator.
///
/// `paddr` is meaningful only when `trap.is_none()`; a faulted translation's
/// `paddr` is never read by callers, so it carries no sentinel meaning at all.
#[derive(Clone, Copy, Debug)]
pub struct TranslationResult {
    /// The translated physical address. Only valid when `trap` is `None`.
    pub paddr: PhysAddr,
    /// Fault raised during translation, if any.
    pub trap: Option<Trap>,
}

impl TranslationResult {
    /// Creates a successful translation result.
    #[inline]
    pub fn success(paddr: PhysAddr) -> Self {
        Self { paddr, trap: None }
    }

    /// Creates a translation result indicating a fault occurred.
    ///
    /// `paddr` is left as `PhysAddr(0)` but is documentation-only dead weight:
    /// callers must check `trap` before ever reading `paddr`.
    #[inline]
    pub fn fault(trap: Trap) -> Self {
        Self {
            paddr: PhysAddr(0),
            trap: Some(trap),
        }
    }

    /// Returns true if translation succeeded.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.trap.is_none()
    }
}
