//! API-boundary error type.
//!
//! Architectural faults (TNV/ACV/FOR/FOW, alignment) are not represented here —
//! they are ordinary data delivered through the `Ibox_Event` collaborator, per
//! the error handling design. `MboxError` covers only what is actually
//! exceptional at the Rust API boundary: resource acquisition failure during
//! initialization, and a caller violating the external-interface contract.

use thiserror::Error;

/// Errors surfaced by the public Mbox API.
#[derive(Debug, Error)]
pub enum MboxError {
    /// `Mbox::init` could not acquire the resources it needs (e.g. the
    /// scheduler worker thread failed to spawn).
    #[error("Mbox initialization failed: {0}")]
    InitFailed(String),

    /// A collaborator call referenced a slot that is not currently allocated
    /// to the caller (e.g. `ReadMem` on a slot still `QNotInUse`).
    #[error("slot {slot} is not in a publishable state")]
    SlotNotAllocated {
        /// The offending slot index.
        slot: u32,
    },

    /// A slot index outside `[0, AXP_MBOX_QUEUE_LEN)` was passed to a
    /// collaborator call.
    #[error("slot index {slot} out of range")]
    SlotOutOfRange {
        /// The offending slot index.
        slot: u32,
    },

    /// An internal mutex was found poisoned by a panicking holder.
    #[error("Mbox internal lock poisoned: {0}")]
    LockPoisoned(String),
}
