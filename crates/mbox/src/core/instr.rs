//! Instruction descriptor handle.
//!
//! Instructions are owned by the Ibox's in-flight window, not by the Mbox.
//! Queue entries hold a non-owning, generation-counted handle instead of a raw
//! pointer, so a handle outlives a squash/retire cycle cleanly: stale handles
//! simply fail generation checks instead of dangling.

/// Non-owning reference to an in-flight instruction descriptor.
///
/// `index` identifies the slot in the Ibox's instruction window; `generation`
/// distinguishes this occupant of that slot from whatever was there before it
/// was reused after a squash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstrHandle {
    index: u32,
    generation: u32,
}

impl InstrHandle {
    /// Builds a handle from a raw index and generation.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The instruction window slot this handle refers to.
    pub fn index(self) -> u32 {
        self.index
    }

    /// The generation this handle was minted for.
    pub fn generation(self) -> u32 {
        self.generation
    }
}
