//! Property and end-to-end tests for `mbox-core`.

/// Randomized invariant checks over `LoadQueue`/`StoreQueue` allocation
/// (§8 invariant 3).
pub mod queue_properties;



/// IPR read/write accessors (§4.7 reset state, §6 PAL-visible surface).
pub mod ipr;
