//! Memory pipeline core for an Alpha 21264 (EV68) emulator.
//!
//! This crate implements the Mbox subsystem: Load Queue / Store Queue state
//! machines, store-to-load forwarding, a three-level Dcache/Bcache probe-and-fill
//! protocol, MAF/IOWB miss dispatch, and the cooperative scheduler that drives
//! all of it against the Ebox/Fbox issue stream and the Cbox system interface.
//!
//! 1. **Common:** address types, access classification, constants, and faults.
//! 2. **Config:** serde-deserializable queue and cache geometry.
//! 3. **Core:** DTB, cache line storage, LQ/SQ queues and state machines,
//!    the forwarding engine, load-lock bookkeeping, the external-collaborator
//!    traits, and the `Mbox` struct itself.
//! 4. **Error:** the API-boundary error type.

/// Common types and constants (addresses, access classification, faults).
pub mod common;
/// Mbox configuration (defaults, cache geometry, queue depths).
pub mod config;
/// The memory pipeline core: DTB, caches, queues, forwarding, scheduler.
pub mod core;
/// API-boundary error type.
pub mod error;

/// Root configuration type; use `MboxConfig::default()` or deserialize from JSON.
pub use crate::config::MboxConfig;
/// The memory pipeline core; construct with `Mbox::init`.
pub use crate::core::{Mbox, MboxCollaborators};
/// API-boundary error type.
pub use crate::error::MboxError;
