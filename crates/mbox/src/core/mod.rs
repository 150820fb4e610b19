//! The memory pipeline core.
//!
//! Submodules, leaves first: address translation (`dtb`), cache line storage
//! (`cache`), queue storage and state machines (`queue`), the forwarding
//! engine, load-lock bookkeeping, the external-collaborator traits, the
//! per-entry scheduler logic, and finally the `Mbox` struct that wires all of
//! it together behind a worker thread.

pub mod access_mode;
pub mod cache;
pub mod collaborators;
pub mod dtb;
pub mod forwarding;
pub mod instr;
pub mod ipr;
pub mod lock;
pub mod mbox;
pub mod queue;
pub mod scheduler;

pub use mbox::{Mbox, MboxCollaborators};
