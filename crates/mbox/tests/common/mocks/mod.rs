//! Hand-rolled fakes of the `core::collaborators` traits.
//!
//! These are plain structs, not `mockall` mocks: the crate's `automock`-
//! generated mocks are `#[cfg(test)]`-gated inside `mbox-core` itself and
//! never reach a dependent integration-test crate. A shared [`Backing`]
//! models the part of the system these fakes jointly stand in for (main
//! memory plus cache residency) so values round-trip across the
//! Dcache/Bcache/Cbox boundary the way they would against real hardware.

pub mod cache;
pub mod translator;

pub use backing::Backing;
pub use cache::{FakeBcache, FakeDcache};
pub use cbox::FakeCbox;
pub use ibox::{Event, FakeIbox};
pub use translator::FakeTranslator;
