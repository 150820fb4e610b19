//! Shared test infrastructure: fakes of the external-collaborator traits and
//! a harness that wires them into a real, running [`mbox_core::Mbox`].

pub mod harness;
pub mod mocks;
