//! Access control domain
//!
//! Only the boolean group-to-capability predicate is modelled here; how a
//! group inherits capabilities is up to the implementation.

mod capability;

pub use capability::{Capability, CapabilityChecker};

#[cfg(test)]
pub use capability::MockCapabilityChecker;
