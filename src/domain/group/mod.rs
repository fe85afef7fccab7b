//! Group domain module
//!
//! Groups are only referenced for existence checks and display titles.
//! The group hierarchy lives outside this crate.

mod entity;
mod repository;

pub use entity::{Group, GroupId, GroupSet};
pub use repository::GroupRepository;

#[cfg(test)]
pub use repository::mock::MockGroupRepository;
