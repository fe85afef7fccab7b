//! Domain layer: entities, value objects and collaborator traits

pub mod access;
pub mod error;
pub mod group;
pub mod identity;
pub mod password;
pub mod user;

pub use access::{Capability, CapabilityChecker};
pub use error::DomainError;
pub use group::{Group, GroupId, GroupRepository, GroupSet};
pub use identity::{IdentityCache, SharedUser};
pub use password::{HashAlgorithm, HashOptions, PasswordHandler};
pub use user::{GroupChange, User, UserId, UserRepository, UserStatus};
