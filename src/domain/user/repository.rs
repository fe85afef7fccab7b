//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;
use crate::domain::group::{GroupId, GroupSet};

/// A membership change applied by the store in one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChange {
    Add(GroupId),
    Remove(GroupId),
    Replace(GroupSet),
}

impl GroupChange {
    /// Apply the change to a user, returning whether its groups changed
    pub fn apply(&self, user: &mut User) -> bool {
        match self {
            Self::Add(group) => user.add_group(*group),
            Self::Remove(group) => user.remove_group(*group),
            Self::Replace(groups) => {
                if user.groups() == groups {
                    return false;
                }
                user.set_groups(groups.clone());
                true
            }
        }
    }
}

/// Repository trait for user storage
///
/// Implementations must serialise concurrent writes to the same user.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Find the user holding an activation token
    async fn find_by_activation(&self, token: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Persist the profile fields of an existing user
    ///
    /// Username, status, activation token and last visit are written. The
    /// password hash and groups are left as stored; they change only through
    /// [`swap_password_hash`](Self::swap_password_hash) and
    /// [`change_groups`](Self::change_groups). Returns the stored user.
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Apply a membership change against the stored groups
    ///
    /// The read and the write happen under one lock, so concurrent changes
    /// to the same user never overwrite each other. Returns the stored user
    /// and whether its groups changed.
    async fn change_groups(
        &self,
        id: UserId,
        change: &GroupChange,
    ) -> Result<(User, bool), DomainError>;

    /// Replace the password hash if the stored one equals `expected`
    ///
    /// `None` replaces unconditionally. Returns `Ok(None)` when the stored
    /// hash differs from `expected`.
    async fn swap_password_hash(
        &self,
        id: UserId,
        expected: Option<&str>,
        password_hash: &str,
    ) -> Result<Option<User>, DomainError>;

    /// Check if a user ID exists
    async fn exists(&self, id: UserId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }
}
