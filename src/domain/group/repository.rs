//! Group repository trait

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{Group, GroupId};
use crate::domain::DomainError;

/// Read access to user groups
#[async_trait]
pub trait GroupRepository: Send + Sync + Debug {
    /// Get a group by ID
    async fn get(&self, id: GroupId) -> Result<Option<Group>, DomainError>;

    /// Check if a group exists
    async fn exists(&self, id: GroupId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }

    /// Titles of the given groups; unknown ids are absent from the result
    async fn titles(&self, ids: &[GroupId]) -> Result<BTreeMap<GroupId, String>, DomainError>;

    /// List all groups ordered by id
    async fn list(&self) -> Result<Vec<Group>, DomainError>;
}
