//! In-memory group repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::group::{Group, GroupId, GroupRepository};

/// Groups shipped with a fresh installation
const STOCK_GROUPS: [(i64, &str); 9] = [
    (1, "Public"),
    (2, "Registered"),
    (3, "Author"),
    (4, "Editor"),
    (5, "Publisher"),
    (6, "Manager"),
    (7, "Administrator"),
    (8, "Super Users"),
    (9, "Guest"),
];

/// In-memory implementation of GroupRepository
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: Arc<RwLock<BTreeMap<GroupId, Group>>>,
}

impl InMemoryGroupRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial groups
    pub fn with_groups(groups: Vec<Group>) -> Self {
        let groups = groups.into_iter().map(|g| (g.id(), g)).collect();

        Self {
            groups: Arc::new(RwLock::new(groups)),
        }
    }

    /// Create a repository holding the stock groups
    pub fn with_stock_groups() -> Self {
        Self::with_groups(
            STOCK_GROUPS
                .iter()
                .map(|(id, title)| Group::new(GroupId::new(*id), *title))
                .collect(),
        )
    }

    /// Add or replace a group
    pub async fn insert(&self, group: Group) {
        self.groups.write().await.insert(group.id(), group);
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn get(&self, id: GroupId) -> Result<Option<Group>, DomainError> {
        Ok(self.groups.read().await.get(&id).cloned())
    }

    async fn titles(&self, ids: &[GroupId]) -> Result<BTreeMap<GroupId, String>, DomainError> {
        let groups = self.groups.read().await;

        Ok(ids
            .iter()
            .filter_map(|id| groups.get(id).map(|g| (*id, g.title().to_string())))
            .collect())
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.groups.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stock_groups() {
        let repo = InMemoryGroupRepository::with_stock_groups();

        let super_users = repo.get(GroupId::new(8)).await.unwrap().unwrap();
        assert_eq!(super_users.title(), "Super Users");
        assert_eq!(repo.list().await.unwrap().len(), 9);
        assert!(!repo.exists(GroupId::new(10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_titles_skip_unknown_ids() {
        let repo = InMemoryGroupRepository::with_stock_groups();

        let titles = repo
            .titles(&[GroupId::new(2), GroupId::new(99), GroupId::new(7)])
            .await
            .unwrap();

        assert_eq!(titles.len(), 2);
        assert_eq!(titles[&GroupId::new(2)], "Registered");
        assert_eq!(titles[&GroupId::new(7)], "Administrator");
    }

    #[tokio::test]
    async fn test_insert() {
        let repo = InMemoryGroupRepository::new();
        assert!(repo.list().await.unwrap().is_empty());

        repo.insert(Group::new(GroupId::new(12), "Staff")).await;
        assert!(repo.exists(GroupId::new(12)).await.unwrap());
    }
}
