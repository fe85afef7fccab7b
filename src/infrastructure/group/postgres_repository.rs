//! PostgreSQL group repository implementation

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::DomainError;
use crate::domain::group::{Group, GroupId, GroupRepository};

/// PostgreSQL implementation of GroupRepository over `usergroups`
#[derive(Debug, Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn get(&self, id: GroupId) -> Result<Option<Group>, DomainError> {
        let row = sqlx::query("SELECT id, title FROM usergroups WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to get group: {}", e)))?;

        Ok(row.map(|row| row_to_group(&row)))
    }

    async fn exists(&self, id: GroupId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM usergroups WHERE id = $1)")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to check group: {}", e)))
    }

    async fn titles(&self, ids: &[GroupId]) -> Result<BTreeMap<GroupId, String>, DomainError> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let ids: Vec<i64> = ids.iter().map(GroupId::value).collect();

        let rows = sqlx::query("SELECT id, title FROM usergroups WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::persistence(format!("Failed to get group titles: {}", e))
            })?;

        Ok(rows
            .iter()
            .map(row_to_group)
            .map(|g| (g.id(), g.title().to_string()))
            .collect())
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let rows = sqlx::query("SELECT id, title FROM usergroups ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to list groups: {}", e)))?;

        Ok(rows.iter().map(row_to_group).collect())
    }
}

fn row_to_group(row: &sqlx::postgres::PgRow) -> Group {
    let id: i64 = row.get("id");
    let title: String = row.get("title");

    Group::new(GroupId::new(id), title)
}
