//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction};

use crate::domain::DomainError;
use crate::domain::group::{GroupId, GroupSet};
use crate::domain::user::{GroupChange, StoredUser, User, UserId, UserRepository, UserStatus};

const SELECT_USER: &str = r#"
    SELECT u.id, u.username, u.password_hash, u.block, u.activation,
           u.created_at, u.updated_at, u.last_visit_at,
           COALESCE(
               array_agg(m.group_id ORDER BY m.group_id) FILTER (WHERE m.group_id IS NOT NULL),
               '{}'
           ) AS group_ids
    FROM users u
    LEFT JOIN user_usergroup_map m ON m.user_id = u.id
"#;

/// PostgreSQL implementation of UserRepository
///
/// Memberships live in `user_usergroup_map`. Every write locks the user row
/// with `SELECT ... FOR UPDATE` and re-reads the user inside the same
/// transaction.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to begin transaction: {}", e)))
    }

    async fn fetch_one(&self, lookup: Lookup<'_>) -> Result<Option<User>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to acquire connection: {}", e)))?;

        fetch_user(&mut *conn, lookup).await
    }
}

async fn fetch_user(
    conn: &mut PgConnection,
    lookup: Lookup<'_>,
) -> Result<Option<User>, DomainError> {
    let (condition, context) = match lookup {
        Lookup::Id(_) => ("u.id = $1", "get user"),
        Lookup::Username(_) => ("u.username = $1", "get user by username"),
        Lookup::Activation(_) => ("u.activation = $1", "find user by activation"),
    };
    let sql = format!("{} WHERE {} GROUP BY u.id", SELECT_USER, condition);

    let query = match lookup {
        Lookup::Id(id) => sqlx::query(&sql).bind(id.value()),
        Lookup::Username(value) | Lookup::Activation(value) => sqlx::query(&sql).bind(value),
    };

    let row = query
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DomainError::persistence(format!("Failed to {}: {}", context, e)))?;

    row.map(|row| row_to_user(&row)).transpose()
}

/// Lock the user row for the rest of the transaction
async fn lock_user(conn: &mut PgConnection, id: UserId) -> Result<(), DomainError> {
    let locked = sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(id.value())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DomainError::persistence(format!("Failed to lock user: {}", e)))?;

    match locked {
        Some(_) => Ok(()),
        None => Err(DomainError::not_found(format!("User '{}' not found", id))),
    }
}

/// Re-read a locked user and commit
async fn finish(mut tx: Transaction<'_, Postgres>, id: UserId) -> Result<User, DomainError> {
    let user = fetch_user(&mut *tx, Lookup::Id(id))
        .await?
        .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

    tx.commit()
        .await
        .map_err(|e| DomainError::persistence(format!("Failed to commit user: {}", e)))?;

    Ok(user)
}

#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    Id(UserId),
    Username(&'a str),
    Activation(&'a str),
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        self.fetch_one(Lookup::Id(id)).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one(Lookup::Username(username)).await
    }

    async fn find_by_activation(&self, token: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one(Lookup::Activation(token)).await
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, block, activation,
                               created_at, updated_at, last_visit_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id().value())
        .bind(user.username())
        .bind(user.password_hash())
        .bind(!user.is_active())
        .bind(user.activation())
        .bind(user.created_at())
        .bind(user.updated_at())
        .bind(user.last_visit_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::persistence(format!(
                    "User '{}' ({}) already exists",
                    user.username(),
                    user.id()
                ))
            } else {
                DomainError::persistence(format!("Failed to create user: {}", e))
            }
        })?;

        replace_memberships(&mut tx, user.id(), user.groups()).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::persistence(format!("Failed to commit user: {}", e)))?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tx = self.begin().await?;
        lock_user(&mut *tx, user.id()).await?;

        sqlx::query(
            r#"
            UPDATE users
            SET username = $2, block = $3, activation = $4, last_visit_at = $5,
                updated_at = clock_timestamp()
            WHERE id = $1
            "#,
        )
        .bind(user.id().value())
        .bind(user.username())
        .bind(!user.is_active())
        .bind(user.activation())
        .bind(user.last_visit_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::persistence(format!("Failed to update user: {}", e)))?;

        finish(tx, user.id()).await
    }

    async fn change_groups(
        &self,
        id: UserId,
        change: &GroupChange,
    ) -> Result<(User, bool), DomainError> {
        let mut tx = self.begin().await?;
        lock_user(&mut *tx, id).await?;

        let changed = match change {
            GroupChange::Add(group) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO user_usergroup_map (user_id, group_id)
                    VALUES ($1, $2)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(id.value())
                .bind(group.value())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if e.to_string().contains("foreign key") {
                        DomainError::group_not_found(*group)
                    } else {
                        DomainError::persistence(format!("Failed to add membership: {}", e))
                    }
                })?;

                result.rows_affected() > 0
            }
            GroupChange::Remove(group) => {
                let result = sqlx::query(
                    "DELETE FROM user_usergroup_map WHERE user_id = $1 AND group_id = $2",
                )
                .bind(id.value())
                .bind(group.value())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::persistence(format!("Failed to remove membership: {}", e))
                })?;

                result.rows_affected() > 0
            }
            GroupChange::Replace(groups) => {
                let current: Vec<i64> = sqlx::query_scalar(
                    "SELECT group_id FROM user_usergroup_map WHERE user_id = $1",
                )
                .bind(id.value())
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| DomainError::persistence(format!("Failed to read memberships: {}", e)))?;

                if current.into_iter().collect::<GroupSet>() == *groups {
                    false
                } else {
                    replace_memberships(&mut tx, id, groups).await?;
                    true
                }
            }
        };

        if changed {
            sqlx::query("UPDATE users SET updated_at = clock_timestamp() WHERE id = $1")
                .bind(id.value())
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::persistence(format!("Failed to touch user: {}", e)))?;
        }

        let user = finish(tx, id).await?;
        Ok((user, changed))
    }

    async fn swap_password_hash(
        &self,
        id: UserId,
        expected: Option<&str>,
        password_hash: &str,
    ) -> Result<Option<User>, DomainError> {
        let mut tx = self.begin().await?;
        lock_user(&mut *tx, id).await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = clock_timestamp()
            WHERE id = $1 AND ($3::TEXT IS NULL OR password_hash = $3)
            "#,
        )
        .bind(id.value())
        .bind(password_hash)
        .bind(expected)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::persistence(format!("Failed to update password: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        finish(tx, id).await.map(Some)
    }
}

async fn replace_memberships(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    groups: &GroupSet,
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM user_usergroup_map WHERE user_id = $1")
        .bind(user_id.value())
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::persistence(format!("Failed to clear memberships: {}", e)))?;

    if groups.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO user_usergroup_map (user_id, group_id)
        SELECT $1, UNNEST($2::BIGINT[])
        "#,
    )
    .bind(user_id.value())
    .bind(groups.to_vec())
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        let msg = e.to_string();

        if msg.contains("foreign key") {
            DomainError::validation(format!(
                "User '{}' references a group that does not exist",
                user_id
            ))
        } else {
            DomainError::persistence(format!("Failed to write memberships: {}", e))
        }
    })?;

    Ok(())
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: i64 = row.get("id");
    let block: bool = row.get("block");
    let group_ids: Vec<i64> = row.get("group_ids");

    let id = UserId::new(id)
        .map_err(|e| DomainError::persistence(format!("Invalid user ID in database: {}", e)))?;

    Ok(StoredUser {
        id,
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        groups: group_ids.into_iter().map(GroupId::new).collect(),
        status: block_to_status(block),
        activation: row.get("activation"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_visit_at: row.get("last_visit_at"),
    }
    .into())
}

fn block_to_status(block: bool) -> UserStatus {
    if block {
        UserStatus::Blocked
    } else {
        UserStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_conversion() {
        assert_eq!(block_to_status(true), UserStatus::Blocked);
        assert_eq!(block_to_status(false), UserStatus::Active);
    }

    #[test]
    fn test_select_groups_memberships_per_user() {
        let query = format!("{} WHERE u.id = $1 GROUP BY u.id", SELECT_USER);

        assert!(query.contains("LEFT JOIN user_usergroup_map"));
        assert!(query.ends_with("GROUP BY u.id"));
    }
}
