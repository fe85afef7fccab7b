//! Database migrations infrastructure

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations
    async fn run(&self) -> Result<(), DomainError>;

    /// Reverts the last migration
    async fn revert(&self) -> Result<(), DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// PostgreSQL migrator recording applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self::with_migrations(pool, storage_migrations())
    }

    pub fn with_migrations(pool: PgPool, migrations: Vec<Migration>) -> Self {
        Self { pool, migrations }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::persistence(format!("Failed to create migrations table: {}", e))
        })?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::persistence(format!("Failed to check migration status: {}", e))
            })
    }

    /// Runs a single migration and records it in one transaction
    pub async fn run_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::persistence(format!("Failed to begin transaction: {}", e))
        })?;

        for statement in migration.up_statements() {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::persistence(format!(
                        "Failed to run migration {}: {}",
                        migration.version, e
                    ))
                })?;
        }

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::persistence(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::persistence(format!(
                "Failed to commit migration {}: {}",
                migration.version, e
            ))
        })?;

        info!(version = migration.version, description = %migration.description, "Applied migration");
        Ok(())
    }

    /// Reverts a single migration
    pub async fn revert_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::persistence(format!("Failed to begin transaction: {}", e))
        })?;

        for statement in migration.down_statements() {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::persistence(format!(
                        "Failed to revert migration {}: {}",
                        migration.version, e
                    ))
                })?;
        }

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::persistence(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::persistence(format!(
                "Failed to commit revert of {}: {}",
                migration.version, e
            ))
        })?;

        info!(version = migration.version, "Reverted migration");
        Ok(())
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations WHERE success = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::persistence(format!("Failed to get migration version: {}", e))
            })
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<(), DomainError> {
        for migration in &self.migrations {
            self.run_migration(migration).await?;
        }

        Ok(())
    }

    async fn revert(&self) -> Result<(), DomainError> {
        let Some(current) = self.current_version().await? else {
            return Ok(());
        };

        match self.migrations.iter().find(|m| m.version == current) {
            Some(migration) => self.revert_migration(migration).await,
            None => Err(DomainError::internal(format!(
                "Applied migration {} is unknown to this build",
                current
            ))),
        }
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.current_version().await
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }

    /// Statements applying the migration, in order
    pub fn up_statements(&self) -> Vec<&str> {
        split_statements(&self.up)
    }

    /// Statements reverting the migration, in order
    pub fn down_statements(&self) -> Vec<&str> {
        split_statements(&self.down)
    }
}

/// Split a script on `;` into single statements
///
/// Prepared queries take one statement each. Scripts must not put `;`
/// inside string literals.
fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Schema for users, groups and memberships
pub fn storage_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create usergroups table",
            r#"
            CREATE TABLE IF NOT EXISTS usergroups (
                id BIGINT PRIMARY KEY,
                parent_id BIGINT NOT NULL DEFAULT 0,
                title VARCHAR(100) NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_usergroups_parent_title
                ON usergroups(parent_id, title);
            "#,
            r#"
            DROP TABLE IF EXISTS usergroups;
            "#,
        ),
        Migration::new(
            2,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY,
                username VARCHAR(150) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                block BOOLEAN NOT NULL DEFAULT FALSE,
                activation VARCHAR(100),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                last_visit_at TIMESTAMPTZ
            );
            CREATE INDEX IF NOT EXISTS idx_users_activation ON users(activation)
                WHERE activation IS NOT NULL;
            "#,
            r#"
            DROP TABLE IF EXISTS users;
            "#,
        ),
        Migration::new(
            3,
            "Create user_usergroup_map table",
            r#"
            CREATE TABLE IF NOT EXISTS user_usergroup_map (
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                group_id BIGINT NOT NULL REFERENCES usergroups(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, group_id)
            );
            CREATE INDEX IF NOT EXISTS idx_user_usergroup_map_group
                ON user_usergroup_map(group_id);
            "#,
            r#"
            DROP TABLE IF EXISTS user_usergroup_map;
            "#,
        ),
        Migration::new(
            4,
            "Seed stock usergroups",
            r#"
            INSERT INTO usergroups (id, parent_id, title) VALUES
                (1, 0, 'Public'),
                (2, 1, 'Registered'),
                (3, 2, 'Author'),
                (4, 3, 'Editor'),
                (5, 4, 'Publisher'),
                (6, 1, 'Manager'),
                (7, 6, 'Administrator'),
                (8, 1, 'Super Users'),
                (9, 1, 'Guest')
            ON CONFLICT (id) DO NOTHING;
            "#,
            r#"
            DELETE FROM usergroups WHERE id BETWEEN 1 AND 9;
            "#,
        ),
    ]
}

/// Runs all pending storage migrations
pub async fn run_storage_migrations(pool: &PgPool) -> Result<(), DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creation() {
        let migration = Migration::new(1, "Test migration", "CREATE TABLE test", "DROP TABLE test");

        assert_eq!(migration.version, 1);
        assert_eq!(migration.description, "Test migration");
        assert_eq!(migration.up, "CREATE TABLE test");
        assert_eq!(migration.down, "DROP TABLE test");
    }

    #[test]
    fn test_storage_migrations_order() {
        let migrations = storage_migrations();

        assert!(!migrations.is_empty());

        for i in 1..migrations.len() {
            assert!(
                migrations[i].version > migrations[i - 1].version,
                "Migrations should be in ascending order"
            );
        }
    }

    #[test]
    fn test_membership_map_created_after_its_parents() {
        let migrations = storage_migrations();
        let position = |table: &str| {
            migrations
                .iter()
                .position(|m| m.up.contains(&format!("CREATE TABLE IF NOT EXISTS {} ", table)))
                .unwrap()
        };

        assert!(position("user_usergroup_map") > position("users"));
        assert!(position("user_usergroup_map") > position("usergroups"));
    }

    #[test]
    fn test_split_statements() {
        let statements = split_statements(
            "CREATE TABLE a (id BIGINT);\n  CREATE INDEX idx ON a(id);\n\n  ;  ",
        );

        assert_eq!(
            statements,
            vec!["CREATE TABLE a (id BIGINT)", "CREATE INDEX idx ON a(id)"]
        );
        assert!(split_statements("  \n ").is_empty());
    }

    #[test]
    fn test_storage_migrations_run_one_statement_per_query() {
        let migrations = storage_migrations();
        let counts: Vec<_> = migrations
            .iter()
            .map(|m| (m.up_statements().len(), m.down_statements().len()))
            .collect();

        assert_eq!(counts, vec![(2, 1), (2, 1), (2, 1), (1, 1)]);

        for migration in &migrations {
            let statements = migration
                .up_statements()
                .into_iter()
                .chain(migration.down_statements());

            for statement in statements {
                assert!(!statement.contains(';'));
            }
        }
    }

    #[test]
    fn test_seed_migration_is_single_insert() {
        let migrations = storage_migrations();
        let seed = migrations.iter().find(|m| m.version == 4).unwrap();
        let statements = seed.up_statements();

        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with("INSERT INTO usergroups"));
        assert!(statements[0].ends_with("ON CONFLICT (id) DO NOTHING"));
    }

    #[test]
    fn test_storage_migrations_content() {
        for migration in storage_migrations() {
            assert!(!migration.description.is_empty());
            assert!(!migration.up.is_empty());
            assert!(!migration.down.is_empty());
        }
    }
}
