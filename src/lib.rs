//! User credentials
//!
//! Password hashing and verification across interchangeable algorithms with
//! rehash-on-verify, group membership management that keeps cached user
//! copies consistent, and super user detection over group capabilities.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use domain::{CapabilityChecker, GroupRepository, UserRepository};
use infrastructure::{
    access::{AccessEvaluator, StaticCapabilityTable},
    group::{InMemoryGroupRepository, PostgresGroupRepository},
    identity::InMemoryIdentityCache,
    membership::MembershipService,
    password::{CredentialService, HandlerRegistry},
    storage::create_pool,
    user::{InMemoryUserRepository, PostgresUserRepository, UserService},
};

/// Every service of the crate wired against one set of stores
#[derive(Debug, Clone)]
pub struct Services {
    pub identity: Arc<InMemoryIdentityCache>,
    pub credentials: Arc<CredentialService>,
    pub users: Arc<UserService>,
    pub membership: Arc<MembershipService>,
    pub access: Arc<AccessEvaluator>,
    /// Set when the stores are backed by PostgreSQL
    pub pool: Option<PgPool>,
}

/// Build the services described by `config`
///
/// PostgreSQL stores are used when `database.url` is set; otherwise users
/// live in memory next to the stock groups.
pub async fn create_services(config: &AppConfig) -> anyhow::Result<Services> {
    let registry = Arc::new(HandlerRegistry::from_config(&config.password)?);
    let identity = Arc::new(InMemoryIdentityCache::with_config(&config.identity_cache));

    let (user_repository, group_repository, pool): (
        Arc<dyn UserRepository>,
        Arc<dyn GroupRepository>,
        Option<PgPool>,
    ) = match config.database.url {
        Some(_) => {
            let pool = create_pool(&config.database).await?;
            info!("Using PostgreSQL user and group stores");
            (
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresGroupRepository::new(pool.clone())),
                Some(pool),
            )
        }
        None => {
            info!("Using in-memory user and group stores");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryGroupRepository::with_stock_groups()),
                None,
            )
        }
    };

    let checker: Arc<dyn CapabilityChecker> =
        Arc::new(StaticCapabilityTable::from_config(&config.access));

    let credentials = Arc::new(CredentialService::new(
        registry,
        user_repository.clone(),
        identity.clone(),
        config.password.default_algorithm,
    )?);
    let users = Arc::new(UserService::new(user_repository.clone(), identity.clone()));
    let membership = Arc::new(MembershipService::new(
        user_repository,
        group_repository,
        identity.clone(),
    ));
    let access = Arc::new(AccessEvaluator::new(membership.clone(), checker));

    info!(
        default_algorithm = %config.password.default_algorithm,
        "Services initialized"
    );

    Ok(Services {
        identity,
        credentials,
        users,
        membership,
        access,
        pool,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argon2Config;
    use crate::domain::{GroupId, HashAlgorithm, User, UserId};

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.password.bcrypt_cost = 4;
        config.password.argon2 = Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        config
    }

    #[tokio::test]
    async fn test_in_memory_services() {
        let services = create_services(&test_config()).await.unwrap();

        assert!(services.pool.is_none());
        assert_eq!(services.credentials.default_algorithm(), HashAlgorithm::Bcrypt);

        let hash = services.credentials.hash_default("password").unwrap();
        assert!(services.credentials.verify_password("password", &hash, None).await);
    }

    #[tokio::test]
    async fn test_services_share_stores_and_cache() {
        let services = create_services(&test_config()).await.unwrap();
        let id = UserId::new(42).unwrap();

        // Only cached, never stored
        let instance = services
            .identity
            .preload(User::new(id, "alice", "5f4dcc3b5aa765d61d8327deb882cf99"))
            .await;
        let err = services
            .membership
            .add_user_to_group(id, GroupId::new(8))
            .await
            .unwrap_err();
        assert!(matches!(err, domain::DomainError::NotFound { .. }));

        assert!(!services.access.check_super_user_in_users(&[id]).await.unwrap());

        instance.write().await.add_group(GroupId::new(8));
        assert!(services.access.check_super_user_in_users(&[id]).await.unwrap());
    }
}
