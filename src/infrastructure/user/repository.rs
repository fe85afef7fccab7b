//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::user::{GroupChange, User, UserId, UserRepository};

/// In-memory implementation of UserRepository
///
/// Every write holds the map's write lock from read to store.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    /// Index for username -> user ID lookup
    username_index: Arc<RwLock<HashMap<String, UserId>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            username_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut users_map = HashMap::new();
        let mut username_map = HashMap::new();

        for user in users {
            username_map.insert(user.username().to_string(), user.id());
            users_map.insert(user.id(), user);
        }

        Self {
            users: Arc::new(RwLock::new(users_map)),
            username_index: Arc::new(RwLock::new(username_map)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let username_index = self.username_index.read().await;

        if let Some(user_id) = username_index.get(username) {
            let users = self.users.read().await;
            return Ok(users.get(user_id).cloned());
        }

        Ok(None)
    }

    async fn find_by_activation(&self, token: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.activation() == Some(token))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut username_index = self.username_index.write().await;

        if users.contains_key(&user.id()) {
            return Err(DomainError::persistence(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }

        if username_index.contains_key(user.username()) {
            return Err(DomainError::persistence(format!(
                "Username '{}' already exists",
                user.username()
            )));
        }

        username_index.insert(user.username().to_string(), user.id());
        users.insert(user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut username_index = self.username_index.write().await;

        let Some(old_user) = users.get(&user.id()) else {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            )));
        };

        let old_username = old_user.username().to_string();

        if old_username != user.username() {
            if username_index.contains_key(user.username()) {
                return Err(DomainError::persistence(format!(
                    "Username '{}' already exists",
                    user.username()
                )));
            }

            username_index.remove(&old_username);
            username_index.insert(user.username().to_string(), user.id());
        }

        let mut updated = user.clone();
        updated.set_password_hash(old_user.password_hash());
        updated.set_groups(old_user.groups().clone());
        users.insert(user.id(), updated.clone());

        Ok(updated)
    }

    async fn change_groups(
        &self,
        id: UserId,
        change: &GroupChange,
    ) -> Result<(User, bool), DomainError> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;
        let changed = change.apply(user);

        Ok((user.clone(), changed))
    }

    async fn swap_password_hash(
        &self,
        id: UserId,
        expected: Option<&str>,
        password_hash: &str,
    ) -> Result<Option<User>, DomainError> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if let Some(expected) = expected {
            if user.password_hash() != expected {
                return Ok(None);
            }
        }

        user.set_password_hash(password_hash);
        Ok(Some(user.clone()))
    }
}
