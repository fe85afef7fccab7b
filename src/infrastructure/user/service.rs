//! User service: lookups, activation and group reads

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::user::{User, UserId, UserRepository, validate_activation_token};
use crate::domain::{DomainError, GroupSet, IdentityCache};
use crate::infrastructure::identity::{current_groups, propagate};

/// User service
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityCache>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repository: Arc<dyn UserRepository>, identity: Arc<dyn IdentityCache>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// Get a user by ID
    pub async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Look up the id registered for a username
    pub async fn get_user_id(&self, username: &str) -> Result<Option<UserId>, DomainError> {
        Ok(self
            .repository
            .get_by_username(username)
            .await?
            .map(|user| user.id()))
    }

    /// Activate the account waiting on `token`
    ///
    /// Returns `false` when no blocked, never-visited account holds the token
    /// or when the account cannot be saved.
    pub async fn activate_user(&self, token: &str) -> bool {
        if validate_activation_token(token).is_err() {
            warn!("Rejected activation with an empty token");
            return false;
        }

        let mut user = match self.repository.find_by_activation(token).await {
            Ok(Some(user)) if user.awaits_activation_with(token) => user,
            Ok(_) => {
                warn!("No account awaits activation with the supplied token");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to look up activation token");
                return false;
            }
        };

        user.activate();

        match self.repository.update(&user).await {
            Ok(saved) => {
                propagate(self.identity.as_ref(), &saved).await;
                info!(user_id = %saved.id(), "Activated user");
                true
            }
            Err(e) => {
                warn!(user_id = %user.id(), error = %e, "Failed to save activated user");
                false
            }
        }
    }

    /// Current groups of a user
    ///
    /// A live cached instance wins over the store. Unknown users have no
    /// groups.
    pub async fn get_user_groups(&self, id: UserId) -> Result<GroupSet, DomainError> {
        current_groups(self.identity.as_ref(), self.repository.as_ref(), id).await
    }
}
