//! Credential service: hashing, verification and opportunistic rehashing

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::random::gen_random_password;
use super::registry::HandlerRegistry;
use crate::domain::user::validate_password;
use crate::domain::{
    DomainError, HashAlgorithm, HashOptions, IdentityCache, User, UserId, UserRepository,
};
use crate::infrastructure::identity::propagate;

/// Credential service
#[derive(Debug, Clone)]
pub struct CredentialService {
    registry: Arc<HandlerRegistry>,
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityCache>,
    default_algorithm: HashAlgorithm,
}

impl CredentialService {
    /// Create a credential service writing `default_algorithm` hashes
    pub fn new(
        registry: Arc<HandlerRegistry>,
        users: Arc<dyn UserRepository>,
        identity: Arc<dyn IdentityCache>,
        default_algorithm: HashAlgorithm,
    ) -> Result<Self, DomainError> {
        if !registry.supports(default_algorithm) {
            return Err(DomainError::configuration(format!(
                "Default password algorithm '{}' has no registered handler",
                default_algorithm
            )));
        }

        Ok(Self {
            registry,
            users,
            identity,
            default_algorithm,
        })
    }

    pub fn default_algorithm(&self) -> HashAlgorithm {
        self.default_algorithm
    }

    /// Hash a password with an explicit algorithm
    pub fn hash_password(
        &self,
        plaintext: &str,
        algorithm: HashAlgorithm,
        options: &HashOptions,
    ) -> Result<String, DomainError> {
        self.registry.resolve(algorithm)?.hash(plaintext, options)
    }

    /// Hash a password with an algorithm given by name or legacy numeric code
    pub fn hash_password_with_tag(
        &self,
        plaintext: &str,
        tag: &str,
        options: &HashOptions,
    ) -> Result<String, DomainError> {
        let algorithm: HashAlgorithm = tag.parse()?;
        self.hash_password(plaintext, algorithm, options)
    }

    /// Hash a password with the configured default algorithm
    pub fn hash_default(&self, plaintext: &str) -> Result<String, DomainError> {
        self.hash_password(plaintext, self.default_algorithm, &HashOptions::default())
    }

    /// Verify a password against an encoded credential
    ///
    /// The algorithm is taken from the encoding's prefix. When the password
    /// matches, `user_id` is given and the handler reports the credential as
    /// outdated, it is rehashed with the default algorithm and stored. A
    /// current hash of another supported family is left alone. The outcome
    /// of that rehash never changes the returned value.
    pub async fn verify_password(
        &self,
        plaintext: &str,
        encoded: &str,
        user_id: Option<UserId>,
    ) -> bool {
        let (_, handler) = self.registry.resolve_encoded(encoded);
        let matched = handler.verify(plaintext, encoded);

        if !matched {
            return false;
        }

        let Some(user_id) = user_id else {
            return true;
        };

        if handler.needs_rehash(encoded) {
            if let Err(e) = self.rehash(user_id, plaintext, encoded).await {
                warn!(user_id = %user_id, error = %e, "Failed to upgrade password hash");
            }
        }

        true
    }

    /// Replace a user's password
    pub async fn set_password(&self, user_id: UserId, plaintext: &str) -> Result<User, DomainError> {
        validate_password(plaintext).map_err(|e| DomainError::validation(e.to_string()))?;

        let password_hash = self.hash_default(plaintext)?;
        let saved = self
            .users
            .swap_password_hash(user_id, None, &password_hash)
            .await?
            .ok_or_else(|| DomainError::internal("Unconditional password write was refused"))?;
        propagate(self.identity.as_ref(), &saved).await;

        info!(user_id = %user_id, algorithm = %self.default_algorithm, "Password changed");
        Ok(saved)
    }

    /// Generate a random password from the 62-symbol alphabet
    pub fn gen_random_password(&self, length: usize) -> String {
        gen_random_password(length)
    }

    async fn rehash(&self, user_id: UserId, plaintext: &str, verified: &str) -> Result<(), DomainError> {
        let password_hash = self.hash_default(plaintext)?;

        // A concurrent password change wins over the upgrade.
        let Some(saved) = self
            .users
            .swap_password_hash(user_id, Some(verified), &password_hash)
            .await?
        else {
            debug!(user_id = %user_id, "Stored credential changed since verification, skipping rehash");
            return Ok(());
        };
        propagate(self.identity.as_ref(), &saved).await;

        info!(user_id = %user_id, algorithm = %self.default_algorithm, "Upgraded password hash");
        Ok(())
    }
}
