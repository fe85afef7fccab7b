//! Mapping from algorithm tag to handler

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::argon2::Argon2Handler;
use super::bcrypt::BcryptHandler;
use super::chained::ChainedHandler;
use super::md5::Md5Handler;
use super::phpass::PhpassHandler;
use crate::config::PasswordConfig;
use crate::domain::{DomainError, HashAlgorithm, PasswordHandler};

/// Handlers resolved once at startup
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<HashAlgorithm, Arc<dyn PasswordHandler>>,
    fallback: Arc<dyn PasswordHandler>,
}

impl HandlerRegistry {
    /// Create a registry with only a fallback handler
    pub fn new(fallback: Arc<dyn PasswordHandler>) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback,
        }
    }

    /// Build every supported handler from configuration
    pub fn from_config(config: &PasswordConfig) -> Result<Self, DomainError> {
        let phpass: Arc<dyn PasswordHandler> =
            Arc::new(PhpassHandler::new(config.phpass_iteration_log2)?);
        let md5: Arc<dyn PasswordHandler> = Arc::new(Md5Handler::new());
        let chained = ChainedHandler::new(vec![phpass.clone(), md5.clone()]);

        Ok(Self::new(Arc::new(chained))
            .with_handler(
                HashAlgorithm::Argon2id,
                Arc::new(Argon2Handler::argon2id(&config.argon2)?),
            )
            .with_handler(
                HashAlgorithm::Argon2i,
                Arc::new(Argon2Handler::argon2i(&config.argon2)?),
            )
            .with_handler(
                HashAlgorithm::Bcrypt,
                Arc::new(BcryptHandler::new(config.bcrypt_cost)?),
            )
            .with_handler(HashAlgorithm::Md5, md5)
            .with_handler(HashAlgorithm::Phpass, phpass))
    }

    /// Register or replace a handler (builder pattern)
    pub fn with_handler(
        mut self,
        algorithm: HashAlgorithm,
        handler: Arc<dyn PasswordHandler>,
    ) -> Self {
        self.handlers.insert(algorithm, handler);
        self
    }

    /// Handler for an explicit algorithm
    pub fn resolve(&self, algorithm: HashAlgorithm) -> Result<Arc<dyn PasswordHandler>, DomainError> {
        self.handlers
            .get(&algorithm)
            .cloned()
            .ok_or_else(|| DomainError::unsupported_algorithm(algorithm.as_str()))
    }

    /// Handler for an encoded credential, chosen by its prefix
    ///
    /// Returns the sniffed algorithm, or `None` when the fallback was used.
    pub fn resolve_encoded(&self, encoded: &str) -> (Option<HashAlgorithm>, Arc<dyn PasswordHandler>) {
        match HashAlgorithm::sniff(encoded).and_then(|a| self.handlers.get(&a).map(|h| (a, h))) {
            Some((algorithm, handler)) => {
                debug!(algorithm = %algorithm, "Resolved password handler from prefix");
                (Some(algorithm), handler.clone())
            }
            None => {
                debug!("No recognised prefix, using chained legacy handler");
                (None, self.fallback.clone())
            }
        }
    }

    pub fn supports(&self, algorithm: HashAlgorithm) -> bool {
        self.handlers.contains_key(&algorithm)
    }

    /// Registered algorithms in tag order
    pub fn algorithms(&self) -> Vec<HashAlgorithm> {
        let mut algorithms: Vec<HashAlgorithm> = self.handlers.keys().copied().collect();
        algorithms.sort();
        algorithms
    }
}
