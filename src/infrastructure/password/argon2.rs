//! Argon2id and Argon2i password handlers

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use crate::config::Argon2Config;
use crate::domain::{DomainError, HashOptions, PasswordHandler};

/// Argon2 handler for a single variant
#[derive(Debug, Clone)]
pub struct Argon2Handler {
    algorithm: Algorithm,
    params: Params,
}

impl Argon2Handler {
    /// Create a handler writing the given variant with the given parameters
    pub fn new(algorithm: Algorithm, config: &Argon2Config) -> Result<Self, DomainError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| DomainError::configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { algorithm, params })
    }

    pub fn argon2id(config: &Argon2Config) -> Result<Self, DomainError> {
        Self::new(Algorithm::Argon2id, config)
    }

    pub fn argon2i(config: &Argon2Config) -> Result<Self, DomainError> {
        Self::new(Algorithm::Argon2i, config)
    }

    fn params_for(&self, options: &HashOptions) -> Result<Params, DomainError> {
        Params::new(
            options.memory_kib.unwrap_or(self.params.m_cost()),
            options.iterations.unwrap_or(self.params.t_cost()),
            options.parallelism.unwrap_or(self.params.p_cost()),
            None,
        )
        .map_err(|e| DomainError::validation(format!("Invalid Argon2 options: {}", e)))
    }
}

impl PasswordHandler for Argon2Handler {
    fn hash(&self, plaintext: &str, options: &HashOptions) -> Result<String, DomainError> {
        let params = self.params_for(options)?;
        let salt = SaltString::generate(&mut OsRng);

        Argon2::new(self.algorithm, Version::V0x13, params)
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, plaintext: &str, encoded: &str) -> bool {
        let parsed = match PasswordHash::new(encoded) {
            Ok(h) => h,
            Err(_) => return false,
        };

        // Cost parameters are read back from the encoded value itself.
        Argon2::new(self.algorithm, Version::V0x13, self.params.clone())
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    fn needs_rehash(&self, encoded: &str) -> bool {
        let parsed = match PasswordHash::new(encoded) {
            Ok(h) => h,
            Err(_) => return false,
        };

        if parsed.algorithm.as_str() != self.algorithm.as_str() {
            return true;
        }

        if parsed.version != Some(Version::V0x13 as u32) {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(params) => {
                params.m_cost() != self.params.m_cost()
                    || params.t_cost() != self.params.t_cost()
                    || params.p_cost() != self.params.p_cost()
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> Argon2Config {
        Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_argon2id_hash_and_verify() {
        let handler = Argon2Handler::argon2id(&fast_config()).unwrap();
        let hash = handler.hash("correct horse", &HashOptions::default()).unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(handler.verify("correct horse", &hash));
        assert!(!handler.verify("wrong horse", &hash));
    }

    #[test]
    fn test_argon2i_hash_and_verify() {
        let handler = Argon2Handler::argon2i(&fast_config()).unwrap();
        let hash = handler.hash("correct horse", &HashOptions::default()).unwrap();

        assert!(hash.starts_with("$argon2i$"));
        assert!(handler.verify("correct horse", &hash));
        assert!(!handler.verify("wrong horse", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let handler = Argon2Handler::argon2id(&fast_config()).unwrap();

        let hash1 = handler.hash("password", &HashOptions::default()).unwrap();
        let hash2 = handler.hash("password", &HashOptions::default()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_options_override_params() {
        let handler = Argon2Handler::argon2id(&fast_config()).unwrap();
        let options = HashOptions::new().with_memory_kib(2048).with_iterations(2);

        let hash = handler.hash("password", &options).unwrap();

        assert!(hash.contains("m=2048,t=2,p=1"));
        assert!(handler.verify("password", &hash));
        assert!(handler.needs_rehash(&hash));
    }

    #[test]
    fn test_needs_rehash_current_params() {
        let handler = Argon2Handler::argon2id(&fast_config()).unwrap();
        let hash = handler.hash("password", &HashOptions::default()).unwrap();

        assert!(!handler.needs_rehash(&hash));
    }

    #[test]
    fn test_needs_rehash_other_variant() {
        let argon2i = Argon2Handler::argon2i(&fast_config()).unwrap();
        let argon2id = Argon2Handler::argon2id(&fast_config()).unwrap();
        let hash = argon2i.hash("password", &HashOptions::default()).unwrap();

        assert!(argon2id.needs_rehash(&hash));
    }

    #[test]
    fn test_verify_malformed() {
        let handler = Argon2Handler::argon2id(&fast_config()).unwrap();

        assert!(!handler.verify("password", "$argon2id$garbage"));
        assert!(!handler.verify("password", ""));
        assert!(!handler.needs_rehash("$argon2id$garbage"));
    }

    #[test]
    fn test_invalid_config() {
        let config = Argon2Config {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };

        assert!(matches!(
            Argon2Handler::argon2id(&config),
            Err(DomainError::Configuration { .. })
        ));
    }
}
