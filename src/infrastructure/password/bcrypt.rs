//! bcrypt password handler

use bcrypt::{HashParts, Version};

use crate::domain::{DomainError, HashOptions, PasswordHandler};

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// bcrypt handler writing `$2y$` hashes
#[derive(Debug, Clone)]
pub struct BcryptHandler {
    cost: u32,
}

impl BcryptHandler {
    pub fn new(cost: u32) -> Result<Self, DomainError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(DomainError::configuration(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }

        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl PasswordHandler for BcryptHandler {
    fn hash(&self, plaintext: &str, options: &HashOptions) -> Result<String, DomainError> {
        let cost = options.cost.unwrap_or(self.cost);

        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(DomainError::validation(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }

        bcrypt::hash_with_result(plaintext, cost)
            .map(|parts| parts.format_for_version(Version::TwoY))
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, plaintext: &str, encoded: &str) -> bool {
        bcrypt::verify(plaintext, encoded).unwrap_or(false)
    }

    fn needs_rehash(&self, encoded: &str) -> bool {
        match encoded.parse::<HashParts>() {
            Ok(parts) => parts.get_cost() != self.cost,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let handler = BcryptHandler::new(4).unwrap();
        let hash = handler.hash("my_secure_password", &HashOptions::default()).unwrap();

        assert!(hash.starts_with("$2y$04$"));
        assert!(handler.verify("my_secure_password", &hash));
        assert!(!handler.verify("wrong_password", &hash));
    }

    #[test]
    fn test_verifies_2b_variant() {
        let handler = BcryptHandler::new(4).unwrap();
        let hash = bcrypt::hash_with_result("pa55word", 4)
            .unwrap()
            .format_for_version(Version::TwoB);

        assert!(handler.verify("pa55word", &hash));
    }

    #[test]
    fn test_cost_option() {
        let handler = BcryptHandler::new(4).unwrap();
        let hash = handler
            .hash("password", &HashOptions::new().with_cost(5))
            .unwrap();

        assert!(hash.starts_with("$2y$05$"));
        assert!(handler.needs_rehash(&hash));
    }

    #[test]
    fn test_needs_rehash_same_cost() {
        let handler = BcryptHandler::new(4).unwrap();
        let hash = handler.hash("password", &HashOptions::default()).unwrap();

        assert!(!handler.needs_rehash(&hash));
    }

    #[test]
    fn test_invalid_cost() {
        assert!(BcryptHandler::new(3).is_err());
        assert!(BcryptHandler::new(32).is_err());

        let handler = BcryptHandler::new(4).unwrap();
        assert!(handler.hash("password", &HashOptions::new().with_cost(2)).is_err());
    }

    #[test]
    fn test_verify_malformed() {
        let handler = BcryptHandler::new(4).unwrap();

        assert!(!handler.verify("password", "$2y$10$short"));
        assert!(!handler.verify("password", "not a hash"));
        assert!(!handler.needs_rehash("not a hash"));
    }
}
