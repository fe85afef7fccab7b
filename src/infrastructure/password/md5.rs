//! Salted MD5 handler for legacy credentials
//!
//! Format: `md5_hex(plaintext + salt) ":" salt`. The unsalted `md5_hex` form
//! is accepted for verification; `md5_hex ":"` with an empty salt is not.

use md5::{Digest, Md5};

use super::compare::constant_time_eq;
use super::random::gen_random_password;
use crate::domain::{DomainError, HashOptions, PasswordHandler};

const SALT_LENGTH: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct Md5Handler;

impl Md5Handler {
    pub fn new() -> Self {
        Self
    }
}

fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

impl PasswordHandler for Md5Handler {
    fn hash(&self, plaintext: &str, _options: &HashOptions) -> Result<String, DomainError> {
        let salt = gen_random_password(SALT_LENGTH);
        Ok(format!("{}:{}", md5_hex(&format!("{}{}", plaintext, salt)), salt))
    }

    fn verify(&self, plaintext: &str, encoded: &str) -> bool {
        let salt = encoded.split(':').nth(1).unwrap_or("");
        let digest = md5_hex(&format!("{}{}", plaintext, salt));

        // An empty salt is written without the separator.
        let expected = if salt.is_empty() {
            digest
        } else {
            format!("{}:{}", digest, salt)
        };

        constant_time_eq(encoded, &expected)
    }

    fn needs_rehash(&self, _encoded: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_hex_vectors() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_hash_and_verify() {
        let handler = Md5Handler::new();
        let hash = handler.hash("legacy-secret", &HashOptions::default()).unwrap();

        let (digest, salt) = hash.split_once(':').unwrap();
        assert_eq!(digest.len(), 32);
        assert_eq!(salt.len(), SALT_LENGTH);

        assert!(handler.verify("legacy-secret", &hash));
        assert!(!handler.verify("other-secret", &hash));
    }

    #[test]
    fn test_verify_unsalted() {
        let handler = Md5Handler::new();

        assert!(handler.verify("password", "5f4dcc3b5aa765d61d8327deb882cf99"));
        assert!(!handler.verify("Password", "5f4dcc3b5aa765d61d8327deb882cf99"));
    }

    #[test]
    fn test_verify_rejects_trailing_separator() {
        let handler = Md5Handler::new();

        assert!(!handler.verify("password", "5f4dcc3b5aa765d61d8327deb882cf99:"));
    }

    #[test]
    fn test_verify_known_salted_value() {
        let handler = Md5Handler::new();

        // md5("ab" + "c") == md5("abc")
        let salted = format!("{}:c", md5_hex("abc"));
        assert!(handler.verify("ab", &salted));
        assert!(!handler.verify("abc", &salted));
    }

    #[test]
    fn test_always_needs_rehash() {
        let handler = Md5Handler::new();
        assert!(handler.needs_rehash("5f4dcc3b5aa765d61d8327deb882cf99"));
    }
}
