//! Portable PHPass handler for legacy credentials
//!
//! Layout: `$P$` + iteration char + 8 salt chars + 22 chars of the
//! iterated MD5 digest, all in the `./0-9A-Za-z` base-64 alphabet.

use md5::{Digest, Md5};
use rand::RngCore;
use rand::rngs::OsRng;

use super::compare::constant_time_eq;
use crate::domain::{DomainError, HashOptions, PasswordHandler};

const ITOA64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const MIN_ITERATION_LOG2: u32 = 7;
const MAX_ITERATION_LOG2: u32 = 30;
const SETTING_LENGTH: usize = 12;

#[derive(Debug, Clone)]
pub struct PhpassHandler {
    iteration_log2: u32,
}

impl PhpassHandler {
    pub fn new(iteration_log2: u32) -> Result<Self, DomainError> {
        if !(MIN_ITERATION_LOG2..=MAX_ITERATION_LOG2).contains(&iteration_log2) {
            return Err(DomainError::configuration(format!(
                "PHPass iteration exponent must be between {} and {}, got {}",
                MIN_ITERATION_LOG2, MAX_ITERATION_LOG2, iteration_log2
            )));
        }

        Ok(Self { iteration_log2 })
    }

    fn gen_setting(&self) -> String {
        let mut input = [0u8; 6];
        OsRng.fill_bytes(&mut input);

        let mut setting = String::with_capacity(SETTING_LENGTH);
        setting.push_str("$P$");
        setting.push(char::from(ITOA64[self.iteration_log2 as usize]));
        setting.push_str(&encode64(&input));
        setting
    }
}

/// PHPass base-64: little-endian 6-bit groups, no padding
fn encode64(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len().div_ceil(3) * 4);

    for chunk in input.chunks(3) {
        let value = chunk
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, b)| acc | (u32::from(*b) << (8 * i)));

        for i in 0..=chunk.len() {
            output.push(char::from(ITOA64[((value >> (6 * i)) & 0x3f) as usize]));
        }
    }

    output
}

/// Recompute a portable hash using the setting prefix of `setting`
fn crypt_private(plaintext: &str, setting: &str) -> Option<String> {
    let prefix = setting.get(..SETTING_LENGTH)?;

    if !prefix.starts_with("$P$") && !prefix.starts_with("$H$") {
        return None;
    }

    let count_char = *prefix.as_bytes().get(3)?;
    let count_log2 = ITOA64.iter().position(|c| *c == count_char)? as u32;

    if !(MIN_ITERATION_LOG2..=MAX_ITERATION_LOG2).contains(&count_log2) {
        return None;
    }

    let salt = &prefix[4..];
    let password = plaintext.as_bytes();

    let mut hash = Md5::new().chain_update(salt.as_bytes()).chain_update(password).finalize();

    for _ in 0..(1u64 << count_log2) {
        hash = Md5::new().chain_update(hash).chain_update(password).finalize();
    }

    Some(format!("{}{}", prefix, encode64(&hash)))
}

impl PasswordHandler for PhpassHandler {
    fn hash(&self, plaintext: &str, _options: &HashOptions) -> Result<String, DomainError> {
        crypt_private(plaintext, &self.gen_setting())
            .ok_or_else(|| DomainError::internal("Failed to hash password with PHPass"))
    }

    fn verify(&self, plaintext: &str, encoded: &str) -> bool {
        match crypt_private(plaintext, encoded) {
            Some(computed) => constant_time_eq(&computed, encoded),
            None => false,
        }
    }

    fn needs_rehash(&self, _encoded: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode64_lengths() {
        assert_eq!(encode64(&[0u8; 6]).len(), 8);
        assert_eq!(encode64(&[0u8; 16]).len(), 22);
        assert_eq!(encode64(&[0u8; 3]), "....");
    }

    #[test]
    fn test_encode64_bit_order() {
        // low six bits first: 0x01 -> '/', remaining bits zero -> '.'
        assert_eq!(encode64(&[0x01]), "/.");
        assert_eq!(encode64(&[0x3f, 0x00]), "z..");
    }

    #[test]
    fn test_hash_and_verify() {
        let handler = PhpassHandler::new(8).unwrap();
        let hash = handler.hash("test12345", &HashOptions::default()).unwrap();

        // exponent 8 encodes as '6'
        assert!(hash.starts_with("$P$6"));
        assert_eq!(hash.len(), 34);
        assert!(handler.verify("test12345", &hash));
        assert!(!handler.verify("test123456", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let handler = PhpassHandler::new(8).unwrap();

        let hash1 = handler.hash("password", &HashOptions::default()).unwrap();
        let hash2 = handler.hash("password", &HashOptions::default()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_accepts_h_prefix() {
        let handler = PhpassHandler::new(8).unwrap();
        let hash = handler.hash("password", &HashOptions::default()).unwrap();
        let h_variant = crypt_private("password", &hash.replacen("$P$", "$H$", 1)).unwrap();

        assert!(h_variant.starts_with("$H$"));
        assert!(handler.verify("password", &h_variant));
    }

    #[test]
    fn test_verify_malformed() {
        let handler = PhpassHandler::new(8).unwrap();

        assert!(!handler.verify("password", "$P$"));
        assert!(!handler.verify("password", "$X$6abcdefgh0123456789012345678901"));
        // iteration char '.' decodes to 0, below the minimum
        assert!(!handler.verify("password", "$P$.abcdefgh0123456789012345678901"));
    }

    #[test]
    fn test_invalid_iteration_exponent() {
        assert!(PhpassHandler::new(6).is_err());
        assert!(PhpassHandler::new(31).is_err());
    }

    #[test]
    fn test_always_needs_rehash() {
        let handler = PhpassHandler::new(8).unwrap();
        assert!(handler.needs_rehash("$P$8anything"));
    }
}
