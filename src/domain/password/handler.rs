//! Password handler contract

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Per-call tuning knobs; unset fields fall back to the handler's configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashOptions {
    /// bcrypt cost factor
    pub cost: Option<u32>,
    /// Argon2 memory cost in KiB
    pub memory_kib: Option<u32>,
    /// Argon2 number of passes
    pub iterations: Option<u32>,
    /// Argon2 degree of parallelism
    pub parallelism: Option<u32>,
}

impl HashOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_memory_kib(mut self, memory_kib: u32) -> Self {
        self.memory_kib = Some(memory_kib);
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = Some(parallelism);
        self
    }
}

/// Hashing and verification strategy for one credential format
///
/// `verify` never fails: malformed encodings are a mismatch.
pub trait PasswordHandler: Send + Sync + Debug {
    /// Encode a plaintext password
    fn hash(&self, plaintext: &str, options: &HashOptions) -> Result<String, DomainError>;

    /// Check a plaintext password against an encoded credential
    fn verify(&self, plaintext: &str, encoded: &str) -> bool;

    /// Whether an encoded credential should be replaced after a successful verify
    fn needs_rehash(&self, _encoded: &str) -> bool {
        false
    }
}
