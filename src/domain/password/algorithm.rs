//! Hash algorithm tags

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Supported password hashing algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashAlgorithm {
    Argon2id,
    Argon2i,
    #[default]
    Bcrypt,
    /// Salted MD5, kept only so old credentials can still be verified
    Md5,
    /// Portable PHPass, kept only so old credentials can still be verified
    Phpass,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 5] = [
        Self::Argon2id,
        Self::Argon2i,
        Self::Bcrypt,
        Self::Md5,
        Self::Phpass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Argon2id => "argon2id",
            Self::Argon2i => "argon2i",
            Self::Bcrypt => "bcrypt",
            Self::Md5 => "md5",
            Self::Phpass => "phpass",
        }
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self, Self::Md5 | Self::Phpass)
    }

    /// Infer the algorithm that produced an encoded credential
    ///
    /// Precedence: `$P$`, `$argon2id`, `$argon2i`, `$2`. `None` means the
    /// encoding is ambiguous and only the chained legacy handler can tell.
    pub fn sniff(encoded: &str) -> Option<Self> {
        if encoded.starts_with("$P$") {
            Some(Self::Phpass)
        } else if encoded.starts_with("$argon2id") {
            Some(Self::Argon2id)
        } else if encoded.starts_with("$argon2i") {
            Some(Self::Argon2i)
        } else if encoded.starts_with("$2") {
            Some(Self::Bcrypt)
        } else {
            None
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = DomainError;

    /// Accepts algorithm names and the legacy numeric codes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2id" | "3" => Ok(Self::Argon2id),
            "argon2i" | "2" => Ok(Self::Argon2i),
            "bcrypt" | "2y" => Ok(Self::Bcrypt),
            "md5" | "100" => Ok(Self::Md5),
            "phpass" | "101" => Ok(Self::Phpass),
            _ => Err(DomainError::unsupported_algorithm(s)),
        }
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashAlgorithm> for String {
    fn from(algorithm: HashAlgorithm) -> Self {
        algorithm.as_str().to_string()
    }
}
