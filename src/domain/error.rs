use thiserror::Error;

use super::group::GroupId;

/// Core domain errors
///
/// Password mismatches are not errors: verification reports them as `false`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("The {algorithm} algorithm is not supported for hashing passwords")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Access usergroup invalid: group {group_id} does not exist")]
    GroupNotFound { group_id: GroupId },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn unsupported_algorithm(algorithm: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm {
            algorithm: algorithm.into(),
        }
    }

    pub fn group_not_found(group_id: GroupId) -> Self {
        Self::GroupNotFound { group_id }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error came from the backing store
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("User '42' not found");
        assert_eq!(error.to_string(), "Not found: User '42' not found");
    }

    #[test]
    fn test_unsupported_algorithm_error() {
        let error = DomainError::unsupported_algorithm("sha1");
        assert_eq!(
            error.to_string(),
            "The sha1 algorithm is not supported for hashing passwords"
        );
    }

    #[test]
    fn test_group_not_found_error() {
        let error = DomainError::group_not_found(GroupId::new(7));
        assert!(matches!(error, DomainError::GroupNotFound { group_id } if group_id.value() == 7));
        assert!(error.to_string().contains("group 7"));
    }

    #[test]
    fn test_persistence_error() {
        let error = DomainError::persistence("connection reset");
        assert!(error.is_persistence());
        assert!(!DomainError::validation("x").is_persistence());
    }
}
