//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID must be a positive integer, got {0}")]
    NonPositiveId(i64),

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username is too short. Minimum length is {0} characters")]
    UsernameTooShort(usize),

    #[error("Username contains invalid character: '{0}'")]
    InvalidUsernameCharacter(char),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} bytes")]
    PasswordTooLong(usize),

    #[error("Password cannot contain leading or trailing whitespace")]
    PasswordPadded,

    #[error("Activation token cannot be empty")]
    EmptyActivationToken,
}

const MIN_USERNAME_LENGTH: usize = 2;
const MAX_USERNAME_LENGTH: usize = 150;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 4096;

/// Characters that are never accepted in a username
const FORBIDDEN_USERNAME_CHARS: &[char] = &['<', '>', '"', '\'', '%', ';', '(', ')', '&', '\\'];

/// Validate a numeric user ID
pub fn validate_user_id(id: i64) -> Result<(), UserValidationError> {
    if id <= 0 {
        return Err(UserValidationError::NonPositiveId(id));
    }

    Ok(())
}

/// Validate a username
///
/// Rules:
/// - Between 2 and 150 characters
/// - No markup, quoting or escape characters
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }

    let length = username.chars().count();

    if length < MIN_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooShort(MIN_USERNAME_LENGTH));
    }

    if length > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    if let Some(c) = username
        .chars()
        .find(|c| c.is_control() || FORBIDDEN_USERNAME_CHARS.contains(c))
    {
        return Err(UserValidationError::InvalidUsernameCharacter(c));
    }

    Ok(())
}

/// Validate a plaintext password before hashing
///
/// The upper bound keeps a single hash request from pinning a worker.
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    if password.trim() != password {
        return Err(UserValidationError::PasswordPadded);
    }

    Ok(())
}

/// Validate an account activation token
pub fn validate_activation_token(token: &str) -> Result<(), UserValidationError> {
    if token.trim().is_empty() {
        return Err(UserValidationError::EmptyActivationToken);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_ids() {
        assert!(validate_user_id(1).is_ok());
        assert!(validate_user_id(42).is_ok());
    }

    #[test]
    fn test_non_positive_user_ids() {
        assert_eq!(
            validate_user_id(0),
            Err(UserValidationError::NonPositiveId(0))
        );
        assert_eq!(
            validate_user_id(-3),
            Err(UserValidationError::NonPositiveId(-3))
        );
    }

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("jo").is_ok());
        assert!(validate_username("jane.doe@example.com").is_ok());
        assert!(validate_username("Zoë Martín").is_ok());
    }

    #[test]
    fn test_empty_username() {
        assert_eq!(
            validate_username(""),
            Err(UserValidationError::EmptyUsername)
        );
    }

    #[test]
    fn test_username_too_short() {
        assert_eq!(
            validate_username("a"),
            Err(UserValidationError::UsernameTooShort(2))
        );
    }

    #[test]
    fn test_username_too_long() {
        let long_username = "a".repeat(151);
        assert_eq!(
            validate_username(&long_username),
            Err(UserValidationError::UsernameTooLong(150))
        );
    }

    #[test]
    fn test_username_invalid_character() {
        assert_eq!(
            validate_username("<script>"),
            Err(UserValidationError::InvalidUsernameCharacter('<'))
        );
        assert_eq!(
            validate_username("bob;drop"),
            Err(UserValidationError::InvalidUsernameCharacter(';'))
        );
    }

    #[test]
    fn test_valid_passwords() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("P@ss w0rd!").is_ok());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            validate_password("1234567"),
            Err(UserValidationError::PasswordTooShort(8))
        );
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(4097);
        assert_eq!(
            validate_password(&long_password),
            Err(UserValidationError::PasswordTooLong(4096))
        );
    }

    #[test]
    fn test_password_padded() {
        assert_eq!(
            validate_password(" password123"),
            Err(UserValidationError::PasswordPadded)
        );
    }

    #[test]
    fn test_activation_token() {
        assert!(validate_activation_token("a1b2c3").is_ok());
        assert_eq!(
            validate_activation_token("  "),
            Err(UserValidationError::EmptyActivationToken)
        );
    }
}
