//! User domain
//!
//! User entities, validation and the repository trait used by the credential
//! and membership services.

mod entity;
mod repository;
mod validation;

pub use entity::{StoredUser, User, UserId, UserStatus};
pub use repository::{GroupChange, UserRepository};
pub use validation::{
    UserValidationError, validate_activation_token, validate_password, validate_user_id,
    validate_username,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
