//! Password hashing domain
//!
//! The closed set of supported algorithms, prefix sniffing of encoded
//! credentials, and the handler contract every algorithm implements.

mod algorithm;
mod handler;

pub use algorithm::HashAlgorithm;
pub use handler::{HashOptions, PasswordHandler};
