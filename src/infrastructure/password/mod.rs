//! Password handlers and the credential service built on them

mod argon2;
mod bcrypt;
mod chained;
mod compare;
mod md5;
mod phpass;
mod random;
mod registry;
mod service;

pub use argon2::Argon2Handler;
pub use bcrypt::BcryptHandler;
pub use chained::ChainedHandler;
pub use md5::Md5Handler;
pub use phpass::PhpassHandler;
pub use random::{
    DEFAULT_PASSWORD_LENGTH, PASSWORD_ALPHABET, gen_random_password, gen_random_password_with,
};
pub use registry::HandlerRegistry;
pub use service::CredentialService;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{Argon2Config, PasswordConfig};
    use crate::domain::HashAlgorithm;

    /// Cheapest parameters every handler accepts
    pub fn fast_config() -> PasswordConfig {
        PasswordConfig {
            default_algorithm: HashAlgorithm::Bcrypt,
            bcrypt_cost: 4,
            argon2: Argon2Config {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            phpass_iteration_log2: 8,
        }
    }
}
