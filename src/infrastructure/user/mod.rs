//! User infrastructure module
//!
//! In-memory and PostgreSQL user repositories and the user service.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::UserService;
