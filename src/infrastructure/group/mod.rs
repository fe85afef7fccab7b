//! Group infrastructure module

mod postgres_repository;
mod repository;

pub use postgres_repository::PostgresGroupRepository;
pub use repository::InMemoryGroupRepository;
