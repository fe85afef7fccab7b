//! Storage infrastructure - PostgreSQL pool and schema

pub mod migrations;
mod postgres;

pub use migrations::{Migration, Migrator, PostgresMigrator, run_storage_migrations};
pub use postgres::create_pool;
