//! SQLite persistence adapter.
//!
//! Stores are kept in a single `stores` table managed with Diesel ORM.

pub mod database;
pub mod store;

pub use database::connection::{create_pool, run_migrations, DbPool};
pub use store::SqliteStoreRepository;
