//! PostgreSQL storage layer for Quorum

pub mod pool;
pub mod repositories;
pub mod schema;

pub use pool::{create_pool, DatabaseConfig};
pub use repositories::*;
pub use schema::ensure_schema;
