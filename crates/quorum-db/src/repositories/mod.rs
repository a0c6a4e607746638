//! Repository implementations for PostgreSQL

pub mod access_record;
pub mod invite;

pub use access_record::*;
pub use invite::*;
