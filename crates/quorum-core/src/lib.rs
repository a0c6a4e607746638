//! Quorum Core - Domain types and traits for the invitation platform

pub mod error;
pub mod ids;
pub mod models;
pub mod scopes;
pub mod traits;


pub use error::*;
pub use ids::*;
pub use models::*;
pub use scopes::{compute_scopes, SCOPE_READ, SCOPE_WRITE};
pub use traits::*;
