//! Quorum API - HTTP layer for the invitation platform

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
