//! Invitation workflow and redirect token mint client.

pub mod token;
pub mod workflow;

pub use token::{RedirectTokenMinter, TokenMintConfig};
pub use workflow::{InviteOutcome, InviteWorkflow};
