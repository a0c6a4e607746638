//! Directory account provisioning via Microsoft Graph

pub mod client;
pub mod credential;
pub mod http;

pub use client::{DirectoryConfig, GraphDirectoryClient};
pub use credential::generate_initial_credential;
pub use http::HttpClient;
