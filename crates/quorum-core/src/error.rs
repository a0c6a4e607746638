//! Error types for the Quorum invitation platform

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuorumError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("Directory provisioning failed: {message}")]
    ProvisioningFailed { message: String },

    #[error("Access record creation failed: {message}")]
    AuthRecordCreationFailed { message: String },

    #[error("Invite token mint failed: {message}")]
    InviteTokenMintFailed { message: String },

    #[error("Invite delivery failed: {message}")]
    InviteDeliveryFailed { message: String },

    #[error("Mail delivery failed: {message}")]
    DeliveryFailed { message: String },

    #[error("Write conflict: {message}")]
    WriteConflict { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl QuorumError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provisioning_failed(message: impl Into<String>) -> Self {
        Self::ProvisioningFailed {
            message: message.into(),
        }
    }

    pub fn auth_record_creation_failed(message: impl Into<String>) -> Self {
        Self::AuthRecordCreationFailed {
            message: message.into(),
        }
    }

    pub fn invite_token_mint_failed(message: impl Into<String>) -> Self {
        Self::InviteTokenMintFailed {
            message: message.into(),
        }
    }

    pub fn invite_delivery_failed(message: impl Into<String>) -> Self {
        Self::InviteDeliveryFailed {
            message: message.into(),
        }
    }

    pub fn delivery_failed(message: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            message: message.into(),
        }
    }

    pub fn write_conflict(message: impl Into<String>) -> Self {
        Self::WriteConflict {
            message: message.into(),
        }
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuorumError>;
