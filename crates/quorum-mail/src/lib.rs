//! Transactional email delivery for invitations and welcomes.

pub mod smtp;
pub mod templates;

pub use smtp::{MailConfig, SmtpMailer};
pub use templates::{InvitationEmailContent, WelcomeEmailContent};
