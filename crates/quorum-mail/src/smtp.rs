//! SMTP mail sender implementation.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Deserialize;
use tracing::{info, instrument};

use quorum_core::{MailSender, QuorumError, Result};

use crate::templates::{InvitationEmailContent, WelcomeEmailContent};

/// SMTP delivery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    /// Sender address for all outgoing mail
    pub sender_address: String,
    pub sender_name: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: None,
            password: None,
            use_tls: true,
            sender_address: "noreply@quorum.local".to_string(),
            sender_name: Some("Quorum".to_string()),
        }
    }
}

/// SMTP implementation of MailSender. The transport is built once at
/// construction and pooled by lettre across sends.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let mut builder = if config.use_tls {
            let tls_params = TlsParameters::new(config.host.clone()).map_err(|e| {
                QuorumError::config_error(format!("TLS configuration error: {}", e))
            })?;

            // Port 465 uses implicit TLS (SMTPS), other ports use STARTTLS
            if config.port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                    .map_err(|e| QuorumError::config_error(format!("SMTP relay error: {}", e)))?
                    .port(config.port)
                    .tls(Tls::Wrapper(tls_params))
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(|e| QuorumError::config_error(format!("SMTP relay error: {}", e)))?
                    .port(config.port)
                    .tls(Tls::Required(tls_params))
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port)
        };

        if let (Some(user), Some(pass)) = (config.username.clone(), config.password.clone()) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        let sender_spec = match &config.sender_name {
            Some(name) => format!("{} <{}>", name, config.sender_address),
            None => config.sender_address.clone(),
        };
        let sender: Mailbox = sender_spec
            .parse()
            .map_err(|e| QuorumError::config_error(format!("Invalid sender address: {}", e)))?;

        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }

    async fn send(&self, to: &str, subject: &str, text: String, html: String) -> Result<()> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to
                .parse()
                .map_err(|e| QuorumError::delivery_failed(format!("Invalid recipient: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )
            .map_err(|e| QuorumError::delivery_failed(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| QuorumError::delivery_failed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    #[instrument(skip(self, invite_url))]
    async fn send_invitation(&self, recipient: &str, invite_url: &str) -> Result<()> {
        let content = InvitationEmailContent::new(invite_url);
        self.send(recipient, &content.subject, content.text, content.html)
            .await?;
        info!("Sent invitation email");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_welcome(&self, recipient: &str) -> Result<()> {
        let content = WelcomeEmailContent::new();
        self.send(recipient, &content.subject, content.text, content.html)
            .await?;
        info!("Sent welcome email");
        Ok(())
    }
}
