//! Redirect-based invite token mint
//!
//! The identity provider mints invite tokens through its authorize endpoint:
//! a non-redirect-following GET whose 3xx `Location` carries the token in the
//! URL fragment. Any other response shape is a typed mint failure, never a
//! panic or a stringly-typed error.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use quorum_core::{InviteId, InviteTokenMinter, QuorumError, Result};

/// Configuration for the provider's authorize-endpoint exchange
#[derive(Debug, Clone, Deserialize)]
pub struct TokenMintConfig {
    /// Provider authorize endpoint, e.g.
    /// `https://{tenant}.b2clogin.com/{tenant}.onmicrosoft.com/oauth2/v2.0/authorize`
    pub authorize_endpoint: String,
    /// Policy (user flow) name passed as the `p` parameter
    pub policy: String,
    pub client_id: String,
    /// Registered redirect URI; the token arrives in this URL's fragment
    pub callback: String,
}

/// InviteTokenMinter implementation speaking the authorize-redirect exchange.
pub struct RedirectTokenMinter {
    config: TokenMintConfig,
    // Must not follow redirects: the token lives in the Location header.
    client: reqwest::Client,
}

impl RedirectTokenMinter {
    pub fn new(config: TokenMintConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| QuorumError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { config, client })
    }

    fn authorize_url(&self, email: &str) -> String {
        format!(
            "{}?p={}&client_id={}&nonce={}&redirect_uri={}&scope=openid&response_type=id_token&disable_cache=true&login_hint={}",
            self.config.authorize_endpoint,
            urlencoding::encode(&self.config.policy),
            urlencoding::encode(&self.config.client_id),
            Uuid::new_v4(),
            urlencoding::encode(&self.config.callback),
            urlencoding::encode(email),
        )
    }
}

#[async_trait]
impl InviteTokenMinter for RedirectTokenMinter {
    #[instrument(skip(self, invite_id))]
    async fn mint(&self, email: &str, invite_id: InviteId) -> Result<String> {
        let url = self.authorize_url(email);

        let response = self.client.get(&url).send().await.map_err(|e| {
            QuorumError::invite_token_mint_failed(format!("Authorize request failed: {}", e))
        })?;

        if !response.status().is_redirection() {
            return Err(QuorumError::invite_token_mint_failed(format!(
                "Expected redirect from authorize endpoint, got HTTP {}",
                response.status()
            )));
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                QuorumError::invite_token_mint_failed(
                    "Redirect response missing Location header".to_string(),
                )
            })?;

        match parse_id_token(location, &self.config.callback) {
            Some(token) => {
                debug!(%invite_id, "Minted invite token from authorize redirect");
                Ok(token.to_string())
            }
            None => Err(QuorumError::invite_token_mint_failed(
                "Redirect location did not carry an id_token fragment".to_string(),
            )),
        }
    }

    fn redeem_url(&self, token: &str) -> String {
        format!(
            "{}?p={}&client_id={}&nonce={}&redirect_uri={}&scope=openid&response_type=id_token&disable_cache=true&id_token_hint={}",
            self.config.authorize_endpoint,
            urlencoding::encode(&self.config.policy),
            urlencoding::encode(&self.config.client_id),
            Uuid::new_v4(),
            urlencoding::encode(&self.config.callback),
            urlencoding::encode(token),
        )
    }
}

/// Extract the token from a redirect location of the form
/// `<callback>#id_token=<token>`. Returns `None` for any other shape.
fn parse_id_token<'a>(location: &'a str, callback: &str) -> Option<&'a str> {
    let prefix = format!("{}#id_token=", callback);
    let token = location.strip_prefix(prefix.as_str())?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
