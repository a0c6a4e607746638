//! Microsoft Graph directory client
//!
//! Provisions and manages directory accounts in an Azure AD B2C tenant via
//! the Graph API, authenticating with client credentials.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use quorum_core::{DirectoryAccount, DirectoryService, ObjectIdentity, QuorumError, Result};

use crate::credential::generate_initial_credential;
use crate::http::HttpClient;

const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

// Fields requested on every user read; `identities` is not returned by
// default and must be selected explicitly.
const USER_SELECT: &str = "$select=id,displayName,mail,userPrincipalName,accountEnabled,identities";

/// Configuration for the Graph directory client
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Directory (tenant) GUID used for token acquisition
    pub tenant_id: String,
    /// Tenant domain (e.g. `contoso.onmicrosoft.com`), used as the local
    /// account issuer and the UPN suffix
    pub tenant_domain: String,
    pub client_id: String,
    pub client_secret: String,
    pub max_retries: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            tenant_domain: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            max_retries: 3,
        }
    }
}

/// Graph-backed implementation of DirectoryService
pub struct GraphDirectoryClient {
    config: DirectoryConfig,
    http_client: HttpClient,
}

impl GraphDirectoryClient {
    pub fn new(config: DirectoryConfig) -> Result<Self> {
        let http_client = HttpClient::new(config.max_retries, 1000)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Get an access token for Microsoft Graph API
    async fn get_graph_token(&self) -> Result<String> {
        let token_url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.config.tenant_id
        );

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", "https://graph.microsoft.com/.default"),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http_client
            .execute_with_retry(self.http_client.inner().post(&token_url).form(&params))
            .await?;

        let token_response: GraphTokenResponse =
            response
                .json()
                .await
                .map_err(|e| QuorumError::ProvisioningFailed {
                    message: format!("Failed to parse token response: {}", e),
                })?;

        Ok(token_response.access_token)
    }

    /// Make an authenticated GET request to Microsoft Graph
    async fn graph_get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        token: &str,
    ) -> Result<T> {
        let url = format!("{}{}", GRAPH_BASE_URL, endpoint);

        let response = self
            .http_client
            .execute_with_retry(self.http_client.inner().get(&url).bearer_auth(token))
            .await?;

        response
            .json()
            .await
            .map_err(|e| QuorumError::ProvisioningFailed {
                message: format!("Failed to parse Graph response: {}", e),
            })
    }

    async fn graph_post<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        token: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", GRAPH_BASE_URL, endpoint);

        let response = self
            .http_client
            .execute_with_retry(
                self.http_client
                    .inner()
                    .post(&url)
                    .bearer_auth(token)
                    .json(body),
            )
            .await?;

        response
            .json()
            .await
            .map_err(|e| QuorumError::ProvisioningFailed {
                message: format!("Failed to parse Graph response: {}", e),
            })
    }

    async fn graph_patch<B: Serialize>(&self, endpoint: &str, token: &str, body: &B) -> Result<()> {
        let url = format!("{}{}", GRAPH_BASE_URL, endpoint);

        self.http_client
            .execute_with_retry(
                self.http_client
                    .inner()
                    .patch(&url)
                    .bearer_auth(token)
                    .json(body),
            )
            .await?;

        Ok(())
    }

    /// Make a paginated request to Microsoft Graph, following continuation
    /// links until exhausted
    async fn graph_get_paginated<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        token: &str,
    ) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut url = format!("{}{}", GRAPH_BASE_URL, endpoint);

        loop {
            let response = self
                .http_client
                .execute_with_retry(self.http_client.inner().get(&url).bearer_auth(token))
                .await?;

            let page: GraphListResponse<T> =
                response
                    .json()
                    .await
                    .map_err(|e| QuorumError::ProvisioningFailed {
                        message: format!("Failed to parse Graph response: {}", e),
                    })?;

            all_items.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(all_items)
    }
}

#[async_trait]
impl DirectoryService for GraphDirectoryClient {
    #[instrument(skip(self))]
    async fn create_or_get(&self, email: &str) -> Result<DirectoryAccount> {
        if let Some(existing) = self.get_by_email(email).await? {
            return Ok(existing);
        }

        let token = self.get_graph_token().await?;
        let new_user = NewDirectoryUser::for_email(email, &self.config.tenant_domain);

        match self
            .graph_post::<_, DirectoryAccount>("/users", &token, &new_user)
            .await
        {
            Ok(account) => {
                info!(account_id = %account.id, "Created directory account");
                Ok(account)
            }
            // A concurrent writer may have created the account between our
            // read and the create. Re-read before reporting failure.
            Err(create_err) => match self.get_by_email(email).await? {
                Some(account) => Ok(account),
                None => Err(create_err),
            },
        }
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> Result<Option<DirectoryAccount>> {
        let token = self.get_graph_token().await?;

        let filter = format!("mail eq '{}'", email.replace('\'', "''"));
        let endpoint = format!(
            "/users?$filter={}&{}",
            urlencoding::encode(&filter),
            USER_SELECT
        );

        let mut accounts: Vec<DirectoryAccount> =
            self.graph_get_paginated(&endpoint, &token).await?;

        Ok(if accounts.is_empty() {
            None
        } else {
            Some(accounts.remove(0))
        })
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<Option<DirectoryAccount>> {
        let token = self.get_graph_token().await?;

        let result: Result<DirectoryAccount> = self
            .graph_get(&format!("/users/{}?{}", id, USER_SELECT), &token)
            .await;

        match result {
            Ok(account) => Ok(Some(account)),
            Err(e) => {
                if e.to_string().contains("404") {
                    Ok(None)
                } else {
                    Err(e)
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<DirectoryAccount>> {
        let token = self.get_graph_token().await?;
        self.graph_get_paginated(&format!("/users?{}", USER_SELECT), &token)
            .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        let token = self.get_graph_token().await?;
        let url = format!("{}/users/{}", GRAPH_BASE_URL, id);

        self.http_client
            .execute_with_retry(self.http_client.inner().delete(&url).bearer_auth(&token))
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_credential(&self, id: &str) -> Result<()> {
        let token = self.get_graph_token().await?;

        let body = serde_json::json!({
            "passwordProfile": PasswordProfile::fresh(),
        });

        self.graph_patch(&format!("/users/{}", id), &token, &body)
            .await
    }
}

/// Build the user principal name for a local account: the email with `@`
/// replaced so it nests under the tenant domain.
fn upn_from_email(email: &str, tenant_domain: &str) -> String {
    format!("{}@{}", email.replace('@', "_"), tenant_domain)
}

// =============================================================================
// Graph API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GraphListResponse<T> {
    value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphTokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct NewDirectoryUser {
    #[serde(rename = "accountEnabled")]
    account_enabled: bool,
    #[serde(rename = "displayName")]
    display_name: String,
    mail: String,
    #[serde(rename = "mailNickname")]
    mail_nickname: String,
    #[serde(rename = "userPrincipalName")]
    user_principal_name: String,
    #[serde(rename = "passwordPolicies")]
    password_policies: String,
    #[serde(rename = "passwordProfile")]
    password_profile: PasswordProfile,
    identities: Vec<ObjectIdentity>,
}

impl NewDirectoryUser {
    /// Account skeleton for an invited user: disabled until the invite is
    /// claimed, bound to the email as a local sign-in identity.
    fn for_email(email: &str, tenant_domain: &str) -> Self {
        Self {
            account_enabled: false,
            display_name: email.to_string(),
            mail: email.to_string(),
            mail_nickname: "Primary".to_string(),
            user_principal_name: upn_from_email(email, tenant_domain),
            password_policies: "DisablePasswordExpiration,DisableStrongPassword".to_string(),
            password_profile: PasswordProfile::fresh(),
            identities: vec![ObjectIdentity {
                sign_in_type: "emailAddress".to_string(),
                issuer: tenant_domain.to_string(),
                issuer_assigned_id: email.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct PasswordProfile {
    #[serde(rename = "forceChangePasswordNextSignIn")]
    force_change_password_next_sign_in: bool,
    password: String,
}

impl PasswordProfile {
    fn fresh() -> Self {
        Self {
            force_change_password_next_sign_in: true,
            password: generate_initial_credential(10, 10, 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upn_from_email() {
        assert_eq!(
            upn_from_email("jane@example.com", "contoso.onmicrosoft.com"),
            "jane_example.com@contoso.onmicrosoft.com"
        );
    }

    #[test]
    fn test_new_user_wire_shape() {
        let user = NewDirectoryUser::for_email("jane@example.com", "contoso.onmicrosoft.com");
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["accountEnabled"], false);
        assert_eq!(json["displayName"], "jane@example.com");
        assert_eq!(json["mail"], "jane@example.com");
        assert_eq!(json["mailNickname"], "Primary");
        assert_eq!(
            json["userPrincipalName"],
            "jane_example.com@contoso.onmicrosoft.com"
        );
        assert_eq!(
            json["passwordPolicies"],
            "DisablePasswordExpiration,DisableStrongPassword"
        );
        assert_eq!(json["passwordProfile"]["forceChangePasswordNextSignIn"], true);

        let identity = &json["identities"][0];
        assert_eq!(identity["signInType"], "emailAddress");
        assert_eq!(identity["issuer"], "contoso.onmicrosoft.com");
        assert_eq!(identity["issuerAssignedId"], "jane@example.com");
    }
}
