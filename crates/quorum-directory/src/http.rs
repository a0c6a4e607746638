//! HTTP client wrapper with retry logic

use reqwest::Client;

use quorum_core::{QuorumError, Result};

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl HttpClient {
    pub fn new(max_retries: u32, retry_delay_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| QuorumError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            max_retries,
            retry_delay_ms,
        })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Execute a request with retries
    pub async fn execute_with_retry(
        &self,
        request_builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay_ms * 2u64.pow(attempt - 1);
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }

            match request_builder.try_clone() {
                Some(rb) => {
                    match rb.send().await {
                        Ok(response) => {
                            if response.status().is_success() || response.status().is_redirection()
                            {
                                return Ok(response);
                            }

                            // Don't retry client errors (4xx) except 429
                            if response.status().is_client_error()
                                && response.status().as_u16() != 429
                            {
                                let status = response.status();
                                let body = response.text().await.unwrap_or_default();
                                return Err(QuorumError::Internal {
                                    message: format!("HTTP {} - {}", status, body),
                                });
                            }

                            last_error = Some(format!("HTTP {}", response.status()));
                        }
                        Err(e) => {
                            last_error = Some(e.to_string());
                        }
                    }
                }
                None => {
                    return Err(QuorumError::Internal {
                        message: "Request cannot be cloned for retry".to_string(),
                    });
                }
            }
        }

        Err(QuorumError::Internal {
            message: format!(
                "Request failed after {} retries: {}",
                self.max_retries,
                last_error.unwrap_or_default()
            ),
        })
    }
}
