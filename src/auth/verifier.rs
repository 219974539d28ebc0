use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error};

use super::AuthError;
use crate::config::AuthConfig;

/// Checks an email/password pair against an identity provider.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(false)` means the provider answered and rejected the credentials;
    /// `Err` means the provider could not be asked.
    async fn verify(&self, email: &str, password: &str) -> Result<bool, AuthError>;
}

/// Forwards credentials to the remote verification endpoint.
#[derive(Debug, Clone)]
pub struct RemoteVerifier {
    client: Client,
    url: String,
}

impl RemoteVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Upstream(e.to_string()))?;
        Ok(Self {
            client,
            url: config.verify_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CredentialVerifier for RemoteVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| {
                error!("Identity service request to {} failed: {}", self.url, e);
                AuthError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!("Identity service rejected {} with status {}", email, status);
            return Ok(false);
        }

        match response.json::<Value>().await {
            Ok(body) => Ok(is_verification_marker(&body)),
            Err(e) => {
                debug!("Identity service returned an unreadable body for {}: {}", email, e);
                Ok(false)
            }
        }
    }
}

/// The provider signals success with exactly `["Verified", "True"]`.
pub fn is_verification_marker(body: &Value) -> bool {
    match body.as_array().map(Vec::as_slice) {
        Some([Value::String(status), Value::String(flag)]) => status == "Verified" && flag == "True",
        _ => false,
    }
}
