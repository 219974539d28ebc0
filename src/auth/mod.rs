pub mod verifier;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::store::TrailStore;
use crate::types::Credentials;

pub use verifier::{is_verification_marker, CredentialVerifier, RemoteVerifier};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Credentials are required")]
    MissingCredentials,
    #[error("Email and Password are required")]
    MissingEmailOrPassword,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Identity service unavailable: {0}")]
    Upstream(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Verifies credentials remotely on every request and maps the caller onto a
/// local user row, creating it the first time an email is seen.
#[derive(Clone)]
pub struct IdentityGateway {
    verifier: Arc<dyn CredentialVerifier>,
    store: Arc<dyn TrailStore>,
}

impl IdentityGateway {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, store: Arc<dyn TrailStore>) -> Self {
        Self { verifier, store }
    }

    pub async fn authenticate(&self, credentials: Option<Credentials>) -> Result<User, AuthError> {
        let credentials = credentials.ok_or(AuthError::MissingCredentials)?;
        if credentials.email.is_none() && credentials.password.is_none() {
            return Err(AuthError::MissingCredentials);
        }

        let email = non_blank(credentials.email);
        let password = credentials.password.filter(|p| !p.is_empty());
        let (Some(email), Some(password)) = (email, password) else {
            return Err(AuthError::MissingEmailOrPassword);
        };

        if !self.verifier.verify(&email, &password).await? {
            warn!("Authentication failed for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let user = self.store.find_or_create_user(&email).await?;
        debug!("Authenticated {} as user {}", user.email, user.user_id);
        Ok(user)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryTrailStore;
    use async_trait::async_trait;

    struct StaticVerifier {
        password: &'static str,
    }

    #[async_trait]
    impl CredentialVerifier for StaticVerifier {
        async fn verify(&self, _email: &str, password: &str) -> Result<bool, AuthError> {
            Ok(password == self.password)
        }
    }

    struct Unreachable;

    #[async_trait]
    impl CredentialVerifier for Unreachable {
        async fn verify(&self, _email: &str, _password: &str) -> Result<bool, AuthError> {
            Err(AuthError::Upstream("connection refused".to_string()))
        }
    }

    fn gateway(verifier: Arc<dyn CredentialVerifier>) -> IdentityGateway {
        IdentityGateway::new(verifier, Arc::new(MemoryTrailStore::new()))
    }

    fn credentials(email: Option<&str>, password: Option<&str>) -> Option<Credentials> {
        Some(Credentials {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn verified_caller_maps_to_a_stable_local_user() {
        let gateway = gateway(Arc::new(StaticVerifier { password: "secret" }));

        let first = gateway
            .authenticate(credentials(Some(" hiker@example.com "), Some("secret")))
            .await
            .unwrap();
        let second = gateway
            .authenticate(credentials(Some("hiker@example.com"), Some("secret")))
            .await
            .unwrap();

        assert_eq!(first.email, "hiker@example.com");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_pieces_are_reported_distinctly() {
        let gateway = gateway(Arc::new(StaticVerifier { password: "secret" }));

        assert!(matches!(gateway.authenticate(None).await, Err(AuthError::MissingCredentials)));
        assert!(matches!(
            gateway.authenticate(credentials(None, None)).await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            gateway.authenticate(credentials(Some("hiker@example.com"), None)).await,
            Err(AuthError::MissingEmailOrPassword)
        ));
        assert!(matches!(
            gateway.authenticate(credentials(Some("  "), Some("secret"))).await,
            Err(AuthError::MissingEmailOrPassword)
        ));
    }

    #[tokio::test]
    async fn rejected_credentials_create_no_user() {
        let store = Arc::new(MemoryTrailStore::new());
        let gateway = IdentityGateway::new(Arc::new(StaticVerifier { password: "secret" }), store.clone());

        let result = gateway
            .authenticate(credentials(Some("hiker@example.com"), Some("wrong")))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        // The next id handed out is still the first one
        let user = store.find_or_create_user("someone@example.com").await.unwrap();
        assert_eq!(user.user_id, 1);
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let gateway = gateway(Arc::new(Unreachable));
        let result = gateway
            .authenticate(credentials(Some("hiker@example.com"), Some("secret")))
            .await;
        assert!(matches!(result, Err(AuthError::Upstream(_))));
    }
}
