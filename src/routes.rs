use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{root, trails};
use crate::middleware::require_credentials;
use crate::state::AppState;

/// Build the full router for the given state
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    let router = Router::new()
        // Public
        .route("/", get(root::root))
        .route("/health", get(root::health))
        .merge(trail_routes(state.clone()))
        .layer(TraceLayer::new_for_http());

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

/// Reads are public; writes carry `Credentials` in the body and go through
/// `require_credentials` first.
fn trail_routes(state: AppState) -> Router<AppState> {
    let credentials = from_fn_with_state(state, require_credentials);

    Router::new()
        .route(
            "/api/trails",
            get(trails::trail_list).merge(post(trails::trail_create).route_layer(credentials.clone())),
        )
        .route(
            "/api/trails/:name",
            get(trails::trail_read).merge(
                put(trails::trail_update)
                    .delete(trails::trail_delete)
                    .route_layer(credentials),
            ),
        )
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{AuthError, CredentialVerifier};
    use crate::config::AppConfig;
    use crate::database::MemoryTrailStore;

    struct RejectAll;

    #[async_trait]
    impl CredentialVerifier for RejectAll {
        async fn verify(&self, _email: &str, _password: &str) -> Result<bool, AuthError> {
            Ok(false)
        }
    }

    fn router() -> Router {
        app(AppState::new(
            AppConfig::development(),
            Arc::new(MemoryTrailStore::new()),
            Arc::new(RejectAll),
        ))
    }

    async fn status(method: Method, uri: &str, body: &'static str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn reads_are_public() {
        assert_eq!(status(Method::GET, "/api/trails", "").await, StatusCode::OK);
        assert_eq!(status(Method::GET, "/api/trails/Missing", "").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn writes_pass_through_credential_check() {
        let creds = r#"{"Credentials":{"Email":"a@example.com","Password":"x"}}"#;
        assert_eq!(status(Method::POST, "/api/trails", "{}").await, StatusCode::BAD_REQUEST);
        assert_eq!(status(Method::POST, "/api/trails", creds).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(Method::PUT, "/api/trails/Any", creds).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(Method::DELETE, "/api/trails/Any", creds).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        assert_eq!(
            status(Method::PATCH, "/api/trails/Any", "").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn cors_follows_security_config() {
        let mut security = AppConfig::development().security;
        security.enable_cors = false;
        assert!(cors_layer(&security).is_none());

        security.enable_cors = true;
        security.cors_origins = vec!["https://trails.example.com".to_string()];
        assert!(cors_layer(&security).is_some());
    }
}
