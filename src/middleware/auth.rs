use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::CredentialsEnvelope;

/// Caller verified by the identity gateway, injected into request extensions
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Credential-forwarding authentication for mutating routes.
///
/// Buffers the JSON body, authenticates the embedded `Credentials` against the
/// identity service and hands the untouched body on to the handler together
/// with the resolved [`AuthUser`].
pub async fn require_credentials(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, state.config.api.max_request_size_bytes)
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read request body: {}", e)))?;

    let envelope: CredentialsEnvelope = if bytes.is_empty() {
        CredentialsEnvelope::default()
    } else {
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::invalid_json(format!("Request body is not valid JSON: {}", e)))?
    };

    let user = state.identity.authenticate(envelope.credentials()).await?;

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(AuthUser(user));

    Ok(next.run(request).await)
}
