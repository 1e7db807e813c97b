use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{extract_bearer, AuthError};
use crate::error::ApiError;
use crate::state::AppState;

/// Identity-provider subject of the authenticated caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSubject(pub String);

impl AuthSubject {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Bearer authentication middleware that verifies the token and injects the caller's subject
pub async fn firebase_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
        .transpose()?;

    let token = extract_bearer(header)?;

    let subject = state.verifier.verify(token).await.map_err(|err| {
        tracing::debug!(verifier = state.verifier.name(), error = %err, "token rejected");
        err
    })?;

    request.extensions_mut().insert(AuthSubject(subject));

    Ok(next.run(request).await)
}
