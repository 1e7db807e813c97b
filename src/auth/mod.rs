use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AuthConfig, AuthMode};

pub mod firebase;
pub mod stub;

pub use firebase::FirebaseVerifier;
pub use stub::StubVerifier;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header missing")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Turns a bearer credential into the identity provider's subject id.
///
/// One verifier is built at startup and shared through `AppState`; handlers
/// never construct their own.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingHeader)?;
    let token = value.strip_prefix("Bearer ").ok_or(AuthError::MalformedHeader)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

pub fn build_verifier(config: &AuthConfig) -> Arc<dyn TokenVerifier> {
    match &config.mode {
        AuthMode::Firebase { project_id } => {
            tracing::info!(project_id = %project_id, "using Firebase token verification");
            Arc::new(FirebaseVerifier::new(project_id.clone()))
        }
        AuthMode::Stub { subject } => {
            tracing::warn!(subject = %subject, "TESTING enabled: bearer tokens are not verified");
            Arc::new(StubVerifier::new(subject.clone()))
        }
    }
}
