use async_trait::async_trait;

use super::{AuthError, TokenVerifier};

/// Offline verifier: any non-empty token authenticates as one fixed subject.
#[derive(Debug, Clone)]
pub struct StubVerifier {
    subject: String,
}

impl StubVerifier {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty token".to_string()));
        }
        Ok(self.subject.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
