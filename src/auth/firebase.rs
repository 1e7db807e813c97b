use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{AuthError, TokenVerifier};

/// Google's published signing keys for Firebase ID tokens.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Signing keys rotate every few hours; refetch well inside that window.
const KEY_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Floor between fetches triggered by unknown key ids.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

fn unknown_key(kid: &str) -> AuthError {
    AuthError::InvalidToken(format!("unknown signing key '{}'", kid))
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
}

struct SigningKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Verifies Firebase Authentication ID tokens (RS256 JWTs).
///
/// Only the provider's public keys are held between requests; every token is
/// decoded and validated again on every call.
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    client: reqwest::Client,
    signing_keys: RwLock<Option<SigningKeys>>,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_jwks_url(project_id, FIREBASE_JWKS_URL)
    }

    pub fn with_jwks_url(project_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: jwks_url.into(),
            client: reqwest::Client::new(),
            signing_keys: RwLock::new(None),
        }
    }

    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation
    }

    /// Look up a key by id, refreshing the key set when it is stale or the
    /// id is unknown (a rotation may have happened since the last fetch).
    /// An unknown id triggers at most one refetch per `MIN_REFETCH_INTERVAL`.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cached = self.signing_keys.read().await;
            if let Some(keys) = cached.as_ref() {
                let age = keys.fetched_at.elapsed();
                if age < KEY_REFRESH_INTERVAL {
                    if let Some(key) = keys.keys.get(kid) {
                        return Ok(key.clone());
                    }
                    if age < MIN_REFETCH_INTERVAL {
                        return Err(unknown_key(kid));
                    }
                }
            }
        }

        // Held across the fetch so concurrent misses share one request.
        let mut cached = self.signing_keys.write().await;
        if let Some(keys) = cached.as_ref() {
            if keys.fetched_at.elapsed() < MIN_REFETCH_INTERVAL {
                return keys.keys.get(kid).cloned().ok_or_else(|| unknown_key(kid));
            }
        }

        let fresh = self.fetch_keys().await?;
        let key = fresh.keys.get(kid).cloned();
        *cached = Some(fresh);

        key.ok_or_else(|| unknown_key(kid))
    }

    async fn fetch_keys(&self) -> Result<SigningKeys, AuthError> {
        let jwks: JwkSet = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::Provider(format!("failed to fetch signing keys: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("malformed signing key set: {}", e)))?;

        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => tracing::warn!(kid = %kid, error = %e, "skipping unusable signing key"),
            }
        }

        tracing::debug!(count = keys.len(), "refreshed Firebase signing keys");
        Ok(SigningKeys {
            keys,
            fetched_at: Instant::now(),
        })
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        // Reject before any network call.
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token header has no key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;
        let data = decode::<FirebaseClaims>(token, &key, &self.validation())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("token has an empty subject".to_string()));
        }
        Ok(data.claims.sub)
    }

    fn name(&self) -> &'static str {
        "firebase"
    }
}
