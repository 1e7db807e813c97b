#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use petcare_api::auth::{AuthError, TokenVerifier};
use petcare_api::config::{AppConfig, AuthConfig, AuthMode};
use petcare_api::database::MemoryStore;
use petcare_api::AppState;

/// Maps opaque test tokens to subjects, standing in for the identity provider.
#[derive(Default)]
pub struct TokenTable {
    tokens: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl TokenVerifier for TokenTable {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown test token".to_string()))
    }

    fn name(&self) -> &'static str {
        "token-table"
    }
}

pub struct TestUser {
    pub subject: String,
    pub token: String,
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    tokens: Arc<TokenTable>,
    client: Client,
}

impl TestServer {
    /// Start the router in-process on a free port, backed by a fresh store.
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenTable::default());
        let config = AppConfig::development(AuthConfig {
            mode: AuthMode::Stub {
                subject: "unused".to_string(),
            },
        });
        let state = AppState::new(store.clone(), tokens.clone(), config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, petcare_api::app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            tokens,
            client: Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a token for a subject without provisioning a user row.
    pub async fn token_for(&self, subject: &str) -> String {
        let token = format!("token-{}", uuid::Uuid::new_v4());
        self.tokens
            .tokens
            .write()
            .await
            .insert(token.clone(), subject.to_string());
        token
    }

    /// Provision a user row and hand back a working bearer token for it.
    pub async fn user(&self) -> TestUser {
        let subject = uuid::Uuid::new_v4().to_string();
        self.store.insert_user(&subject).await;
        let token = self.token_for(&subject).await;
        TestUser { subject, token }
    }

    /// A user that already has a care setting; returns the setting id.
    pub async fn user_with_setting(&self) -> Result<(TestUser, i64)> {
        let user = self.user().await;
        let resp = self
            .post(&user, "/api/care_settings", &care_setting_body("2025-07-01"))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "setup failed: {}", resp.status());
        let body: Value = resp.json().await?;
        let id = body["id"].as_i64().context("care setting id")?;
        Ok((user, id))
    }

    pub fn get(&self, user: &TestUser, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&user.token)
    }

    pub fn post(&self, user: &TestUser, path: &str, body: &Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(&user.token).json(body)
    }

    pub fn patch(&self, user: &TestUser, path: &str, body: &Value) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(&user.token).json(body)
    }

    pub fn anonymous(&self) -> &Client {
        &self.client
    }
}

pub fn care_setting_body(start: &str) -> Value {
    json!({
        "parent_name": "Mom",
        "child_name": "Ken",
        "dog_name": "Pochi",
        "care_start_date": start,
        "care_end_date": "2025-07-14",
        "morning_meal_time": "08:00",
        "night_meal_time": "19:00",
        "walk_time": "18:00",
        "care_password": "1234",
        "care_clear_status": false
    })
}
