//! Shared helpers for integration tests

use std::sync::Arc;

use tallyboard::api::{serve, AppState};
use tallyboard::config::{Config, SigningKey};
use tallyboard::store::MemoryStore;
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Config with a single signing key and the cheapest bcrypt cost
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.auth.active_key = "test".to_string();
    config.auth.keys = vec![SigningKey {
        kid: "test".to_string(),
        secret: TEST_SECRET.to_string(),
    }];
    config
}

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start the API on an ephemeral port backed by a fresh in-memory store
    pub async fn start(config: Config) -> Self {
        let state = Arc::new(
            AppState::new(config, Arc::new(MemoryStore::new())).expect("Failed to build state"),
        );
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let handle = tokio::spawn(async move {
            let _ = serve(listener, state).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sign up and return the issued token
    pub async fn signup(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.url("/signup"))
            .json(&serde_json::json!({
                "email": email,
                "firstName": "Test",
                "lastName": "User",
                "password": password,
            }))
            .send()
            .await
            .expect("Signup request failed");

        assert!(response.status().is_success(), "signup returned {}", response.status());
        let body: serde_json::Value = response.json().await.expect("Invalid signup body");
        body["token"].as_str().expect("No token in signup").to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
