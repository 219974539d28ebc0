#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use trail_service::auth::{AuthError, CredentialVerifier};
use trail_service::config::AppConfig;
use trail_service::database::MemoryTrailStore;
use trail_service::{app, AppState};

pub const PASSWORD: &str = "secret";
pub const OWNER: &str = "owner@example.com";
pub const OTHER: &str = "other@example.com";

/// Accepts any email as long as the password matches
struct AllowPassword(&'static str);

#[async_trait]
impl CredentialVerifier for AllowPassword {
    async fn verify(&self, _email: &str, password: &str) -> Result<bool, AuthError> {
        Ok(password == self.0)
    }
}

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Fresh in-process server backed by an empty in-memory store
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(
            AppConfig::development(),
            Arc::new(MemoryTrailStore::new()),
            Arc::new(AllowPassword(PASSWORD)),
        );

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create(&self, email: &str, trail: Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/api/trails"))
            .json(&with_credentials(email, PASSWORD, trail))
            .send()
            .await?)
    }

    pub async fn get_json(&self, path: &str) -> Result<(reqwest::StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        let status = res.status();
        Ok((status, res.json::<Value>().await?))
    }
}

pub fn with_credentials(email: &str, password: &str, trail: Value) -> Value {
    json!({
        "Credentials": { "Email": email, "Password": password },
        "Trail": trail
    })
}

pub fn sample_trail(name: &str) -> Value {
    json!({
        "Name": name,
        "Difficulty": "Moderate",
        "Rating": 4.5,
        "Length": 12.3,
        "ElevationGain": 320,
        "RouteType": "Loop",
        "CompletionTime": 180,
        "Description": "Coastal path with a steep climb at the end",
        "Location": { "City": "Plymouth", "County": "Devon", "Country": "England" },
        "Points": [
            { "Latitude": 50.3755, "Longitude": -4.1427, "Description": "Start at the Hoe" },
            { "Latitude": 50.3621, "Longitude": -4.1580 }
        ],
        "Tags": ["coastal", "dog-friendly"]
    })
}
