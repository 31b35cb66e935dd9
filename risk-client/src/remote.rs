//! Risk-intelligence service transport

use crate::{ClientConfig, Result, RemoteError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Transaction assessment
pub const ASSESS_PATH: &str = "/v1/assess";
/// Merchant lookup (`id` or `name` query)
pub const MERCHANTS_PATH: &str = "/v1/merchants";
/// Agent screening
pub const AGENT_SCREEN_PATH: &str = "/v1/agents/screen";
/// Scenario simulation (disputes, compliance)
pub const SIMULATE_PATH: &str = "/v1/simulate";
/// Unified decision (cross-rail)
pub const DECISION_PATH: &str = "/v1/decision";

/// Remote risk-intelligence service
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// POST a JSON body and return the decoded JSON response
    async fn post(&self, path: &str, body: &Value) -> std::result::Result<Value, RemoteError>;

    /// GET a path with query parameters and return the decoded JSON response
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<Value, RemoteError>;
}

/// HTTP implementation over reqwest
pub struct HttpRiskService {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpRiskService {
    /// Build the HTTP client with the configured timeout
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Value, RemoteError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Transport(e.to_string())
    }
}

#[async_trait]
impl RemoteService for HttpRiskService {
    async fn post(&self, path: &str, body: &Value) -> std::result::Result<Value, RemoteError> {
        let url = self.url(path);
        debug!("POST {}", url);
        self.send(self.authorized(self.client.post(&url).json(body)))
            .await
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<Value, RemoteError> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.send(self.authorized(self.client.get(&url).query(query)))
            .await
    }
}
