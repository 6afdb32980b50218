//! Authenticated JSON transport shared by both Hetzner API variants
//!
//! One method call is one HTTP request: no retry, no redirect following.
//! HTTP error statuses are logged and the decoded body is still handed back,
//! so the adapters' "does the answer carry the expected field" check is the
//! single source of truth for success.

use ddns_core::{Error, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Connect timeout for API requests
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total timeout for API requests
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the API token is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Auth-API-Token: <token>` (Hetzner DNS Console)
    ApiToken,
    /// `Authorization: Bearer <token>` (Hetzner Cloud)
    Bearer,
}

/// A decoded API answer
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed JSON body; `Value::Null` if the body was empty or not JSON
    pub body: Value,
}

impl ApiResponse {
    /// Top-level field of the body, if present and not null
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name).filter(|v| !v.is_null())
    }

    /// Best-effort error description for logs and outcomes
    pub fn error_message(&self) -> String {
        let message = self
            .body
            .pointer("/error/message")
            .or_else(|| self.body.get("message"))
            .and_then(Value::as_str);

        match message {
            Some(message) => format!("HTTP {}: {}", self.status.as_u16(), message),
            None => format!("HTTP {}", self.status.as_u16()),
        }
    }
}

/// HTTP client for one Hetzner API base URL and token
///
/// The Debug implementation never prints the token.
#[derive(Clone)]
pub struct HetznerClient {
    http: reqwest::Client,
    base_url: String,
    /// ⚠️ NEVER log this value
    api_token: String,
    auth: AuthScheme,
}

impl std::fmt::Debug for HetznerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HetznerClient")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("auth", &self.auth)
            .finish()
    }
}

impl HetznerClient {
    /// Create a client
    ///
    /// Fails if the token is empty or the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        auth: AuthScheme,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::invalid_input("API token cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `endpoint` with query parameters
    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<ApiResponse> {
        self.call(Method::GET, endpoint, query, None).await
    }

    /// POST a JSON body to `endpoint`
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<ApiResponse> {
        self.call(Method::POST, endpoint, &[], Some(body)).await
    }

    /// PUT a JSON body to `endpoint`
    pub async fn put(&self, endpoint: &str, body: &Value) -> Result<ApiResponse> {
        self.call(Method::PUT, endpoint, &[], Some(body)).await
    }

    /// Issue one request and decode the answer
    ///
    /// # Returns
    ///
    /// - `Ok(ApiResponse)`: the server answered, whatever the status
    /// - `Err(Error::Http)`: timeout, connection failure or unreadable body
    pub async fn call(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        tracing::debug!(method = %method, url = %url, "API request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("Content-Type", "application/json");
        request = match self.auth {
            AuthScheme::ApiToken => request.header("Auth-API-Token", &self.api_token),
            AuthScheme::Bearer => request.bearer_auth(&self.api_token),
        };
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            tracing::debug!("JSON {} data: {}", method, body);
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} {} failed: {}", method, endpoint, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        if status.is_client_error() || status.is_server_error() {
            tracing::warn!("HTTP Error {} on {} {}: {}", status.as_u16(), method, endpoint, text);
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::debug!("Response body is not JSON: {}", e);
                Value::Null
            })
        };

        Ok(ApiResponse { status, body })
    }
}

/// Identifier as a string, whether the API sends it as string or number
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
