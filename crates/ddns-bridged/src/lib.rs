// # ddns-bridged
//
// Thin HTTP layer over `ddns-core`: a router calls
// `GET /update?domain=...&ipv4=...&ipv6=...&token=...` after a reconnect and
// the bridge reconciles the listed domains at the configured provider.
//
// No DNS logic lives here. Each request builds a provider from the registry,
// hands one `UpdateRequest` to a `BatchRunner` and renders the verdict.

pub mod settings;

pub use settings::Settings;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use ddns_core::{AddressTargets, BatchRunner, Error, ProviderRegistry, UpdateRequest};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Body for a missing token or domain list
pub const MISSING_PARAMETERS: &str = "API token or domain parameter missing or invalid";

/// Body for a request without any usable address
pub const NO_ADDRESS: &str =
    "Neither IPv4 nor IPv6 available. Probably the parameters are missing in the update URL.";

/// Body for a rejected credential
pub const AUTH_FAILED: &str = "Hetzner DNS authentication failed";

/// Shared state of all request handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(registry: ProviderRegistry, settings: Settings) -> Self {
        Self {
            registry: Arc::new(registry),
            settings: Arc::new(settings),
        }
    }
}

/// Query parameters of the update URL
#[derive(Debug, Default, Deserialize)]
pub struct UpdateParams {
    pub domain: Option<String>,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub token: Option<String>,
    /// Alias of `token`
    pub api_token: Option<String>,
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/update", get(update))
        .route("/health", get(health))
        .with_state(state)
}

/// Request failure rendered as a plain-text status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if !err.is_fatal() {
            error!("Update aborted: {}", err);
            return ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Result: failure");
        }
        match err {
            Error::Authentication(_) => ApiError::new(StatusCode::UNAUTHORIZED, AUTH_FAILED),
            Error::InvalidInput(message) => ApiError::new(StatusCode::BAD_REQUEST, message),
            other => ApiError::new(StatusCode::BAD_REQUEST, other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        plain_text(self.status, self.message)
    }
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// `GET /health`
async fn health() -> &'static str {
    "ok"
}

/// `GET /update`
async fn update(
    State(state): State<AppState>,
    Query(params): Query<UpdateParams>,
) -> Result<Response, ApiError> {
    let query_token =
        non_blank(params.token.as_deref()).or_else(|| non_blank(params.api_token.as_deref()));
    let token = state.settings.effective_token(query_token);
    let domains = params
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let (Some(token), Some(domains)) = (token, domains) else {
        error!("{}", MISSING_PARAMETERS);
        return Err(ApiError::new(StatusCode::BAD_REQUEST, MISSING_PARAMETERS));
    };

    let targets = AddressTargets::parse_lenient(params.ipv4.as_deref(), params.ipv6.as_deref());
    log_ignored_address("ipv4", params.ipv4.as_deref(), targets.ipv4.is_some());
    log_ignored_address("ipv6", params.ipv6.as_deref(), targets.ipv6.is_some());
    if targets.is_empty() {
        error!("{}", NO_ADDRESS);
        return Err(ApiError::new(StatusCode::BAD_REQUEST, NO_ADDRESS));
    }

    let config = state.settings.bridge_config(token)?;
    let provider = state.registry.create_provider(&config.provider)?;
    let runner = BatchRunner::new(provider, &config)?;

    let request = UpdateRequest::from_domain_list(domains, targets);
    let report = runner.run(&request).await?;

    for outcome in &report.outcomes {
        info!("{}: {}", outcome.domain, outcome.status);
        for (family, result) in &outcome.families {
            info!("{} {}: {}", outcome.domain, family, result);
        }
    }
    info!(
        "Update finished in {} ms: {}",
        report.duration().num_milliseconds(),
        report.verdict
    );

    Ok(plain_text(StatusCode::OK, format!("Result: {}", report.verdict)))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn log_ignored_address(name: &str, raw: Option<&str>, accepted: bool) {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() && !accepted => {
            warn!("Ignoring invalid {} parameter: {}", name, raw)
        }
        None | Some("") => info!("No {} parameter supplied", name),
        _ => {}
    }
}
