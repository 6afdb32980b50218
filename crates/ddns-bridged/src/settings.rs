// Daemon settings, read from environment variables only.
//
// - `DDNS_LISTEN_ADDR`: socket address to bind (default 0.0.0.0:8080)
// - `DDNS_PROVIDER_TYPE`: hetzner-dns (default) or hetzner-cloud
// - `DDNS_PROVIDER_API_TOKEN`: server-side token; wins over the query token
// - `DDNS_PROVIDER_BASE_URL`: API base URL override
// - `DDNS_EXISTING_RECORD_POLICY`: upsert (default) or create-only
// - `DDNS_DUPLICATE_POLICY`: first-match (default) or reject
// - `DDNS_LOG_LEVEL`: trace, debug, info (default), warn, error
// - `DDNS_LOG_PATH`: also append logs to this file (or `ddns-bridged.log`
//   inside it when it names a directory); stdout only when unset

use anyhow::{Context, Result};
use ddns_core::config::mask_token;
use ddns_core::{BridgeConfig, DuplicatePolicy, ExistingRecordPolicy, ProviderConfig, ReconcileConfig};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PROVIDER_TYPE: &str = "hetzner-dns";
const SUPPORTED_PROVIDERS: [&str; 2] = ["hetzner-dns", "hetzner-cloud"];
const LOG_FILE_NAME: &str = "ddns-bridged.log";

/// Daemon configuration
#[derive(Clone)]
pub struct Settings {
    pub listen_addr: SocketAddr,
    pub provider_type: String,
    /// ⚠️ NEVER log this value
    pub api_token: Option<String>,
    pub base_url: Option<String>,
    pub reconcile: ReconcileConfig,
    pub log_level: String,
    pub log_path: Option<PathBuf>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("listen_addr", &self.listen_addr)
            .field("provider_type", &self.provider_type)
            .field("api_token", &self.api_token.as_deref().map(mask_token))
            .field("base_url", &self.base_url)
            .field("reconcile", &self.reconcile)
            .field("log_level", &self.log_level)
            .field("log_path", &self.log_path)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            provider_type: DEFAULT_PROVIDER_TYPE.to_string(),
            api_token: None,
            base_url: None,
            reconcile: ReconcileConfig::default(),
            log_level: "info".to_string(),
            log_path: None,
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr: SocketAddr = var("DDNS_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("DDNS_LISTEN_ADDR must be a socket address such as 0.0.0.0:8080")?;

        let existing_record_policy: ExistingRecordPolicy = match var("DDNS_EXISTING_RECORD_POLICY") {
            Some(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("DDNS_EXISTING_RECORD_POLICY: {}", e))?,
            None => ExistingRecordPolicy::default(),
        };

        let duplicate_policy: DuplicatePolicy = match var("DDNS_DUPLICATE_POLICY") {
            Some(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("DDNS_DUPLICATE_POLICY: {}", e))?,
            None => DuplicatePolicy::default(),
        };

        Ok(Self {
            listen_addr,
            provider_type: var("DDNS_PROVIDER_TYPE")
                .unwrap_or_else(|| DEFAULT_PROVIDER_TYPE.to_string()),
            api_token: var("DDNS_PROVIDER_API_TOKEN"),
            base_url: var("DDNS_PROVIDER_BASE_URL"),
            reconcile: ReconcileConfig {
                existing_record_policy,
                duplicate_policy,
            },
            log_level: var("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_path: var("DDNS_LOG_PATH").map(PathBuf::from),
        })
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.provider_type.as_str()) {
            anyhow::bail!(
                "DDNS_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: {}",
                self.provider_type,
                SUPPORTED_PROVIDERS.join(", ")
            );
        }

        if let Some(url) = &self.base_url
            && !url.starts_with("https://")
            && !url.starts_with("http://")
        {
            anyhow::bail!(
                "DDNS_PROVIDER_BASE_URL must use HTTP or HTTPS scheme. Got: {}",
                url
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// The token to use for one request: server-side first, then the query
    pub fn effective_token<'a>(&'a self, query_token: Option<&'a str>) -> Option<&'a str> {
        let non_blank = |t: Option<&'a str>| t.map(str::trim).filter(|t| !t.is_empty());
        non_blank(self.api_token.as_deref()).or_else(|| non_blank(query_token))
    }

    /// File the log sink appends to, if one is configured
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_path.as_ref().map(|path| {
            if path.is_dir() {
                path.join(LOG_FILE_NAME)
            } else {
                path.clone()
            }
        })
    }

    /// Engine configuration for one request
    pub fn bridge_config(&self, api_token: &str) -> ddns_core::Result<BridgeConfig> {
        let provider =
            ProviderConfig::from_type_name(&self.provider_type, api_token, self.base_url.clone())?;
        Ok(BridgeConfig::new(provider).with_reconcile(self.reconcile))
    }
}
