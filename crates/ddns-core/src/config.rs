//! Configuration types for the DDNS bridge
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Reconciliation policies
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl BridgeConfig {
    /// Create a new configuration with default policies
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            reconcile: ReconcileConfig::default(),
        }
    }

    /// Replace the reconciliation policies
    pub fn with_reconcile(mut self, reconcile: ReconcileConfig) -> Self {
        self.reconcile = reconcile;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()
    }
}

/// DNS provider configuration
///
/// The Debug implementation never prints the API token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProviderConfig {
    /// Legacy Hetzner DNS Console API (flat record list)
    HetznerDns {
        /// Token sent as `Auth-API-Token`
        api_token: String,
        /// API base URL override (mainly for tests)
        #[serde(default)]
        base_url: Option<String>,
    },

    /// Hetzner Cloud API (record-sets addressed by name and type)
    HetznerCloud {
        /// Token sent as `Authorization: Bearer`
        api_token: String,
        /// API base URL override (mainly for tests)
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl ProviderConfig {
    /// Build a provider configuration from its type name
    pub fn from_type_name(
        type_name: &str,
        api_token: impl Into<String>,
        base_url: Option<String>,
    ) -> Result<Self, crate::Error> {
        let api_token = api_token.into();
        match type_name {
            "hetzner-dns" => Ok(ProviderConfig::HetznerDns { api_token, base_url }),
            "hetzner-cloud" => Ok(ProviderConfig::HetznerCloud { api_token, base_url }),
            other => Err(crate::Error::config(format!(
                "Unknown provider type '{}'. Supported providers: hetzner-dns, hetzner-cloud",
                other
            ))),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token().trim().is_empty() {
            return Err(crate::Error::invalid_input(format!(
                "{} API token cannot be empty",
                self.type_name()
            )));
        }
        if let Some(url) = self.base_url()
            && url.trim().is_empty()
        {
            return Err(crate::Error::config("Provider base URL cannot be empty"));
        }
        Ok(())
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderConfig::HetznerDns { .. } => "hetzner-dns",
            ProviderConfig::HetznerCloud { .. } => "hetzner-cloud",
        }
    }

    /// The API token
    pub fn api_token(&self) -> &str {
        match self {
            ProviderConfig::HetznerDns { api_token, .. }
            | ProviderConfig::HetznerCloud { api_token, .. } => api_token,
        }
    }

    /// The base URL override, if any
    pub fn base_url(&self) -> Option<&str> {
        match self {
            ProviderConfig::HetznerDns { base_url, .. }
            | ProviderConfig::HetznerCloud { base_url, .. } => base_url.as_deref(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("type", &self.type_name())
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url())
            .finish()
    }
}

/// Shorten a secret for log output: first 8 and last 4 characters
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Reconciliation policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// What to do with an existing record whose value differs
    #[serde(default)]
    pub existing_record_policy: ExistingRecordPolicy,

    /// What to do when several records match one (domain, family)
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

/// Handling of an existing record with a different value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExistingRecordPolicy {
    /// Update the record in place, keeping its identifier
    #[default]
    Upsert,
    /// Only ever create; an existing record is left untouched
    CreateOnly,
}

impl std::str::FromStr for ExistingRecordPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upsert" => Ok(ExistingRecordPolicy::Upsert),
            "create-only" | "create_only" => Ok(ExistingRecordPolicy::CreateOnly),
            other => Err(crate::Error::config(format!(
                "Unknown existing record policy '{}'. Valid: upsert, create-only",
                other
            ))),
        }
    }
}

/// Handling of several records matching the same (domain, family)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Act on the first match in provider order
    #[default]
    FirstMatch,
    /// Report the family as failed and write nothing
    Reject,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-match" | "first_match" => Ok(DuplicatePolicy::FirstMatch),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(crate::Error::config(format!(
                "Unknown duplicate policy '{}'. Valid: first-match, reject",
                other
            ))),
        }
    }
}
