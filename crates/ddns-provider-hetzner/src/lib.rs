// # Hetzner DNS Providers
//
// Provider models for the two Hetzner DNS APIs:
//
// - `hetzner-dns`: DNS Console API, flat list of records per zone
//   (`HetznerDnsProvider`, TTL 60)
// - `hetzner-cloud`: Cloud API, record-sets addressed by name and type
//   (`HetznerCloudProvider`, TTL 3600)
//
// ## Constraints
//
// - One HTTP request per provider call, no retry, no redirect following
// - Connect timeout 10s, total timeout 30s
// - API token NEVER appears in logs or Debug output
// - Decisions (skip/update/create) belong to `ddns-core`; this crate only
//   speaks the wire formats

pub mod client;
pub mod cloud;
pub mod dns;

pub use client::{ApiResponse, AuthScheme, HetznerClient};
pub use cloud::HetznerCloudProvider;
pub use dns::HetznerDnsProvider;

use ddns_core::config::ProviderConfig;
use ddns_core::traits::{ProviderModel, ProviderModelFactory};
use ddns_core::{Error, Result};

/// Name of `domain` relative to `zone_name`; "@" for the apex
///
/// Falls back to the labels before the two-label suffix when `domain` is not
/// inside `zone_name`.
pub fn zone_relative_name(domain: &str, zone_name: &str) -> String {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    let zone_name = zone_name.trim().trim_end_matches('.').to_ascii_lowercase();

    let relative = if domain == zone_name {
        String::new()
    } else if let Some(prefix) = domain.strip_suffix(&format!(".{}", zone_name)) {
        prefix.to_string()
    } else {
        ddns_core::zone::relative_name(&domain)
    };

    if relative.is_empty() {
        "@".to_string()
    } else {
        relative
    }
}

/// Factory for the DNS Console provider
pub struct HetznerDnsFactory;

impl ProviderModelFactory for HetznerDnsFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ProviderModel>> {
        match config {
            ProviderConfig::HetznerDns { api_token, base_url } => {
                if api_token.trim().is_empty() {
                    return Err(Error::invalid_input("Hetzner DNS API token is required"));
                }
                let provider = match base_url {
                    Some(url) => HetznerDnsProvider::with_base_url(url.clone(), api_token.clone())?,
                    None => HetznerDnsProvider::new(api_token.clone())?,
                };
                Ok(Box::new(provider))
            }
            _ => Err(Error::config("Invalid config for Hetzner DNS provider")),
        }
    }
}

/// Factory for the Cloud record-set provider
pub struct HetznerCloudFactory;

impl ProviderModelFactory for HetznerCloudFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ProviderModel>> {
        match config {
            ProviderConfig::HetznerCloud { api_token, base_url } => {
                if api_token.trim().is_empty() {
                    return Err(Error::invalid_input("Hetzner Cloud API token is required"));
                }
                let provider = match base_url {
                    Some(url) => HetznerCloudProvider::with_base_url(url.clone(), api_token.clone())?,
                    None => HetznerCloudProvider::new(api_token.clone())?,
                };
                Ok(Box::new(provider))
            }
            _ => Err(Error::config("Invalid config for Hetzner Cloud provider")),
        }
    }
}

/// Register both Hetzner providers with a registry
///
/// # Example
///
/// ```rust
/// use ddns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// ddns_provider_hetzner::register(&registry);
/// assert!(registry.has_provider("hetzner-dns"));
/// ```
pub fn register(registry: &ddns_core::ProviderRegistry) {
    registry.register_provider("hetzner-dns", Box::new(HetznerDnsFactory));
    registry.register_provider("hetzner-cloud", Box::new(HetznerCloudFactory));
}
