// # Provider Model Trait
//
// Defines the interface the reconciliation engine uses to read and write
// address records at a DNS provider.
//
// ## Implementations
//
// - Hetzner DNS (flat record list): `ddns-provider-hetzner::HetznerDnsProvider`
// - Hetzner Cloud (record-sets): `ddns-provider-hetzner::HetznerCloudProvider`
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::ProviderModel;
// use ddns_core::target::AddressFamily;
//
// let zones = provider.find_zones("example.com").await?;
// let listing = provider
//     .find_records(&zones[0], "home.example.com", &[AddressFamily::V4])
//     .await?;
// ```

use crate::target::AddressFamily;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A DNS zone as the provider knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Opaque provider identifier
    pub id: String,
    /// Zone name, e.g. "example.com"
    pub name: String,
}

/// An address record (legacy model) or record-set (cloud model)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Opaque provider identifier
    pub id: String,
    /// Owning zone
    pub zone_id: String,
    /// Record name as the provider reports it (FQDN or zone-relative)
    pub name: String,
    /// Address family
    pub family: AddressFamily,
    /// Current address literal; the first value of a record-set
    pub value: Option<String>,
    /// Time-to-live in seconds
    pub ttl: Option<u32>,
}

impl RecordSet {
    /// Whether the current value already equals `address`
    ///
    /// Values are compared as IP addresses so that different spellings of the
    /// same IPv6 address match; unparseable values fall back to a string
    /// comparison.
    pub fn has_value(&self, address: &IpAddr) -> bool {
        match self.value.as_deref() {
            Some(value) => match value.trim().parse::<IpAddr>() {
                Ok(current) => current == *address,
                Err(_) => value == address.to_string(),
            },
            None => false,
        }
    }
}

/// Result of looking up the records of one family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Records matching (domain, family), in provider order; may be empty
    Found(Vec<RecordSet>),
    /// The lookup itself failed
    Failed(String),
}

/// Per-family lookup results for one domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordListing {
    entries: Vec<(AddressFamily, Lookup)>,
}

impl RecordListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the lookup result of a family
    pub fn insert(&mut self, family: AddressFamily, lookup: Lookup) {
        self.entries.retain(|(f, _)| *f != family);
        self.entries.push((family, lookup));
    }

    /// Builder-style [`RecordListing::insert`]
    pub fn with(mut self, family: AddressFamily, lookup: Lookup) -> Self {
        self.insert(family, lookup);
        self
    }

    /// Lookup result of a family; `None` if the family was never looked up
    pub fn get(&self, family: AddressFamily) -> Option<&Lookup> {
        self.entries
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, lookup)| lookup)
    }
}

/// Trait for DNS provider models
///
/// The engine decides *whether* to write; implementations only translate
/// each call into the provider's wire format and decode the answer once into
/// a typed result.
///
/// # Constraints
///
/// - One logical request per method call (the legacy record listing is one
///   GET for all families; the cloud listing is one GET per family)
/// - No retry, no backoff, no caching between calls
/// - A write succeeds only if the provider returned the record payload;
///   anything else is an `Err`
#[async_trait]
pub trait ProviderModel: Send + Sync {
    /// Check that the credential is accepted
    ///
    /// Called once per run before any domain is processed. Failure must be
    /// reported as [`crate::Error::Authentication`].
    async fn verify_credentials(&self) -> Result<(), crate::Error>;

    /// List zones whose name equals `name`, in provider order
    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>, crate::Error>;

    /// Look up the records of `domain` for each of `families`
    ///
    /// An `Err` means the whole listing failed and nothing is known about the
    /// domain; per-family failures are reported as [`Lookup::Failed`].
    async fn find_records(
        &self,
        zone: &Zone,
        domain: &str,
        families: &[AddressFamily],
    ) -> Result<RecordListing, crate::Error>;

    /// Create a record of `address`'s family with the model's fixed TTL
    async fn create_record(
        &self,
        zone: &Zone,
        domain: &str,
        address: IpAddr,
    ) -> Result<RecordSet, crate::Error>;

    /// Replace the value of `existing`, keeping its identifier
    async fn update_record(
        &self,
        zone: &Zone,
        existing: &RecordSet,
        address: IpAddr,
    ) -> Result<RecordSet, crate::Error>;

    /// TTL written on every create/update
    fn record_ttl(&self) -> u32;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing provider models from configuration
pub trait ProviderModelFactory: Send + Sync {
    /// Create a ProviderModel instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn ProviderModel>, crate::Error>;
}
