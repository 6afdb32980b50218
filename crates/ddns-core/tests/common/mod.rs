//! Test doubles and common utilities for reconciliation contract tests
//!
//! This module provides an in-memory provider model that records every call
//! and can be told to fail specific operations.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::target::AddressFamily;
use ddns_core::traits::{Lookup, ProviderModel, RecordListing, RecordSet, Zone};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// TTL the mock writes, mirroring the legacy model
pub const MOCK_TTL: u32 = 60;

/// One call observed by the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    VerifyCredentials,
    FindZones(String),
    FindRecords {
        zone_id: String,
        domain: String,
        families: Vec<AddressFamily>,
    },
    Create {
        zone_id: String,
        domain: String,
        value: String,
    },
    Update {
        record_id: String,
        value: String,
    },
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(self, Call::Create { .. } | Call::Update { .. })
    }
}

#[derive(Default)]
struct MockState {
    zones: Vec<Zone>,
    records: Vec<RecordSet>,
    calls: Vec<Call>,
    next_id: usize,
    reject_credentials: bool,
    failing_zone_lookups: HashSet<String>,
    failing_listings: HashSet<String>,
    failing_lookups: HashSet<AddressFamily>,
    failing_updates: HashSet<AddressFamily>,
    failing_creates: HashSet<AddressFamily>,
}

/// An in-memory ProviderModel that tracks calls
///
/// Clones share state, so a test can keep one handle while the runner owns
/// another.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone named `name`; its id is `zone-<name>`
    pub fn with_zone(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = format!("zone-{}", name);
            state.zones.push(Zone {
                id,
                name: name.to_string(),
            });
        }
        self
    }

    /// Add an existing record in the zone named `zone`
    pub fn with_record(self, zone: &str, domain: &str, value: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let ip: IpAddr = value.parse().expect("test record value is an address");
            state.next_id += 1;
            let id = format!("rec-{}", state.next_id);
            state.records.push(RecordSet {
                id,
                zone_id: format!("zone-{}", zone),
                name: domain.to_string(),
                family: AddressFamily::of(&ip),
                value: Some(value.to_string()),
                ttl: Some(3600),
            });
        }
        self
    }

    pub fn rejecting_credentials(self) -> Self {
        self.state.lock().unwrap().reject_credentials = true;
        self
    }

    pub fn failing_zone_lookup(self, zone_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_zone_lookups
            .insert(zone_name.to_string());
        self
    }

    pub fn failing_listing(self, zone_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_listings
            .insert(format!("zone-{}", zone_name));
        self
    }

    pub fn failing_lookup(self, family: AddressFamily) -> Self {
        self.state.lock().unwrap().failing_lookups.insert(family);
        self
    }

    pub fn failing_update(self, family: AddressFamily) -> Self {
        self.state.lock().unwrap().failing_updates.insert(family);
        self
    }

    pub fn failing_create(self, family: AddressFamily) -> Self {
        self.state.lock().unwrap().failing_creates.insert(family);
        self
    }

    /// All calls in the order they were made
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of create/update calls
    pub fn write_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_write()).count()
    }

    /// Current records of `domain` and `family`
    pub fn records_for(&self, domain: &str, family: AddressFamily) -> Vec<RecordSet> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| r.name == domain && r.family == family)
            .cloned()
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait::async_trait]
impl ProviderModel for MockProvider {
    async fn verify_credentials(&self) -> Result<()> {
        self.record(Call::VerifyCredentials);
        if self.state.lock().unwrap().reject_credentials {
            return Err(Error::auth("token rejected"));
        }
        Ok(())
    }

    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>> {
        self.record(Call::FindZones(name.to_string()));
        let state = self.state.lock().unwrap();
        if state.failing_zone_lookups.contains(name) {
            return Err(Error::http("zone lookup timed out"));
        }
        Ok(state.zones.iter().filter(|z| z.name == name).cloned().collect())
    }

    async fn find_records(
        &self,
        zone: &Zone,
        domain: &str,
        families: &[AddressFamily],
    ) -> Result<RecordListing> {
        self.record(Call::FindRecords {
            zone_id: zone.id.clone(),
            domain: domain.to_string(),
            families: families.to_vec(),
        });
        let state = self.state.lock().unwrap();
        if state.failing_listings.contains(&zone.id) {
            return Err(Error::provider("mock", "records field missing"));
        }

        let mut listing = RecordListing::new();
        for family in families {
            if state.failing_lookups.contains(family) {
                listing.insert(*family, Lookup::Failed("lookup failed".to_string()));
                continue;
            }
            let records = state
                .records
                .iter()
                .filter(|r| r.zone_id == zone.id && r.name == domain && r.family == *family)
                .cloned()
                .collect();
            listing.insert(*family, Lookup::Found(records));
        }
        Ok(listing)
    }

    async fn create_record(&self, zone: &Zone, domain: &str, address: IpAddr) -> Result<RecordSet> {
        self.record(Call::Create {
            zone_id: zone.id.clone(),
            domain: domain.to_string(),
            value: address.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        let family = AddressFamily::of(&address);
        if state.failing_creates.contains(&family) {
            return Err(Error::provider("mock", "record field missing"));
        }
        state.next_id += 1;
        let record = RecordSet {
            id: format!("rec-{}", state.next_id),
            zone_id: zone.id.clone(),
            name: domain.to_string(),
            family,
            value: Some(address.to_string()),
            ttl: Some(MOCK_TTL),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        _zone: &Zone,
        existing: &RecordSet,
        address: IpAddr,
    ) -> Result<RecordSet> {
        self.record(Call::Update {
            record_id: existing.id.clone(),
            value: address.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if state.failing_updates.contains(&existing.family) {
            return Err(Error::provider("mock", "record field missing"));
        }
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == existing.id)
            .ok_or_else(|| Error::not_found(existing.id.clone()))?;
        record.value = Some(address.to_string());
        record.ttl = Some(MOCK_TTL);
        Ok(record.clone())
    }

    fn record_ttl(&self) -> u32 {
        MOCK_TTL
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Targets with only an IPv4 address
pub fn v4(addr: &str) -> ddns_core::AddressTargets {
    ddns_core::AddressTargets::new(Some(addr.parse().unwrap()), None)
}

/// Targets with both families
pub fn dual(v4: &str, v6: &str) -> ddns_core::AddressTargets {
    ddns_core::AddressTargets::new(Some(v4.parse().unwrap()), Some(v6.parse().unwrap()))
}

/// A runner over `provider` with default policies
pub fn runner(provider: &MockProvider) -> ddns_core::BatchRunner {
    ddns_core::BatchRunner::with_policy(Box::new(provider.clone()), Default::default())
}

/// A runner over `provider` with custom policies
pub fn runner_with(
    provider: &MockProvider,
    policy: ddns_core::ReconcileConfig,
) -> ddns_core::BatchRunner {
    ddns_core::BatchRunner::with_policy(Box::new(provider.clone()), policy)
}

/// A request over the given domains
pub fn request(domains: &[&str], targets: ddns_core::AddressTargets) -> ddns_core::UpdateRequest {
    ddns_core::UpdateRequest::new(domains.iter().map(|d| d.to_string()).collect(), targets)
}
