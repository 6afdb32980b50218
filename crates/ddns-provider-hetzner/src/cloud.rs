// # Hetzner Cloud DNS provider (record-sets)
//
// Records are grouped in RRSets addressed by zone, relative name and type,
// so one family is always one lookup.
//
// ## API Reference
//
// - Base URL: https://api.hetzner.cloud/v1
// - Authentication: `Authorization: Bearer <token>`
// - List Zones: GET `/zones?name=...`
// - Get RRSet: GET `/zones/:zone/rrsets/:name/:type`
// - Create RRSet: POST `/zones/:zone/rrsets`
// - Replace values: POST `/zones/:zone/rrsets/:name/:type/actions/set_records`
// - Change TTL: POST `/zones/:zone/rrsets/:name/:type/actions/change_ttl`

use crate::client::{ApiResponse, AuthScheme, HetznerClient, id_string};
use crate::zone_relative_name;
use async_trait::async_trait;
use ddns_core::target::AddressFamily;
use ddns_core::traits::{Lookup, ProviderModel, RecordListing, RecordSet, Zone};
use ddns_core::{Error, Result};
use serde_json::{Value, json};
use std::net::IpAddr;

/// Hetzner Cloud API base URL
pub const HETZNER_CLOUD_API_BASE: &str = "https://api.hetzner.cloud/v1";

/// TTL written on every record-set this provider touches
pub const HETZNER_CLOUD_TTL: u32 = 3600;

/// Comment attached to every value this provider writes
pub const RECORD_COMMENT: &str = "Auto-set by ddns-bridged";

const PROVIDER_NAME: &str = "hetzner-cloud";

/// Hetzner Cloud record-set provider
#[derive(Debug, Clone)]
pub struct HetznerCloudProvider {
    client: HetznerClient,
}

impl HetznerCloudProvider {
    /// Create a provider against the public API
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(HETZNER_CLOUD_API_BASE, api_token)
    }

    /// Create a provider against another base URL (mock servers, proxies)
    pub fn with_base_url(base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HetznerClient::new(base_url, api_token, AuthScheme::Bearer)?,
        })
    }

    fn failure(response: &ApiResponse, what: &str) -> Error {
        Error::provider(PROVIDER_NAME, format!("{}: {}", what, response.error_message()))
    }

    fn rrset_endpoint(zone: &Zone, name: &str, family: AddressFamily) -> String {
        format!("zones/{}/rrsets/{}/{}", zone.id, name, family.record_type())
    }

    /// Decode the `rrset` field of an answer; `None` if it carries no id
    fn decode_rrset(
        response: &ApiResponse,
        zone: &Zone,
        name: &str,
        family: AddressFamily,
    ) -> Option<RecordSet> {
        let rrset = response.field("rrset")?;
        Some(RecordSet {
            id: id_string(rrset.get("id")?)?,
            zone_id: zone.id.clone(),
            name: rrset
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(name)
                .to_string(),
            family,
            value: rrset
                .pointer("/records/0/value")
                .and_then(Value::as_str)
                .map(str::to_string),
            ttl: rrset
                .get("ttl")
                .and_then(Value::as_u64)
                .and_then(|ttl| u32::try_from(ttl).ok()),
        })
    }

    /// Look up the record-set of one family
    async fn lookup(&self, zone: &Zone, name: &str, family: AddressFamily) -> Lookup {
        let endpoint = Self::rrset_endpoint(zone, name, family);
        let response = match self.client.get(&endpoint, &[]).await {
            Ok(response) => response,
            Err(e) => return Lookup::Failed(e.to_string()),
        };

        if let Some(rrset) = Self::decode_rrset(&response, zone, name, family) {
            tracing::debug!("Found {} record-set {} for {}", family.record_type(), rrset.id, name);
            return Lookup::Found(vec![rrset]);
        }

        let status = response.status;
        if status.as_u16() == 404 || !(status.is_client_error() || status.is_server_error()) {
            Lookup::Found(Vec::new())
        } else {
            Lookup::Failed(format!("Record-set lookup failed: {}", response.error_message()))
        }
    }

    /// POST an action and require an `action` object in the answer
    async fn run_action(&self, endpoint: &str, body: &Value, what: &str) -> Result<()> {
        let response = self.client.post(endpoint, body).await?;
        if response.field("action").is_some() {
            Ok(())
        } else {
            Err(Self::failure(&response, what))
        }
    }
}

/// Record-set name for `domain`; the zone apex is "@"
fn rrset_name(domain: &str, zone: &Zone) -> String {
    zone_relative_name(domain, &zone.name)
}

#[async_trait]
impl ProviderModel for HetznerCloudProvider {
    async fn verify_credentials(&self) -> Result<()> {
        let response = self
            .client
            .get("zones", &[])
            .await
            .map_err(|e| Error::auth(format!("Hetzner Cloud authentication failed: {}", e)))?;

        if response.field("zones").is_some_and(Value::is_array) {
            tracing::debug!("Hetzner Cloud credentials accepted");
            Ok(())
        } else {
            Err(Error::auth(format!(
                "Hetzner Cloud authentication failed: {}",
                response.error_message()
            )))
        }
    }

    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>> {
        tracing::debug!("Looking up zone: {}", name);
        let response = self.client.get("zones", &[("name", name)]).await?;

        let zones = response
            .field("zones")
            .and_then(Value::as_array)
            .ok_or_else(|| Self::failure(&response, "Zone lookup failed"))?;

        Ok(zones
            .iter()
            .filter_map(|zone| {
                Some(Zone {
                    id: id_string(zone.get("id")?)?,
                    name: zone.get("name")?.as_str()?.to_string(),
                })
            })
            .collect())
    }

    async fn find_records(
        &self,
        zone: &Zone,
        domain: &str,
        families: &[AddressFamily],
    ) -> Result<RecordListing> {
        let name = rrset_name(domain, zone);
        let mut listing = RecordListing::new();
        for family in families {
            listing.insert(*family, self.lookup(zone, &name, *family).await);
        }
        Ok(listing)
    }

    /// ```http
    /// POST /zones/:zone/rrsets
    /// {"name": "home", "type": "A", "ttl": 3600, "records": [{"value": "1.2.3.4", "comment": "..."}]}
    /// ```
    async fn create_record(&self, zone: &Zone, domain: &str, address: IpAddr) -> Result<RecordSet> {
        let family = AddressFamily::of(&address);
        let name = rrset_name(domain, zone);
        tracing::info!("Creating {} record-set: {} -> {}", family.record_type(), domain, address);

        let body = json!({
            "name": name,
            "type": family.record_type(),
            "ttl": HETZNER_CLOUD_TTL,
            "records": [{"value": address.to_string(), "comment": RECORD_COMMENT}],
        });
        let endpoint = format!("zones/{}/rrsets", zone.id);
        let response = self.client.post(&endpoint, &body).await?;

        Self::decode_rrset(&response, zone, &name, family)
            .ok_or_else(|| Self::failure(&response, "Record-set creation failed"))
    }

    /// Replace the values in place, then pin the TTL if it differs
    async fn update_record(
        &self,
        zone: &Zone,
        existing: &RecordSet,
        address: IpAddr,
    ) -> Result<RecordSet> {
        tracing::info!(
            "Updating record-set {} ({}): {:?} -> {}",
            existing.id,
            existing.name,
            existing.value,
            address
        );

        let endpoint = Self::rrset_endpoint(zone, &existing.name, existing.family);
        let records = json!({
            "records": [{"value": address.to_string(), "comment": RECORD_COMMENT}],
        });
        self.run_action(
            &format!("{}/actions/set_records", endpoint),
            &records,
            "Record-set update failed",
        )
        .await?;

        if existing.ttl != Some(HETZNER_CLOUD_TTL) {
            self.run_action(
                &format!("{}/actions/change_ttl", endpoint),
                &json!({ "ttl": HETZNER_CLOUD_TTL }),
                "Record-set TTL change failed",
            )
            .await?;
        }

        Ok(RecordSet {
            value: Some(address.to_string()),
            ttl: Some(HETZNER_CLOUD_TTL),
            ..existing.clone()
        })
    }

    fn record_ttl(&self) -> u32 {
        HETZNER_CLOUD_TTL
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn zone() -> Zone {
        Zone {
            id: "4711".to_string(),
            name: "example.com".to_string(),
        }
    }

    #[test]
    fn test_rrset_name_uses_at_for_apex() {
        assert_eq!(rrset_name("example.com", &zone()), "@");
        assert_eq!(rrset_name("home.example.com", &zone()), "home");
        assert_eq!(rrset_name("a.b.example.com", &zone()), "a.b");
    }

    #[test]
    fn test_rrset_endpoint() {
        assert_eq!(
            HetznerCloudProvider::rrset_endpoint(&zone(), "home", AddressFamily::V6),
            "zones/4711/rrsets/home/AAAA"
        );
    }

    #[test]
    fn test_decode_rrset_requires_id() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: json!({"rrset": {"name": "home", "records": []}}),
        };
        assert!(HetznerCloudProvider::decode_rrset(&response, &zone(), "home", AddressFamily::V4).is_none());

        let response = ApiResponse {
            status: StatusCode::OK,
            body: json!({"rrset": {"id": "home/A", "name": "home", "ttl": 3600,
                "records": [{"value": "203.0.113.1", "comment": ""}]}}),
        };
        let rrset =
            HetznerCloudProvider::decode_rrset(&response, &zone(), "home", AddressFamily::V4).unwrap();
        assert_eq!(rrset.id, "home/A");
        assert_eq!(rrset.value.as_deref(), Some("203.0.113.1"));
        assert_eq!(rrset.ttl, Some(3600));
    }
}
