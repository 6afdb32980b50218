// # Hetzner DNS Console provider (flat record list)
//
// ## API Reference
//
// - Base URL: https://dns.hetzner.com/api/v1
// - Authentication: `Auth-API-Token: <token>`
// - List Zones: GET `/zones`, GET `/zones?name=...`
// - List Records: GET `/records?zone_id=...`
// - Create Record: POST `/records`
// - Update Record: PUT `/records/:record_id`
//
// Success is decided by the payload, not the status: a listing must carry
// `zones` / `records`, a write must carry `record`.

use crate::client::{ApiResponse, AuthScheme, HetznerClient, id_string};
use crate::zone_relative_name;
use async_trait::async_trait;
use ddns_core::target::AddressFamily;
use ddns_core::traits::{Lookup, ProviderModel, RecordListing, RecordSet, Zone};
use ddns_core::{Error, Result};
use serde_json::{Value, json};
use std::net::IpAddr;

/// Hetzner DNS Console API base URL
pub const HETZNER_DNS_API_BASE: &str = "https://dns.hetzner.com/api/v1";

/// TTL written on every record this provider touches
pub const HETZNER_DNS_TTL: u32 = 60;

const PROVIDER_NAME: &str = "hetzner-dns";

/// Legacy Hetzner DNS provider
///
/// Stateless: every call maps to exactly one HTTP request.
#[derive(Debug, Clone)]
pub struct HetznerDnsProvider {
    client: HetznerClient,
}

impl HetznerDnsProvider {
    /// Create a provider against the public API
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(HETZNER_DNS_API_BASE, api_token)
    }

    /// Create a provider against another base URL (mock servers, proxies)
    pub fn with_base_url(base_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HetznerClient::new(base_url, api_token, AuthScheme::ApiToken)?,
        })
    }

    fn failure(response: &ApiResponse, what: &str) -> Error {
        Error::provider(PROVIDER_NAME, format!("{}: {}", what, response.error_message()))
    }

    /// Decode one record object, keeping only address records
    fn decode_record(value: &Value, fallback_zone: &str) -> Option<RecordSet> {
        let family = AddressFamily::from_record_type(value.get("type")?.as_str()?)?;
        Some(RecordSet {
            id: id_string(value.get("id")?)?,
            zone_id: value
                .get("zone_id")
                .and_then(id_string)
                .unwrap_or_else(|| fallback_zone.to_string()),
            name: value.get("name")?.as_str()?.to_string(),
            family,
            value: value.get("value").and_then(Value::as_str).map(str::to_string),
            ttl: value
                .get("ttl")
                .and_then(Value::as_u64)
                .and_then(|ttl| u32::try_from(ttl).ok()),
        })
    }

    /// Decode the `record` field of a write answer
    fn written_record(&self, response: &ApiResponse, zone: &Zone, what: &str) -> Result<RecordSet> {
        response
            .field("record")
            .and_then(|record| Self::decode_record(record, &zone.id))
            .ok_or_else(|| Self::failure(response, what))
    }
}

/// Whether a listed record name designates `domain`
///
/// The API reports names relative to the zone ("home", "@") while records
/// created with a fully qualified name may be echoed back verbatim.
fn names_domain(record_name: &str, domain: &str, zone: &Zone) -> bool {
    let record_name = record_name.trim_end_matches('.');
    record_name.eq_ignore_ascii_case(domain)
        || record_name.eq_ignore_ascii_case(&zone_relative_name(domain, &zone.name))
}

#[async_trait]
impl ProviderModel for HetznerDnsProvider {
    async fn verify_credentials(&self) -> Result<()> {
        let response = self
            .client
            .get("zones", &[])
            .await
            .map_err(|e| Error::auth(format!("Hetzner DNS authentication failed: {}", e)))?;

        if response.field("zones").is_some_and(Value::is_array) {
            tracing::debug!("Hetzner DNS credentials accepted");
            Ok(())
        } else {
            Err(Error::auth(format!(
                "Hetzner DNS authentication failed: {}",
                response.error_message()
            )))
        }
    }

    /// ```http
    /// GET /zones?name=example.com
    /// Auth-API-Token: <token>
    /// ```
    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>> {
        tracing::debug!("Looking up zone: {}", name);
        let response = self.client.get("zones", &[("name", name)]).await?;

        let Some(zones) = response.field("zones").and_then(Value::as_array) else {
            // Unknown zone names are answered with 404 and no list
            if response.status.as_u16() == 404 {
                return Ok(Vec::new());
            }
            return Err(Self::failure(&response, "Zone lookup failed"));
        };

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

    /// One listing for all families:
    ///
    /// ```http
    /// GET /records?zone_id=:zone_id
    /// ```
    async fn find_records(
        &self,
        zone: &Zone,
        domain: &str,
        families: &[AddressFamily],
    ) -> Result<RecordListing> {
        tracing::debug!("Listing records of zone {} for {}", zone.id, domain);
        let response = self
            .client
            .get("records", &[("zone_id", zone.id.as_str())])
            .await?;

        let records = response
            .field("records")
            .and_then(Value::as_array)
            .ok_or_else(|| Self::failure(&response, "Record listing failed"))?;

        let matching: Vec<RecordSet> = records
            .iter()
            .filter_map(|record| Self::decode_record(record, &zone.id))
            .filter(|record| names_domain(&record.name, domain, zone))
            .collect();

        let mut listing = RecordListing::new();
        for family in families {
            let found = matching
                .iter()
                .filter(|record| record.family == *family)
                .cloned()
                .collect();
            listing.insert(*family, Lookup::Found(found));
        }
        Ok(listing)
    }

    /// ```http
    /// POST /records
    /// {"type": "A", "name": "home.example.com", "value": "1.2.3.4", "ttl": 60, "zone_id": "..."}
    /// ```
    async fn create_record(&self, zone: &Zone, domain: &str, address: IpAddr) -> Result<RecordSet> {
        let family = AddressFamily::of(&address);
        tracing::info!("Creating {} record: {} -> {}", family.record_type(), domain, address);

        let body = json!({
            "type": family.record_type(),
            "name": domain,
            "value": address.to_string(),
            "ttl": HETZNER_DNS_TTL,
            "zone_id": zone.id,
        });
        let response = self.client.post("records", &body).await?;
        self.written_record(&response, zone, "Record creation failed")
    }

    /// ```http
    /// PUT /records/:record_id
    /// {"type": "A", "name": "home", "value": "1.2.3.4", "ttl": 60, "zone_id": "..."}
    /// ```
    async fn update_record(
        &self,
        zone: &Zone,
        existing: &RecordSet,
        address: IpAddr,
    ) -> Result<RecordSet> {
        tracing::info!(
            "Updating record {} ({}): {:?} -> {}",
            existing.id,
            existing.name,
            existing.value,
            address
        );

        let body = json!({
            "type": existing.family.record_type(),
            "name": existing.name,
            "value": address.to_string(),
            "ttl": HETZNER_DNS_TTL,
            "zone_id": zone.id,
        });
        let endpoint = format!("records/{}", existing.id);
        let response = self.client.put(&endpoint, &body).await?;
        self.written_record(&response, zone, "Record update failed")
    }

    fn record_ttl(&self) -> u32 {
        HETZNER_DNS_TTL
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
