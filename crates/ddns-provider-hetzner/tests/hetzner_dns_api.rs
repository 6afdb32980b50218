//! Integration tests for the DNS Console provider using wiremock.
//!
//! These tests pin the wire format (paths, headers, bodies) and the
//! "success means the expected field is present" rule.

use ddns_core::traits::{Lookup, ProviderModel, RecordSet, Zone};
use ddns_core::{
    AddressFamily, AddressTargets, BatchRunner, DomainStatus, Error, ReconcileConfig,
    UpdateRequest, Verdict,
};
use ddns_provider_hetzner::HetznerDnsProvider;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "dns-token-0123456789";

fn provider(server: &MockServer) -> HetznerDnsProvider {
    HetznerDnsProvider::with_base_url(server.uri(), TOKEN).unwrap()
}

fn zone() -> Zone {
    Zone {
        id: "z1".to_string(),
        name: "example.com".to_string(),
    }
}

fn a_record(id: &str, name: &str, value: &str) -> RecordSet {
    RecordSet {
        id: id.to_string(),
        zone_id: "z1".to_string(),
        name: name.to_string(),
        family: AddressFamily::V4,
        value: Some(value.to_string()),
        ttl: Some(60),
    }
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn test_verify_credentials_sends_auth_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(header("Auth-API-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"zones": []})))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server).verify_credentials().await;
    assert!(result.is_ok(), "Credentials should be accepted: {:?}", result.err());
}

#[tokio::test]
async fn test_verify_credentials_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Invalid authentication credentials"})),
        )
        .mount(&server)
        .await;

    let result = provider(&server).verify_credentials().await;
    match result {
        Err(Error::Authentication(message)) => {
            assert!(message.contains("Invalid authentication credentials"));
            assert!(!message.contains(TOKEN));
        }
        other => panic!("Expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_authentication_failure() {
    let provider = HetznerDnsProvider::with_base_url("http://127.0.0.1:1", TOKEN).unwrap();
    let result = provider.verify_credentials().await;
    assert!(matches!(result, Err(Error::Authentication(_))));
}

// =============================================================================
// Zones
// =============================================================================

#[tokio::test]
async fn test_find_zones_by_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("name", "example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [{"id": "z1", "name": "example.com", "ttl": 86400}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let zones = provider(&server).find_zones("example.com").await.unwrap();
    assert_eq!(zones, vec![zone()]);
}

#[tokio::test]
async fn test_unknown_zone_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "zone not found"})),
        )
        .mount(&server)
        .await;

    let zones = provider(&server).find_zones("example.org").await.unwrap();
    assert!(zones.is_empty());
}

// =============================================================================
// Records
// =============================================================================

#[tokio::test]
async fn test_find_records_filters_by_name_and_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .and(query_param("zone_id", "z1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"id": "r1", "type": "A", "name": "home", "value": "203.0.113.1", "ttl": 60, "zone_id": "z1"},
                {"id": "r2", "type": "AAAA", "name": "home", "value": "2001:db8::1", "zone_id": "z1"},
                {"id": "r3", "type": "A", "name": "nas", "value": "203.0.113.9", "zone_id": "z1"},
                {"id": "r4", "type": "TXT", "name": "home", "value": "v=spf1", "zone_id": "z1"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = provider(&server)
        .find_records(&zone(), "home.example.com", &[AddressFamily::V4, AddressFamily::V6])
        .await
        .unwrap();

    match listing.get(AddressFamily::V4) {
        Some(Lookup::Found(records)) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].id, "r1");
        }
        other => panic!("Unexpected V4 lookup: {:?}", other),
    }
    match listing.get(AddressFamily::V6) {
        Some(Lookup::Found(records)) => assert_eq!(records[0].id, "r2"),
        other => panic!("Unexpected V6 lookup: {:?}", other),
    }
}

#[tokio::test]
async fn test_listing_without_records_field_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream error"))
        .mount(&server)
        .await;

    let result = provider(&server)
        .find_records(&zone(), "home.example.com", &[AddressFamily::V4])
        .await;
    assert!(matches!(result, Err(Error::Provider { .. })));
}

#[tokio::test]
async fn test_create_record_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/records"))
        .and(body_json(json!({
            "type": "AAAA",
            "name": "home.example.com",
            "value": "2001:db8::5",
            "ttl": 60,
            "zone_id": "z1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": {"id": "r9", "type": "AAAA", "name": "home", "value": "2001:db8::5", "ttl": 60, "zone_id": "z1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = provider(&server)
        .create_record(&zone(), "home.example.com", "2001:db8::5".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(record.id, "r9");
    assert_eq!(record.family, AddressFamily::V6);
}

#[tokio::test]
async fn test_create_without_record_field_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/records"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"error": {"message": "invalid value", "code": 422}})),
        )
        .mount(&server)
        .await;

    let result = provider(&server)
        .create_record(&zone(), "home.example.com", "203.0.113.5".parse().unwrap())
        .await;
    match result {
        Err(Error::Provider { provider, message }) => {
            assert_eq!(provider, "hetzner-dns");
            assert!(message.contains("invalid value"));
        }
        other => panic!("Expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_record_puts_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/records/r1"))
        .and(body_json(json!({
            "type": "A",
            "name": "home",
            "value": "203.0.113.5",
            "ttl": 60,
            "zone_id": "z1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": {"id": "r1", "type": "A", "name": "home", "value": "203.0.113.5", "ttl": 60, "zone_id": "z1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = provider(&server)
        .update_record(&zone(), &a_record("r1", "home", "203.0.113.1"), "203.0.113.5".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(record.id, "r1");
    assert_eq!(record.value.as_deref(), Some("203.0.113.5"));
}

// =============================================================================
// End to end through the engine
// =============================================================================

#[tokio::test]
async fn test_batch_updates_stale_record_and_skips_matching_one() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [{"id": "z1", "name": "example.com"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"id": "r1", "type": "A", "name": "home", "value": "203.0.113.1", "zone_id": "z1"},
                {"id": "r2", "type": "A", "name": "nas", "value": "203.0.113.5", "zone_id": "z1"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/records/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": {"id": "r1", "type": "A", "name": "home", "value": "203.0.113.5", "zone_id": "z1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/records/r2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let runner = BatchRunner::with_policy(Box::new(provider(&server)), ReconcileConfig::default());
    let request = UpdateRequest::from_domain_list(
        "home.example.com,nas.example.com",
        AddressTargets::parse_lenient(Some("203.0.113.5"), None),
    );

    let report = runner.run(&request).await.unwrap();
    assert_eq!(report.outcomes[0].status, DomainStatus::Updated);
    assert_eq!(report.outcomes[1].status, DomainStatus::Unchanged);
    assert_eq!(report.verdict, Verdict::Success);
}
