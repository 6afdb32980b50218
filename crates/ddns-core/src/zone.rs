//! Zone resolution
//!
//! Maps a fully-qualified domain name to the provider zone that owns it.
//!
//! The zone name is taken to be the last two labels of the domain
//! ("service.my-domain.ch" → "my-domain.ch"). Multi-label public suffixes
//! such as "co.uk" are not recognised: "home.example.co.uk" resolves to the
//! candidate "co.uk", which the provider will not know.

use crate::error::Result;
use crate::traits::{ProviderModel, Zone};
use tracing::{debug, info, warn};

/// Resolves domains to provider zones
pub struct ZoneResolver<'a> {
    provider: &'a dyn ProviderModel,
}

impl<'a> ZoneResolver<'a> {
    pub fn new(provider: &'a dyn ProviderModel) -> Self {
        Self { provider }
    }

    /// Find the zone for `domain`
    ///
    /// - `Ok(None)`: the provider has no zone with the candidate name
    /// - `Err(_)`: the zone query itself failed
    ///
    /// When several zones match, the first one in provider order wins.
    pub async fn resolve(&self, domain: &str) -> Result<Option<Zone>> {
        let Some(candidate) = candidate_zone_name(domain) else {
            warn!("Domain '{}' has no labels, cannot derive a zone", domain);
            return Ok(None);
        };

        debug!("Looking up zone '{}' for domain {}", candidate, domain);
        let zones = self.provider.find_zones(&candidate).await?;

        if zones.len() > 1 {
            warn!(
                "{} zones named '{}' returned, using the first ({})",
                zones.len(),
                candidate,
                zones[0].id
            );
        }

        let zone = zones.into_iter().next();
        if let Some(ref zone) = zone {
            info!("Found zone ID {} for {}", zone.id, zone.name);
        }
        Ok(zone)
    }
}

fn labels(domain: &str) -> Vec<&str> {
    let domain = domain.trim().trim_end_matches('.');
    if domain.is_empty() {
        return Vec::new();
    }
    domain.split('.').collect()
}

/// The last two labels of `domain`, or the domain itself if it has only one
pub fn candidate_zone_name(domain: &str) -> Option<String> {
    let labels = labels(domain);
    if labels.is_empty() {
        return None;
    }
    let start = labels.len().saturating_sub(2);
    Some(labels[start..].join("."))
}

/// Labels preceding the two-label zone suffix; empty for the zone apex
pub fn relative_name(domain: &str) -> String {
    let labels = labels(domain);
    let end = labels.len().saturating_sub(2);
    labels[..end].join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_zone_name() {
        assert_eq!(
            candidate_zone_name("service.my-domain.ch").as_deref(),
            Some("my-domain.ch")
        );
        assert_eq!(candidate_zone_name("a.b.example.com").as_deref(), Some("example.com"));
        assert_eq!(candidate_zone_name("example.com.").as_deref(), Some("example.com"));
        assert_eq!(candidate_zone_name("localhost").as_deref(), Some("localhost"));
        assert_eq!(candidate_zone_name(""), None);
    }

    #[test]
    fn test_multi_label_suffix_not_special_cased() {
        assert_eq!(candidate_zone_name("home.example.co.uk").as_deref(), Some("co.uk"));
    }

    #[test]
    fn test_relative_name() {
        assert_eq!(relative_name("service.my-domain.ch"), "service");
        assert_eq!(relative_name("a.b.example.com"), "a.b");
        assert_eq!(relative_name("example.com"), "");
        assert_eq!(relative_name("localhost"), "");
    }
}
