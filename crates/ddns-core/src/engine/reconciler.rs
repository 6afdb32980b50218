//! Per-domain record reconciliation
//!
//! For one domain and its desired targets, decide per family whether to
//! leave the record alone, update it or create it, and issue exactly that
//! write through the [`ProviderModel`].
//!
//! ```text
//!            lookup(F)
//!               │
//!     ┌─────────┼──────────────┬─────────────────┐
//!     ▼         ▼              ▼                 ▼
//!   failed    none        one (or first)     several + Reject
//!     │         │              │                 │
//!     │      create     value == V ?             │
//!     │         │        │         │             │
//!     │         │      Unchanged  policy         │
//!     │         │                 │    │         │
//!     │         │            Upsert  CreateOnly  │
//!     │         │              │        │        │
//!     ▼         ▼              ▼        ▼        ▼
//!   Failed   Created/Failed  Updated/  Retained  Failed
//!                            Failed
//! ```

use crate::config::{DuplicatePolicy, ExistingRecordPolicy, ReconcileConfig};
use crate::engine::outcome::{DomainOutcome, DomainStatus, FamilyOutcome};
use crate::target::{AddressFamily, DesiredTarget};
use crate::traits::{Lookup, ProviderModel, RecordSet, Zone};
use tracing::{debug, error, info, warn};

/// Reconciles the records of a single domain
pub struct RecordReconciler<'a> {
    provider: &'a dyn ProviderModel,
    policy: ReconcileConfig,
}

impl<'a> RecordReconciler<'a> {
    pub fn new(provider: &'a dyn ProviderModel, policy: ReconcileConfig) -> Self {
        Self { provider, policy }
    }

    /// Bring the records of `domain` in `zone` in line with `targets`
    ///
    /// Never fails as a whole: every error is folded into the outcome of the
    /// family (or, if the listing itself failed, the domain) it belongs to.
    pub async fn reconcile(
        &self,
        zone: &Zone,
        domain: &str,
        targets: &[DesiredTarget],
    ) -> DomainOutcome {
        let families: Vec<AddressFamily> = targets.iter().map(|t| t.family).collect();

        let listing = match self.provider.find_records(zone, domain, &families).await {
            Ok(listing) => listing,
            Err(e) => {
                error!("Could not get records for zone {}: {}", zone.id, e);
                return DomainOutcome::skipped(domain, DomainStatus::SkippedNoRecords);
            }
        };

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let outcome = match listing.get(target.family) {
                Some(Lookup::Found(records)) => self.apply(zone, target, records).await,
                Some(Lookup::Failed(reason)) => {
                    error!(
                        "Could not look up {} record for {}: {}",
                        target.family, domain, reason
                    );
                    FamilyOutcome::failed(reason.clone())
                }
                None => {
                    error!(
                        "Provider returned no {} lookup for {}",
                        target.family, domain
                    );
                    FamilyOutcome::failed("record lookup missing from provider listing")
                }
            };
            outcomes.push((target.family, outcome));
        }

        DomainOutcome::from_families(domain, outcomes)
    }

    /// Decide and perform the write for one family
    async fn apply(
        &self,
        zone: &Zone,
        target: &DesiredTarget,
        records: &[RecordSet],
    ) -> FamilyOutcome {
        let existing = match records {
            [] => None,
            [only] => Some(only),
            [first, ..] => match self.policy.duplicate_policy {
                DuplicatePolicy::FirstMatch => {
                    warn!(
                        "{} {} records match {}, acting on the first ({})",
                        records.len(),
                        target.family,
                        target.domain,
                        first.id
                    );
                    Some(first)
                }
                DuplicatePolicy::Reject => {
                    error!(
                        "{} {} records match {}, refusing to pick one",
                        records.len(),
                        target.family,
                        target.domain
                    );
                    return FamilyOutcome::failed(format!(
                        "{} {} records match {}",
                        records.len(),
                        target.family,
                        target.domain
                    ));
                }
            },
        };

        match existing {
            Some(record) => self.reconcile_existing(zone, target, record).await,
            None => self.create(zone, target).await,
        }
    }

    async fn reconcile_existing(
        &self,
        zone: &Zone,
        target: &DesiredTarget,
        record: &RecordSet,
    ) -> FamilyOutcome {
        info!(
            "Found existing record: {} {} -> {}",
            target.family,
            target.domain,
            record.value.as_deref().unwrap_or("<empty>")
        );

        if record.has_value(&target.address) {
            info!("{} record for {} already up-to-date", target.family, target.domain);
            return FamilyOutcome::Unchanged;
        }

        if self.policy.existing_record_policy == ExistingRecordPolicy::CreateOnly {
            info!(
                "{} record {} for {} exists, leaving it untouched (create-only)",
                target.family, record.id, target.domain
            );
            return FamilyOutcome::Retained {
                current: record.value.clone(),
            };
        }

        debug!(
            "Updating {} record {} to {} (ttl {})",
            target.family,
            record.id,
            target.address,
            self.provider.record_ttl()
        );
        match self.provider.update_record(zone, record, target.address).await {
            Ok(_) => {
                info!(
                    "Updated {} record for {} successfully: {}",
                    target.family, target.domain, target.address
                );
                FamilyOutcome::Updated {
                    previous: record.value.clone(),
                }
            }
            Err(e) => {
                error!(
                    "Failed to update {} record for {}: {}",
                    target.family, target.domain, e
                );
                FamilyOutcome::failed(e.to_string())
            }
        }
    }

    async fn create(&self, zone: &Zone, target: &DesiredTarget) -> FamilyOutcome {
        info!(
            "Creating new {} record for {} (ttl {})",
            target.family,
            target.domain,
            self.provider.record_ttl()
        );
        match self
            .provider
            .create_record(zone, &target.domain, target.address)
            .await
        {
            Ok(created) => {
                info!(
                    "Created {} record {} successfully: {}",
                    target.family, created.id, target.address
                );
                FamilyOutcome::Created
            }
            Err(e) => {
                error!(
                    "Failed to create {} record for {}: {}",
                    target.family, target.domain, e
                );
                FamilyOutcome::failed(e.to_string())
            }
        }
    }
}
