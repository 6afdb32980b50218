//! Core reconciliation engine
//!
//! The BatchRunner is responsible for:
//! - Rejecting runs without targets or domains before any provider call
//! - Checking the credential once (preflight)
//! - Resolving each domain's zone and reconciling its records
//! - Folding per-domain outcomes into one verdict
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ UpdateRequest │
//! └───────┬───────┘
//!         ▼
//! ┌───────────────┐   preflight   ┌───────────────┐
//! │  BatchRunner  │──────────────▶│ ProviderModel │
//! └───────┬───────┘               └───────▲───────┘
//!         │ per domain                    │
//!         ▼                               │
//! ┌───────────────┐                       │
//! │ ZoneResolver  │───────────────────────┤
//! └───────┬───────┘                       │
//!         ▼                               │
//! ┌──────────────────┐                    │
//! │ RecordReconciler │────────────────────┘
//! └──────────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Validate input (fatal on failure, zero provider calls)
//! 2. Verify credentials (fatal on failure)
//! 3. For each domain in order: resolve zone, reconcile families
//! 4. Fold outcomes into a [`Verdict`]
//!
//! Domains are processed strictly one after another; a failing domain never
//! stops the ones after it.

pub mod outcome;
pub mod reconciler;

pub use outcome::{BatchReport, DomainOutcome, DomainStatus, FamilyOutcome, Verdict};
pub use reconciler::RecordReconciler;

use crate::config::{BridgeConfig, ReconcileConfig};
use crate::error::{Error, Result};
use crate::target::AddressTargets;
use crate::traits::ProviderModel;
use crate::zone::ZoneResolver;
use tracing::{error, info};

/// One update notification: which domains, which addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Domains in the order they were listed; duplicates are kept
    pub domains: Vec<String>,
    /// Addresses to publish
    pub targets: AddressTargets,
}

impl UpdateRequest {
    pub fn new(domains: Vec<String>, targets: AddressTargets) -> Self {
        Self { domains, targets }
    }

    /// Build a request from a comma-separated domain list
    pub fn from_domain_list(list: &str, targets: AddressTargets) -> Self {
        Self {
            domains: list.split(',').map(str::to_string).collect(),
            targets,
        }
    }

    /// Domains trimmed, with empty tokens dropped
    pub fn normalized_domains(&self) -> Vec<String> {
        self.domains
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Runs one reconciliation pass over a list of domains
///
/// ## Lifecycle
///
/// 1. Create with [`BatchRunner::new()`]
/// 2. Call [`BatchRunner::run()`] once per update notification
///
/// Nothing is cached between runs; every run re-resolves zones and records
/// from the provider.
pub struct BatchRunner {
    /// Provider model for all reads and writes
    provider: Box<dyn ProviderModel>,

    /// Reconciliation policies
    policy: ReconcileConfig,
}

impl BatchRunner {
    /// Create a new runner
    ///
    /// # Parameters
    ///
    /// - `provider`: Provider model implementation
    /// - `config`: Bridge configuration (validated here)
    pub fn new(provider: Box<dyn ProviderModel>, config: &BridgeConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            policy: config.reconcile,
        })
    }

    /// Create a runner from a provider and policies, skipping config validation
    pub fn with_policy(provider: Box<dyn ProviderModel>, policy: ReconcileConfig) -> Self {
        Self { provider, policy }
    }

    /// Run one reconciliation pass
    ///
    /// # Returns
    ///
    /// - `Ok(BatchReport)`: every domain was attempted; see `verdict`
    /// - `Err(Error::InvalidInput)`: no targets or no domains, nothing was called
    /// - `Err(Error::Authentication)`: the preflight check failed, no domain was processed
    pub async fn run(&self, request: &UpdateRequest) -> Result<BatchReport> {
        let started_at = chrono::Utc::now();

        if request.targets.is_empty() {
            error!("Neither IPv4 nor IPv6 available");
            return Err(Error::invalid_input(
                "Neither IPv4 nor IPv6 available. Probably the parameters are missing in the update URL.",
            ));
        }

        let domains = request.normalized_domains();
        if domains.is_empty() {
            error!("No domain to update");
            return Err(Error::invalid_input("Domain parameter missing or invalid"));
        }

        self.preflight().await?;

        info!("Found records to set: {}", domains.join(", "));

        let mut outcomes = Vec::with_capacity(domains.len());
        for domain in &domains {
            info!("Processing domain: {}", domain);
            let outcome = self.run_domain(domain, &request.targets).await;
            info!("Domain {} finished: {}", domain, outcome.status);
            outcomes.push(outcome);
        }

        let verdict = Verdict::fold(&outcomes);
        info!("Run completed: {}", verdict);

        Ok(BatchReport {
            verdict,
            outcomes,
            started_at,
            finished_at: chrono::Utc::now(),
        })
    }

    async fn preflight(&self) -> Result<()> {
        match self.provider.verify_credentials().await {
            Ok(()) => {
                info!("{} authentication successful", self.provider.provider_name());
                Ok(())
            }
            Err(e) => {
                error!("{} authentication failed: {}", self.provider.provider_name(), e);
                match e {
                    Error::Authentication(_) => Err(e),
                    other => Err(Error::auth(other.to_string())),
                }
            }
        }
    }

    async fn run_domain(&self, domain: &str, targets: &AddressTargets) -> DomainOutcome {
        let resolver = ZoneResolver::new(self.provider.as_ref());
        let zone = match resolver.resolve(domain).await {
            Ok(Some(zone)) => zone,
            Ok(None) => {
                error!("Could not find zone for domain '{}'", domain);
                return DomainOutcome::skipped(domain, DomainStatus::SkippedNoZone);
            }
            Err(e) => {
                error!("Zone lookup for '{}' failed: {}", domain, e);
                return DomainOutcome::skipped(domain, DomainStatus::SkippedNoZone);
            }
        };

        let desired = targets.for_domain(domain);
        RecordReconciler::new(self.provider.as_ref(), self.policy)
            .reconcile(&zone, domain, &desired)
            .await
    }
}
