//! Outcomes of a reconciliation run

use crate::target::AddressFamily;
use chrono::{DateTime, Utc};
use std::fmt;

/// What happened to one (domain, family)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyOutcome {
    /// Record already had the desired value, nothing written
    Unchanged,
    /// Record exists with another value and the create-only policy kept it
    Retained {
        /// Value left in place
        current: Option<String>,
    },
    /// Record value replaced in place
    Updated {
        /// Value before the update
        previous: Option<String>,
    },
    /// Record did not exist and was created
    Created,
    /// Lookup or write failed
    Failed {
        /// Human readable reason
        reason: String,
    },
}

impl FamilyOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        FamilyOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FamilyOutcome::Failed { .. })
    }
}

impl fmt::Display for FamilyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = |v: &Option<String>| v.clone().unwrap_or_else(|| "<none>".to_string());
        match self {
            FamilyOutcome::Unchanged => f.write_str("unchanged"),
            FamilyOutcome::Retained { current } => write!(f, "retained {}", value(current)),
            FamilyOutcome::Updated { previous } => write!(f, "updated from {}", value(previous)),
            FamilyOutcome::Created => f.write_str("created"),
            FamilyOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Summary status of one domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatus {
    /// Every family already matched (or was retained)
    Unchanged,
    /// At least one family updated, none created or failed
    Updated,
    /// At least one family created, none failed
    Created,
    /// No zone found for the domain
    SkippedNoZone,
    /// The zone's records could not be read
    SkippedNoRecords,
    /// At least one family failed
    Failed,
}

impl DomainStatus {
    /// Whether this status counts towards an overall success
    pub fn is_success(self) -> bool {
        matches!(
            self,
            DomainStatus::Unchanged | DomainStatus::Updated | DomainStatus::Created
        )
    }

    /// Fold per-family outcomes: failed, then created, then updated, then unchanged
    pub fn from_families(families: &[(AddressFamily, FamilyOutcome)]) -> Self {
        let any = |pred: fn(&FamilyOutcome) -> bool| families.iter().any(|(_, o)| pred(o));

        if any(FamilyOutcome::is_failure) {
            DomainStatus::Failed
        } else if any(|o| matches!(o, FamilyOutcome::Created)) {
            DomainStatus::Created
        } else if any(|o| matches!(o, FamilyOutcome::Updated { .. })) {
            DomainStatus::Updated
        } else {
            DomainStatus::Unchanged
        }
    }
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DomainStatus::Unchanged => "unchanged",
            DomainStatus::Updated => "updated",
            DomainStatus::Created => "created",
            DomainStatus::SkippedNoZone => "skipped-no-zone",
            DomainStatus::SkippedNoRecords => "skipped-no-records",
            DomainStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of reconciling one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOutcome {
    /// Domain as processed (trimmed)
    pub domain: String,
    /// Summary status
    pub status: DomainStatus,
    /// Per-family detail, in the order the families were processed
    pub families: Vec<(AddressFamily, FamilyOutcome)>,
}

impl DomainOutcome {
    /// Build an outcome whose status is folded from `families`
    pub fn from_families(
        domain: impl Into<String>,
        families: Vec<(AddressFamily, FamilyOutcome)>,
    ) -> Self {
        Self {
            domain: domain.into(),
            status: DomainStatus::from_families(&families),
            families,
        }
    }

    /// Build an outcome for a domain that was abandoned before any family
    pub fn skipped(domain: impl Into<String>, status: DomainStatus) -> Self {
        Self {
            domain: domain.into(),
            status,
            families: Vec::new(),
        }
    }

    /// Outcome of one family, if it was processed
    pub fn family(&self, family: AddressFamily) -> Option<&FamilyOutcome> {
        self.families
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, outcome)| outcome)
    }
}

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
}

impl Verdict {
    /// Non-short-circuiting fold over domain outcomes
    pub fn fold<'a>(outcomes: impl IntoIterator<Item = &'a DomainOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Verdict::Success, |verdict, outcome| {
                if outcome.status.is_success() {
                    verdict
                } else {
                    Verdict::Failure
                }
            })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => f.write_str("success"),
            Verdict::Failure => f.write_str("failure"),
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Overall verdict
    pub verdict: Verdict,
    /// One outcome per requested domain, in input order
    pub outcomes: Vec<DomainOutcome>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Wall-clock time the run took
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
