// # ddns-core
//
// Core library of the DDNS update bridge.
//
// A router reports its new public address; the bridge reconciles the A/AAAA
// records of one or more domains at the DNS provider so they match.
//
// ## Architecture Overview
//
// - **ProviderModel**: Trait for reading/writing address records via a provider API
// - **ZoneResolver**: Maps a domain to the provider zone owning it
// - **RecordReconciler**: Per-domain skip/update/create decision per address family
// - **BatchRunner**: Runs a whole update request and folds the verdict
// - **ProviderRegistry**: Plugin-based registry for provider models
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decisions live here, wire formats live in provider crates
// 2. **Stateless**: Every run re-reads zones and records; nothing is cached
// 3. **Idempotency**: A record that already matches is never written again
// 4. **Failure Isolation**: One failing domain or family never stops the others
// 5. **Library-First**: The daemon is a thin HTTP layer over this crate

pub mod traits;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;
pub mod target;
pub mod zone;

// Re-export core types for convenience
pub use traits::{ProviderModel, ProviderModelFactory, RecordSet, Zone};
pub use engine::{BatchReport, BatchRunner, DomainOutcome, DomainStatus, FamilyOutcome, UpdateRequest, Verdict};
pub use registry::ProviderRegistry;
pub use config::{BridgeConfig, DuplicatePolicy, ExistingRecordPolicy, ProviderConfig, ReconcileConfig};
pub use error::{Error, Result};
pub use target::{AddressFamily, AddressTargets, DesiredTarget};
pub use zone::ZoneResolver;
