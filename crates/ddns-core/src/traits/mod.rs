//! Core traits for the DDNS bridge
//!
//! This module defines the abstract interface every provider model must
//! follow.
//!
//! - [`ProviderModel`]: Read and write address records via a provider API

pub mod provider_model;

pub use provider_model::{
    Lookup, ProviderModel, ProviderModelFactory, RecordListing, RecordSet, Zone,
};
