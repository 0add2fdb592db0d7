//! Distribute Settings SDK
//!
//! This crate provides the public contract for the distribute-settings module:
//! - Capability traits the reconciler consumes (`FeatureProvider`,
//!   `UpdateTrackProvider`, `EventFilterProvider`, `SettingsStore`)
//! - Model types (`UpdateTrack`, `UpdateTrackTime`)
//! - Error types (`ProviderError`, `SettingsError`)
//!
//! Hosts implement the provider traits on top of their SDK bindings and hand
//! them to the reconciler:
//! ```ignore
//! let reconciler = Reconciler::new(providers, store);
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod errors;
pub mod models;

pub use api::{EventFilterProvider, FeatureProvider, SettingsStore, UpdateTrackProvider};
pub use errors::{ProviderError, SettingsError};
pub use models::{UpdateTrack, UpdateTrackTime};
