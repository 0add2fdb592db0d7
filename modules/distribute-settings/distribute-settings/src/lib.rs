//! Distribute Settings Module Implementation
//!
//! Keeps a settings screen's distribute, push and event filter toggles and its
//! update track pickers consistent with persisted values and live SDK state.
//! The provider and store contracts live in `distribute-settings-sdk` and are
//! re-exported here.

pub use distribute_settings_sdk::{
    EventFilterProvider, FeatureProvider, ProviderError, SettingsError, SettingsStore,
    UpdateTrack, UpdateTrackProvider, UpdateTrackTime,
};

pub mod config;
pub mod domain;
pub mod infra;


pub use config::DistributeSettingsConfig;
pub use domain::events::{DispatchError, SettingsEvent, SettingsViewHandle};
pub use domain::service::{CommitOutcome, Providers, Reconciler};
pub use domain::view::{PickerControl, SettingsView, ToggleControl, TrackControlState};
