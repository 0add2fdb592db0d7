//! Capability traits consumed by the settings reconciler.
//!
//! Every trait here is implemented by the host on top of its SDK bindings.
//! Provider calls are asynchronous and fallible; store reads are served from
//! memory and never fail.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{UpdateTrack, UpdateTrackTime};

/// An SDK capability that can be switched on and off at runtime.
///
/// Used for the SDK as a whole as well as for the distribute and push
/// services.
#[async_trait]
pub trait FeatureProvider: Send + Sync {
    /// Current live enabled state.
    async fn is_enabled(&self) -> Result<bool, ProviderError>;

    /// Request a new enabled state.
    ///
    /// Success does not imply the provider now reports `enabled`; callers
    /// must re-query.
    async fn set_enabled(&self, enabled: bool) -> Result<(), ProviderError>;
}

/// Live "current update track" property of the distribution SDK.
pub trait UpdateTrackProvider: Send + Sync {
    /// Switch the track the SDK checks for updates. Takes effect immediately.
    fn set_update_track(&self, track: UpdateTrack);
}

/// Optional event filter service.
///
/// Must be started once before it can be enabled.
#[async_trait]
pub trait EventFilterProvider: FeatureProvider {
    /// Start the service. Must succeed once before `set_enabled` is called.
    async fn start(&self) -> Result<(), ProviderError>;
}

/// Persisted update settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Persisted update track.
    fn update_track(&self) -> UpdateTrack;

    /// Persist a new update track. Reads see it only after the write succeeds.
    async fn set_update_track(&self, track: UpdateTrack) -> anyhow::Result<()>;

    /// Persisted moment at which a track change is applied.
    fn update_track_time(&self) -> UpdateTrackTime;

    /// Persist a new update track time. Reads see it only after the write succeeds.
    async fn set_update_track_time(&self, time: UpdateTrackTime) -> anyhow::Result<()>;

    /// Feature toggle position shown before the first live query.
    fn feature_flag_default(&self) -> bool;
}
