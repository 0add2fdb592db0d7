use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use distribute_settings_sdk::{SettingsStore, UpdateTrack, UpdateTrackTime};
use parking_lot::RwLock;

use super::PersistedSettings;
use crate::config::DistributeSettingsConfig;

/// Store that lives for the process only. Counts writes.
#[derive(Debug)]
pub struct InMemorySettingsStore {
    state: RwLock<PersistedSettings>,
    writes: AtomicUsize,
}

impl InMemorySettingsStore {
    #[must_use]
    pub fn new(settings: PersistedSettings) -> Self {
        Self {
            state: RwLock::new(settings),
            writes: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn from_config(config: &DistributeSettingsConfig) -> Self {
        Self::new(PersistedSettings::from_config(config))
    }

    #[must_use]
    pub fn snapshot(&self) -> PersistedSettings {
        *self.state.read()
    }

    /// Number of setter calls since creation.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    fn update_track(&self) -> UpdateTrack {
        self.state.read().update_track
    }

    async fn set_update_track(&self, track: UpdateTrack) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.state.write().update_track = track;
        Ok(())
    }

    fn update_track_time(&self) -> UpdateTrackTime {
        self.state.read().update_track_time
    }

    async fn set_update_track_time(&self, time: UpdateTrackTime) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.state.write().update_track_time = time;
        Ok(())
    }

    fn feature_flag_default(&self) -> bool {
        self.state.read().feature_flag_default
    }
}
