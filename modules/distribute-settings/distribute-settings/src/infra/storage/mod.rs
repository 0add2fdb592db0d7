pub mod json_file;
pub mod memory;


use std::sync::Arc;

use distribute_settings_sdk::{SettingsStore, UpdateTrack, UpdateTrackTime};
use serde::{Deserialize, Serialize};

use crate::config::DistributeSettingsConfig;

pub use json_file::JsonFileSettingsStore;
pub use memory::InMemorySettingsStore;

/// Persisted settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub update_track: UpdateTrack,
    pub update_track_time: UpdateTrackTime,
    pub feature_flag_default: bool,
}

impl PersistedSettings {
    /// First-run values.
    #[must_use]
    pub fn from_config(config: &DistributeSettingsConfig) -> Self {
        Self {
            update_track: config.default_update_track,
            update_track_time: config.default_update_track_time,
            feature_flag_default: config.feature_flag_default,
        }
    }
}

/// Open the store selected by `store_path`.
///
/// # Errors
///
/// Returns an error if the JSON file exists but cannot be read or parsed, or
/// if the first-run document cannot be written.
pub async fn open_store(
    config: &DistributeSettingsConfig,
) -> anyhow::Result<Arc<dyn SettingsStore>> {
    match &config.store_path {
        Some(path) => {
            let store = JsonFileSettingsStore::open(path, config).await?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemorySettingsStore::from_config(config))),
    }
}
