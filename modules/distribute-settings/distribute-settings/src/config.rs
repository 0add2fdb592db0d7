//! Configuration for the distribute-settings module.

use std::path::{Path, PathBuf};

use anyhow::Context;
use distribute_settings_sdk::{UpdateTrack, UpdateTrackTime};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `DISTRIBUTE_SETTINGS_STORE_PATH`.
pub const ENV_PREFIX: &str = "DISTRIBUTE_SETTINGS_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributeSettingsConfig {
    /// Track persisted on first run.
    #[serde(default = "default_update_track")]
    pub default_update_track: UpdateTrack,

    /// Timing persisted on first run.
    #[serde(default = "default_update_track_time")]
    pub default_update_track_time: UpdateTrackTime,

    /// Feature toggle position before the first live query.
    #[serde(default = "default_feature_flag")]
    pub feature_flag_default: bool,

    /// JSON file backing the store. In-memory store when unset.
    pub store_path: Option<PathBuf>,

    /// Pending UI events per view before senders wait.
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,
}

fn default_update_track() -> UpdateTrack {
    UpdateTrack::Public
}

fn default_update_track_time() -> UpdateTrackTime {
    UpdateTrackTime::BeforeNextStart
}

fn default_feature_flag() -> bool {
    true
}

fn default_event_queue_capacity() -> usize {
    32
}

impl Default for DistributeSettingsConfig {
    fn default() -> Self {
        Self {
            default_update_track: default_update_track(),
            default_update_track_time: default_update_track_time(),
            feature_flag_default: default_feature_flag(),
            store_path: None,
            event_queue_capacity: default_event_queue_capacity(),
        }
    }
}

impl DistributeSettingsConfig {
    /// Layer defaults, an optional YAML file and `DISTRIBUTE_SETTINGS_*`
    /// environment variables, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML file or an environment variable cannot be
    /// parsed, or if the resulting config is invalid.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("failed to load distribute settings config")?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if `event_queue_capacity` is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.event_queue_capacity == 0 {
            anyhow::bail!("event_queue_capacity must be greater than zero");
        }
        Ok(())
    }
}
