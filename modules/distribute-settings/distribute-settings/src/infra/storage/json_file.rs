//! JSON file backed settings store.
//!
//! The whole document is rewritten on every change, through a temp file and
//! a rename so a crash never leaves a half-written file behind. Reads are
//! served from the in-memory copy, which is only updated after the file
//! write succeeds.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use distribute_settings_sdk::{SettingsStore, UpdateTrack, UpdateTrackTime};
use parking_lot::RwLock;
use tokio::sync::Mutex;

use super::PersistedSettings;
use crate::config::DistributeSettingsConfig;

#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    state: RwLock<PersistedSettings>,
    // Serializes file writes.
    write_lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    /// Load the document at `path`, creating it from config defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// first-run document cannot be written.
    pub async fn open(path: &Path, config: &DistributeSettingsConfig) -> anyhow::Result<Self> {
        let settings = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("invalid settings file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = PersistedSettings::from_config(config);
                write_document(path, &defaults).await?;
                tracing::info!(path = %path.display(), "created settings file with defaults");
                defaults
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        Ok(Self {
            path: path.to_owned(),
            state: RwLock::new(settings),
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn update(&self, apply: impl FnOnce(&mut PersistedSettings)) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut next = *self.state.read();
        apply(&mut next);
        write_document(&self.path, &next).await?;
        *self.state.write() = next;
        Ok(())
    }
}

async fn write_document(path: &Path, settings: &PersistedSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(settings).context("failed to encode settings")?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    fn update_track(&self) -> UpdateTrack {
        self.state.read().update_track
    }

    async fn set_update_track(&self, track: UpdateTrack) -> anyhow::Result<()> {
        self.update(|s| s.update_track = track).await
    }

    fn update_track_time(&self) -> UpdateTrackTime {
        self.state.read().update_track_time
    }

    async fn set_update_track_time(&self, time: UpdateTrackTime) -> anyhow::Result<()> {
        self.update(|s| s.update_track_time = time).await
    }

    fn feature_flag_default(&self) -> bool {
        self.state.read().feature_flag_default
    }
}
