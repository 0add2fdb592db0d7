use std::sync::Arc;

use distribute_settings_sdk::{
    EventFilterProvider, FeatureProvider, SettingsStore, UpdateTrack, UpdateTrackProvider,
    UpdateTrackTime,
};

use super::error::DomainError;
use super::lifecycle::EventFilterLifecycle;
use super::view::{PickerKind, SettingsView};

/// External capabilities the reconciler drives.
#[derive(Clone)]
pub struct Providers {
    /// The SDK as a whole. Feature toggles are only interactive while it is enabled.
    pub app: Arc<dyn FeatureProvider>,
    pub distribute: Arc<dyn FeatureProvider>,
    pub update_track: Arc<dyn UpdateTrackProvider>,
    pub push: Arc<dyn FeatureProvider>,
    pub event_filter: Option<Arc<dyn EventFilterProvider>>,
}

/// Result of committing a picker on blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Selection matched the persisted value; nothing was written.
    Unchanged,
    /// Persisted only; takes effect on the next app start.
    Deferred,
    /// Persisted and pushed to the live SDK.
    AppliedNow,
}

/// Keeps the settings view consistent with persisted values and live SDK state.
///
/// Every handler takes `&mut self`, so passes on one reconciler never overlap.
pub struct Reconciler {
    providers: Providers,
    store: Arc<dyn SettingsStore>,
    view: SettingsView,
    event_filter: EventFilterLifecycle,
}

impl Reconciler {
    #[must_use]
    pub fn new(providers: Providers, store: Arc<dyn SettingsStore>) -> Self {
        let view = SettingsView::new(
            store.update_track(),
            store.update_track_time(),
            store.feature_flag_default(),
        );
        Self {
            providers,
            store,
            view,
            event_filter: EventFilterLifecycle::default(),
        }
    }

    #[must_use]
    pub fn view(&self) -> &SettingsView {
        &self.view
    }

    #[must_use]
    pub fn event_filter_lifecycle(&self) -> EventFilterLifecycle {
        self.event_filter
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_view_activated(&mut self) {
        let app_enabled = query_enabled(self.providers.app.as_ref(), "app").await;
        self.refresh_distribute_enabled(app_enabled).await;
        self.refresh_push_enabled(app_enabled).await;
        self.refresh_event_filter(app_enabled).await;
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_distribute_toggled(&mut self, enabled: bool) {
        if !self.view.distribute.enabled {
            tracing::debug!("distribute toggle is disabled; ignoring");
            return;
        }
        if let Err(e) = self.providers.distribute.set_enabled(enabled).await {
            tracing::warn!(error = %e, "failed to change distribute enabled state");
        }
        let app_enabled = query_enabled(self.providers.app.as_ref(), "app").await;
        self.refresh_distribute_enabled(app_enabled).await;
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_push_toggled(&mut self, enabled: bool) {
        if !self.view.push.enabled {
            tracing::debug!("push toggle is disabled; ignoring");
            return;
        }
        if let Err(e) = self.providers.push.set_enabled(enabled).await {
            tracing::warn!(error = %e, "failed to change push enabled state");
        }
        let app_enabled = query_enabled(self.providers.app.as_ref(), "app").await;
        self.refresh_push_enabled(app_enabled).await;
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_event_filter_toggled(&mut self, enabled: bool) {
        let Some(filter) = self.providers.event_filter.clone() else {
            tracing::debug!("event filter not available; ignoring toggle");
            return;
        };
        if !self.view.event_filter.enabled {
            tracing::debug!("event filter toggle is disabled; ignoring");
            return;
        }
        if let Err(e) = self.event_filter.ensure_started(filter.as_ref()).await {
            tracing::warn!(error = %e, "failed to start event filter");
            return;
        }
        if let Err(e) = filter.set_enabled(enabled).await {
            tracing::warn!(error = %e, "failed to change event filter enabled state");
        }
        self.view.event_filter.on = query_enabled(filter.as_ref(), "event_filter").await;
    }

    /// Move the update track picker highlight. Nothing is persisted until blur.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PickerDisabled` while distribute is off and
    /// `DomainError::InvalidSelection` if `index` is not a choice.
    pub fn select_update_track(&mut self, index: usize) -> Result<(), DomainError> {
        self.select(PickerKind::UpdateTrack, index)
    }

    /// Move the update track time picker highlight. Nothing is persisted until blur.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PickerDisabled` while distribute is off and
    /// `DomainError::InvalidSelection` if `index` is not a choice.
    pub fn select_update_track_time(&mut self, index: usize) -> Result<(), DomainError> {
        self.select(PickerKind::UpdateTrackTime, index)
    }

    fn select(&mut self, kind: PickerKind, index: usize) -> Result<(), DomainError> {
        self.ensure_picker_enabled(kind)?;
        if self.view.picker_mut(kind).select(index) {
            Ok(())
        } else {
            Err(DomainError::invalid_selection(kind, index))
        }
    }

    fn ensure_picker_enabled(&self, kind: PickerKind) -> Result<(), DomainError> {
        if self.view.picker(kind).enabled {
            Ok(())
        } else {
            Err(DomainError::picker_disabled(kind))
        }
    }

    /// Commit the update track picker after it loses focus.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PickerDisabled` while distribute is off,
    /// `DomainError::InvalidSelection` for an unknown index and
    /// `DomainError::Persistence` if the store write fails.
    #[tracing::instrument(skip(self))]
    pub async fn on_update_track_blurred(
        &mut self,
        selected_index: usize,
    ) -> Result<CommitOutcome, DomainError> {
        self.ensure_picker_enabled(PickerKind::UpdateTrack)?;
        if selected_index == self.store.update_track().to_picker_index() {
            tracing::debug!("update track unchanged");
            return Ok(CommitOutcome::Unchanged);
        }
        let track = UpdateTrack::from_picker_index(selected_index).ok_or_else(|| {
            DomainError::invalid_selection(PickerKind::UpdateTrack, selected_index)
        })?;

        self.store.set_update_track(track).await?;
        tracing::info!(?track, "update track persisted");

        if self.store.update_track_time() == UpdateTrackTime::Now {
            self.providers.update_track.set_update_track(track);
            tracing::debug!(?track, "update track applied to sdk");
            Ok(CommitOutcome::AppliedNow)
        } else {
            Ok(CommitOutcome::Deferred)
        }
    }

    /// Commit the update track time picker after it loses focus.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PickerDisabled` while distribute is off,
    /// `DomainError::InvalidSelection` for an unknown index and
    /// `DomainError::Persistence` if the store write fails.
    #[tracing::instrument(skip(self))]
    pub async fn on_update_track_time_blurred(
        &mut self,
        selected_index: usize,
    ) -> Result<CommitOutcome, DomainError> {
        self.ensure_picker_enabled(PickerKind::UpdateTrackTime)?;
        if selected_index == self.store.update_track_time().to_picker_index() {
            tracing::debug!("update track time unchanged");
            return Ok(CommitOutcome::Unchanged);
        }
        let time = UpdateTrackTime::from_picker_index(selected_index).ok_or_else(|| {
            DomainError::invalid_selection(PickerKind::UpdateTrackTime, selected_index)
        })?;

        self.store.set_update_track_time(time).await?;
        tracing::info!(?time, "update track time persisted");

        if time == UpdateTrackTime::BeforeNextStart {
            return Ok(CommitOutcome::Deferred);
        }

        let track = self.store.update_track();
        self.providers.update_track.set_update_track(track);
        tracing::debug!(?track, "persisted update track applied to sdk");
        self.refresh_update_track_controls().await;
        Ok(CommitOutcome::AppliedNow)
    }

    /// Re-derive both track pickers from the live distribute state and the store.
    pub async fn refresh_update_track_controls(&mut self) {
        let distribute_enabled =
            query_enabled(self.providers.distribute.as_ref(), "distribute").await;
        self.apply_update_track_controls(distribute_enabled);
    }

    fn apply_update_track_controls(&mut self, distribute_enabled: bool) {
        if !distribute_enabled {
            self.view.update_track.enabled = false;
            self.view.update_track_time.enabled = false;
            return;
        }
        self.view.update_track.enabled = true;
        self.view.update_track.selected = self.store.update_track().to_picker_index();
        self.view.update_track_time.enabled = true;
        self.view.update_track_time.selected = self.store.update_track_time().to_picker_index();
    }

    // The toggle and the pickers share one query so they never disagree.
    async fn refresh_distribute_enabled(&mut self, app_enabled: bool) {
        let distribute_enabled =
            query_enabled(self.providers.distribute.as_ref(), "distribute").await;
        self.view.distribute.on = distribute_enabled;
        self.view.distribute.enabled = app_enabled;
        self.apply_update_track_controls(distribute_enabled);
    }

    async fn refresh_push_enabled(&mut self, app_enabled: bool) {
        self.view.push.on = query_enabled(self.providers.push.as_ref(), "push").await;
        self.view.push.enabled = app_enabled;
    }

    async fn refresh_event_filter(&mut self, app_enabled: bool) {
        let filter = self.providers.event_filter.clone();
        self.view.event_filter.on = match &filter {
            Some(filter) if self.event_filter.is_started() => {
                query_enabled(filter.as_ref(), "event_filter").await
            }
            _ => false,
        };
        self.view.event_filter.enabled = app_enabled && filter.is_some();
    }
}

/// A provider that cannot answer reads as disabled.
async fn query_enabled<P>(provider: &P, name: &'static str) -> bool
where
    P: FeatureProvider + ?Sized,
{
    match provider.is_enabled().await {
        Ok(enabled) => enabled,
        Err(e) => {
            tracing::warn!(
                provider = name,
                error = %e,
                "provider query failed; treating as disabled"
            );
            false
        }
    }
}
