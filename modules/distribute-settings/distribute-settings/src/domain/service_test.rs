#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use distribute_settings_sdk::{SettingsStore, UpdateTrack, UpdateTrackTime};
    use tracing_test::traced_test;

    use crate::domain::events::{SettingsEvent, SettingsViewHandle};
    use crate::domain::service::{CommitOutcome, Providers, Reconciler};
    use crate::domain::view::TrackControlState;
    use crate::infra::providers::{
        InMemoryEventFilter, InMemoryFeatureProvider, InMemoryUpdateTrackProvider, WritePolicy,
    };
    use crate::infra::storage::{InMemorySettingsStore, PersistedSettings};

    use super::super::*;

    const PUBLIC: usize = 0;
    const PRIVATE: usize = 1;
    const NOW: usize = 0;
    const BEFORE_NEXT_START: usize = 1;

    struct Fixture {
        app: Arc<InMemoryFeatureProvider>,
        distribute: Arc<InMemoryFeatureProvider>,
        push: Arc<InMemoryFeatureProvider>,
        track: Arc<InMemoryUpdateTrackProvider>,
        filter: Option<Arc<InMemoryEventFilter>>,
        store: Arc<InMemorySettingsStore>,
    }

    impl Fixture {
        fn new(distribute_enabled: bool, track: UpdateTrack, time: UpdateTrackTime) -> Self {
            Self {
                app: Arc::new(InMemoryFeatureProvider::new(true)),
                distribute: Arc::new(InMemoryFeatureProvider::new(distribute_enabled)),
                push: Arc::new(InMemoryFeatureProvider::new(false)),
                track: Arc::new(InMemoryUpdateTrackProvider::default()),
                filter: None,
                store: Arc::new(InMemorySettingsStore::new(PersistedSettings {
                    update_track: track,
                    update_track_time: time,
                    feature_flag_default: true,
                })),
            }
        }

        fn with_event_filter(mut self) -> Self {
            self.filter = Some(Arc::new(InMemoryEventFilter::new()));
            self
        }

        fn providers(&self) -> Providers {
            Providers {
                app: self.app.clone(),
                distribute: self.distribute.clone(),
                update_track: self.track.clone(),
                push: self.push.clone(),
                event_filter: self
                    .filter
                    .clone()
                    .map(|f| f as Arc<dyn distribute_settings_sdk::EventFilterProvider>),
            }
        }

        fn reconciler(&self) -> Reconciler {
            Reconciler::new(self.providers(), self.store.clone())
        }
    }

    // Store whose writes always fail
    struct ReadOnlyStore;

    #[async_trait]
    impl SettingsStore for ReadOnlyStore {
        fn update_track(&self) -> UpdateTrack {
            UpdateTrack::Public
        }

        async fn set_update_track(&self, _track: UpdateTrack) -> anyhow::Result<()> {
            anyhow::bail!("read-only")
        }

        fn update_track_time(&self) -> UpdateTrackTime {
            UpdateTrackTime::Now
        }

        async fn set_update_track_time(&self, _time: UpdateTrackTime) -> anyhow::Result<()> {
            anyhow::bail!("read-only")
        }

        fn feature_flag_default(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_new_builds_view_from_store() {
        let fx = Fixture::new(true, UpdateTrack::Private, UpdateTrackTime::Now);

        let reconciler = fx.reconciler();
        let view = reconciler.view();

        assert_eq!(view.update_track.selected, PRIVATE);
        assert_eq!(view.update_track_time.selected, NOW);
        assert!(view.distribute.on);
        assert_eq!(view.track_control_state(), TrackControlState::Disabled);
    }

    #[tokio::test]
    async fn test_activation_with_distribute_disabled_disables_pickers() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;
        reconciler.select_update_track(PRIVATE).unwrap();
        fx.distribute.force_enabled(false);

        reconciler.on_view_activated().await;

        let view = reconciler.view();
        assert!(!view.distribute.on);
        assert!(view.distribute.enabled);
        assert!(!view.update_track.enabled);
        assert!(!view.update_track_time.enabled);
        // Selections are left alone while disabled
        assert_eq!(view.update_track.selected, PRIVATE);
        assert_eq!(view.update_track_time.selected, NOW);
    }

    #[tokio::test]
    async fn test_activation_with_distribute_enabled_shows_persisted_values() {
        let fx = Fixture::new(true, UpdateTrack::Private, UpdateTrackTime::BeforeNextStart);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;
        reconciler.select_update_track(PUBLIC).unwrap();

        reconciler.on_view_activated().await;

        let view = reconciler.view();
        assert!(view.distribute.on);
        assert_eq!(
            view.track_control_state(),
            TrackControlState::EnabledChannelEditable
        );
        assert!(view.update_track_time.enabled);
        assert_eq!(view.update_track.selected, PRIVATE);
        assert_eq!(view.update_track_time.selected, BEFORE_NEXT_START);
    }

    #[tokio::test]
    async fn test_activation_with_sdk_disabled_locks_toggles() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now).with_event_filter();
        fx.app.force_enabled(false);
        let mut reconciler = fx.reconciler();

        reconciler.on_view_activated().await;

        let view = reconciler.view();
        assert!(!view.distribute.enabled);
        assert!(!view.push.enabled);
        assert!(!view.event_filter.enabled);
        // Pickers follow distribute, not the sdk
        assert!(view.update_track.enabled);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unavailable_provider_reads_as_disabled() {
        let mut fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        fx.distribute = Arc::new(InMemoryFeatureProvider::unavailable());
        let mut reconciler = fx.reconciler();

        reconciler.on_view_activated().await;

        assert!(!reconciler.view().distribute.on);
        assert!(!reconciler.view().update_track.enabled);
        assert!(logs_contain("treating as disabled"));
    }

    #[tokio::test]
    async fn test_track_change_with_timing_now_applies_immediately() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        let outcome = reconciler.on_update_track_blurred(PRIVATE).await.unwrap();

        assert_eq!(outcome, CommitOutcome::AppliedNow);
        assert_eq!(fx.store.update_track(), UpdateTrack::Private);
        assert_eq!(fx.track.current(), Some(UpdateTrack::Private));
    }

    #[tokio::test]
    async fn test_track_change_before_next_start_is_only_persisted() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::BeforeNextStart);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        let outcome = reconciler.on_update_track_blurred(PRIVATE).await.unwrap();

        assert_eq!(outcome, CommitOutcome::Deferred);
        assert_eq!(fx.store.update_track(), UpdateTrack::Private);
        assert_eq!(fx.track.current(), None);
    }

    #[tokio::test]
    async fn test_repeated_blur_with_same_index_writes_once() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        reconciler.on_update_track_blurred(PRIVATE).await.unwrap();
        let second = reconciler.on_update_track_blurred(PRIVATE).await.unwrap();

        assert_eq!(second, CommitOutcome::Unchanged);
        assert_eq!(fx.store.write_count(), 1);
        assert_eq!(fx.track.pushes(), vec![UpdateTrack::Private]);
    }

    #[tokio::test]
    async fn test_timing_switch_to_now_pushes_persisted_track() {
        let fx = Fixture::new(true, UpdateTrack::Private, UpdateTrackTime::BeforeNextStart);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;
        // Browsing the track picker without committing
        reconciler.select_update_track(PUBLIC).unwrap();

        let outcome = reconciler.on_update_track_time_blurred(NOW).await.unwrap();

        assert_eq!(outcome, CommitOutcome::AppliedNow);
        assert_eq!(fx.store.update_track_time(), UpdateTrackTime::Now);
        assert_eq!(fx.track.current(), Some(UpdateTrack::Private));
        assert_eq!(reconciler.view().update_track.selected, PRIVATE);
        assert_eq!(reconciler.view().update_track_time.selected, NOW);
    }

    #[tokio::test]
    async fn test_timing_switch_to_before_next_start_does_not_push() {
        let fx = Fixture::new(true, UpdateTrack::Private, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        let outcome = reconciler
            .on_update_track_time_blurred(BEFORE_NEXT_START)
            .await
            .unwrap();

        assert_eq!(outcome, CommitOutcome::Deferred);
        assert_eq!(
            fx.store.update_track_time(),
            UpdateTrackTime::BeforeNextStart
        );
        assert!(fx.track.pushes().is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_timing_is_a_no_op() {
        let fx = Fixture::new(true, UpdateTrack::Private, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        let outcome = reconciler.on_update_track_time_blurred(NOW).await.unwrap();

        assert_eq!(outcome, CommitOutcome::Unchanged);
        assert_eq!(fx.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_index_is_rejected_without_writing() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        let track_err = reconciler.on_update_track_blurred(9).await.unwrap_err();
        let time_err = reconciler.on_update_track_time_blurred(9).await.unwrap_err();
        let select_err = reconciler.select_update_track(2).unwrap_err();

        assert!(matches!(track_err, error::DomainError::InvalidSelection { .. }));
        assert!(matches!(time_err, error::DomainError::InvalidSelection { .. }));
        assert!(matches!(
            select_err,
            error::DomainError::InvalidSelection {
                picker: view::PickerKind::UpdateTrack,
                index: 2
            }
        ));
        assert_eq!(fx.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_and_nothing_is_pushed() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = Reconciler::new(fx.providers(), Arc::new(ReadOnlyStore));
        reconciler.on_view_activated().await;

        let err = reconciler.on_update_track_blurred(PRIVATE).await.unwrap_err();

        assert!(matches!(err, error::DomainError::Persistence(_)));
        assert!(fx.track.pushes().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_off_disables_pickers_and_keeps_selections() {
        let fx = Fixture::new(true, UpdateTrack::Private, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        reconciler.on_distribute_toggled(false).await;

        let view = reconciler.view();
        assert!(!fx.distribute.current());
        assert!(!view.distribute.on);
        assert!(!view.update_track.enabled);
        assert!(!view.update_track_time.enabled);
        assert_eq!(view.update_track.selected, PRIVATE);
        assert_eq!(view.update_track_time.selected, NOW);
    }

    #[tokio::test]
    async fn test_toggle_on_enables_pickers_with_persisted_values() {
        let fx = Fixture::new(true, UpdateTrack::Private, UpdateTrackTime::BeforeNextStart);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;
        reconciler.select_update_track(PUBLIC).unwrap();
        fx.distribute.force_enabled(false);
        reconciler.on_view_activated().await;

        reconciler.on_distribute_toggled(true).await;

        let view = reconciler.view();
        assert!(view.distribute.on);
        assert!(view.update_track.enabled);
        assert_eq!(view.update_track.selected, PRIVATE);
        assert_eq!(view.update_track_time.selected, BEFORE_NEXT_START);
    }

    #[tokio::test]
    async fn test_toggle_observes_live_state_after_silent_rejection() {
        let fx = Fixture::new(false, UpdateTrack::Public, UpdateTrackTime::Now);
        fx.distribute.set_write_policy(WritePolicy::IgnoreSilently);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        reconciler.on_distribute_toggled(true).await;

        assert_eq!(fx.distribute.set_calls(), 1);
        assert!(!reconciler.view().distribute.on);
        assert!(!reconciler.view().update_track.enabled);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_rejected_toggle_is_logged_not_surfaced() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        fx.distribute.set_write_policy(WritePolicy::Reject);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        reconciler.on_distribute_toggled(false).await;

        assert!(reconciler.view().distribute.on);
        assert!(reconciler.view().update_track.enabled);
        assert!(logs_contain("failed to change distribute enabled state"));
    }

    #[tokio::test]
    async fn test_pickers_track_last_observed_distribute_state() {
        let fx = Fixture::new(false, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();

        for live in [true, false, false, true, true, false, true] {
            fx.distribute.force_enabled(live);
            reconciler.refresh_update_track_controls().await;

            let view = reconciler.view();
            assert_eq!(view.update_track.enabled, live);
            assert_eq!(view.update_track_time.enabled, live);
            if live {
                assert_eq!(
                    view.update_track.selected,
                    fx.store.update_track().to_picker_index()
                );
            }
        }
    }

    #[tokio::test]
    async fn test_push_toggle_mirrors_live_state() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;
        assert!(!reconciler.view().push.on);

        reconciler.on_push_toggled(true).await;

        assert!(fx.push.current());
        assert!(reconciler.view().push.on);
        assert!(reconciler.view().push.enabled);
    }

    #[tokio::test]
    async fn test_missing_event_filter_is_never_touched() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        reconciler.on_event_filter_toggled(true).await;

        let view = reconciler.view();
        assert!(!view.event_filter.on);
        assert!(!view.event_filter.enabled);
        assert_eq!(
            reconciler.event_filter_lifecycle(),
            lifecycle::EventFilterLifecycle::Uninitialized
        );
    }

    #[tokio::test]
    async fn test_event_filter_is_started_once() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now).with_event_filter();
        let filter = fx.filter.clone().unwrap();
        let mut reconciler = fx.reconciler();

        reconciler.on_view_activated().await;
        assert!(reconciler.view().event_filter.enabled);
        assert!(!reconciler.view().event_filter.on);

        reconciler.on_event_filter_toggled(true).await;
        reconciler.on_event_filter_toggled(false).await;
        reconciler.on_event_filter_toggled(true).await;

        assert_eq!(filter.start_calls(), 1);
        assert!(reconciler.event_filter_lifecycle().is_started());
        assert!(reconciler.view().event_filter.on);

        reconciler.on_view_activated().await;
        assert!(reconciler.view().event_filter.on);
    }

    #[tokio::test]
    async fn test_failed_event_filter_start_is_retried() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now).with_event_filter();
        let filter = fx.filter.clone().unwrap();
        filter.set_fail_start(true);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        reconciler.on_event_filter_toggled(true).await;
        assert!(!reconciler.event_filter_lifecycle().is_started());

        filter.set_fail_start(false);
        reconciler.on_event_filter_toggled(true).await;

        assert_eq!(filter.start_calls(), 2);
        assert!(reconciler.event_filter_lifecycle().is_started());
    }

    #[tokio::test]
    async fn test_edits_while_distribute_disabled_change_nothing() {
        let fx = Fixture::new(false, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        let select_err = reconciler.select_update_track(PRIVATE).unwrap_err();
        let time_select_err = reconciler
            .select_update_track_time(BEFORE_NEXT_START)
            .unwrap_err();
        let track_err = reconciler.on_update_track_blurred(PRIVATE).await.unwrap_err();
        let time_err = reconciler
            .on_update_track_time_blurred(BEFORE_NEXT_START)
            .await
            .unwrap_err();

        assert!(matches!(
            select_err,
            error::DomainError::PickerDisabled {
                picker: view::PickerKind::UpdateTrack
            }
        ));
        assert!(matches!(
            time_select_err,
            error::DomainError::PickerDisabled {
                picker: view::PickerKind::UpdateTrackTime
            }
        ));
        assert!(matches!(track_err, error::DomainError::PickerDisabled { .. }));
        assert!(matches!(time_err, error::DomainError::PickerDisabled { .. }));
        assert_eq!(fx.store.write_count(), 0);
        assert!(fx.track.pushes().is_empty());
        assert_eq!(reconciler.view().update_track.selected, PUBLIC);
        assert_eq!(reconciler.view().update_track_time.selected, NOW);
    }

    #[tokio::test]
    async fn test_timing_blur_while_disabled_does_not_push_track() {
        let fx = Fixture::new(true, UpdateTrack::Private, UpdateTrackTime::BeforeNextStart);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;
        reconciler.on_distribute_toggled(false).await;

        let err = reconciler.on_update_track_time_blurred(NOW).await.unwrap_err();

        assert!(matches!(err, error::DomainError::PickerDisabled { .. }));
        assert_eq!(
            fx.store.update_track_time(),
            UpdateTrackTime::BeforeNextStart
        );
        assert_eq!(fx.track.current(), None);
    }

    #[tokio::test]
    async fn test_commits_follow_observed_distribute_state() {
        let fx = Fixture::new(false, UpdateTrack::Public, UpdateTrackTime::Now);
        let mut reconciler = fx.reconciler();
        let mut expected_writes = 0;

        for (live, index) in [
            (false, PRIVATE),
            (true, PRIVATE),
            (false, PUBLIC),
            (false, PUBLIC),
            (true, PUBLIC),
            (true, PRIVATE),
            (false, PUBLIC),
        ] {
            fx.distribute.force_enabled(live);
            reconciler.on_view_activated().await;
            let before = fx.store.update_track();

            let result = reconciler.on_update_track_blurred(index).await;

            if live {
                if index != before.to_picker_index() {
                    expected_writes += 1;
                }
                assert!(result.is_ok());
                assert_eq!(fx.store.update_track().to_picker_index(), index);
            } else {
                assert!(result.is_err());
                assert_eq!(fx.store.update_track(), before);
            }
            assert_eq!(fx.store.write_count(), expected_writes);
            assert_eq!(fx.track.pushes().len(), expected_writes);
        }
    }

    #[tokio::test]
    async fn test_toggles_ignored_while_sdk_disabled() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now).with_event_filter();
        let filter = fx.filter.clone().unwrap();
        fx.app.force_enabled(false);
        let mut reconciler = fx.reconciler();
        reconciler.on_view_activated().await;

        reconciler.on_distribute_toggled(false).await;
        reconciler.on_push_toggled(true).await;
        reconciler.on_event_filter_toggled(true).await;

        assert_eq!(fx.distribute.set_calls(), 0);
        assert_eq!(fx.push.set_calls(), 0);
        assert_eq!(filter.start_calls(), 0);
        assert!(fx.distribute.current());
        assert!(reconciler.view().distribute.on);
        assert!(!reconciler.event_filter_lifecycle().is_started());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_event_loop_logs_persistence_cause() {
        let fx = Fixture::new(true, UpdateTrack::Public, UpdateTrackTime::Now);
        let reconciler = Reconciler::new(fx.providers(), Arc::new(ReadOnlyStore));
        let handle = SettingsViewHandle::spawn(reconciler, 4);

        handle.dispatch(SettingsEvent::ViewActivated).await.unwrap();
        handle
            .dispatch(SettingsEvent::UpdateTrackSelected(PRIVATE))
            .await
            .unwrap();
        let err = handle
            .dispatch(SettingsEvent::UpdateTrackBlurred)
            .await
            .unwrap_err();
        handle.close().await.unwrap();

        assert!(matches!(
            err,
            crate::domain::events::DispatchError::Settings(
                distribute_settings_sdk::SettingsError::Persistence
            )
        ));
        assert!(logs_contain("settings event failed"));
        assert!(logs_contain("read-only"));
    }
}
