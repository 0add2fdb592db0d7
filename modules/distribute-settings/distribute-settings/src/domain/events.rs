//! Single-flow event queue for one settings view.
//!
//! UI events are queued on a bounded channel and handled one at a time by a
//! task that owns the `Reconciler`. A handler runs to completion, provider
//! calls included, before the next event is taken off the queue. The view is
//! republished on a `watch` channel after every event.

use anyhow::Context;
use distribute_settings_sdk::SettingsError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::error::DomainError;
use super::service::Reconciler;
use super::view::SettingsView;

/// Events a host view forwards to the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    ViewActivated,
    DistributeToggled(bool),
    PushToggled(bool),
    EventFilterToggled(bool),
    /// The user highlighted a track while browsing the picker.
    UpdateTrackSelected(usize),
    /// The track picker lost focus; commits the highlighted track.
    UpdateTrackBlurred,
    UpdateTrackTimeSelected(usize),
    UpdateTrackTimeBlurred,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("settings event loop has stopped")]
    Closed,

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl Reconciler {
    /// Route one event to its handler.
    ///
    /// # Errors
    ///
    /// Propagates errors from the picker handlers.
    pub async fn handle(&mut self, event: SettingsEvent) -> Result<(), DomainError> {
        match event {
            SettingsEvent::ViewActivated => self.on_view_activated().await,
            SettingsEvent::DistributeToggled(on) => self.on_distribute_toggled(on).await,
            SettingsEvent::PushToggled(on) => self.on_push_toggled(on).await,
            SettingsEvent::EventFilterToggled(on) => self.on_event_filter_toggled(on).await,
            SettingsEvent::UpdateTrackSelected(index) => self.select_update_track(index)?,
            SettingsEvent::UpdateTrackBlurred => {
                let index = self.view().update_track.selected;
                self.on_update_track_blurred(index).await?;
            }
            SettingsEvent::UpdateTrackTimeSelected(index) => {
                self.select_update_track_time(index)?;
            }
            SettingsEvent::UpdateTrackTimeBlurred => {
                let index = self.view().update_track_time.selected;
                self.on_update_track_time_blurred(index).await?;
            }
        }
        Ok(())
    }
}

type Reply = oneshot::Sender<Result<(), SettingsError>>;

/// Handle to a running settings event loop.
///
/// Dropping the handle closes the queue; the loop finishes the event in
/// flight and stops.
pub struct SettingsViewHandle {
    events: mpsc::Sender<(SettingsEvent, Option<Reply>)>,
    view: watch::Receiver<SettingsView>,
    task: JoinHandle<Reconciler>,
}

impl SettingsViewHandle {
    /// Spawn the loop on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(reconciler: Reconciler, capacity: usize) -> Self {
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let (view_tx, view_rx) = watch::channel(reconciler.view().clone());
        let task = tokio::spawn(run(reconciler, events_rx, view_tx).in_current_span());
        Self {
            events: events_tx,
            view: view_rx,
            task,
        }
    }

    /// Queue an event without waiting for it. Handler errors are logged.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Closed` if the loop has stopped.
    pub async fn send(&self, event: SettingsEvent) -> Result<(), DispatchError> {
        self.events
            .send((event, None))
            .await
            .map_err(|_| DispatchError::Closed)
    }

    /// Queue an event and wait until it has been handled.
    ///
    /// # Errors
    ///
    /// Returns the handler's error, or `DispatchError::Closed` if the loop
    /// has stopped.
    pub async fn dispatch(&self, event: SettingsEvent) -> Result<(), DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.events
            .send((event, Some(reply_tx)))
            .await
            .map_err(|_| DispatchError::Closed)?;
        reply_rx.await.map_err(|_| DispatchError::Closed)??;
        Ok(())
    }

    /// Latest published view.
    #[must_use]
    pub fn view(&self) -> SettingsView {
        self.view.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SettingsView> {
        self.view.clone()
    }

    /// Close the queue, drain pending events and hand the reconciler back.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop task panicked.
    pub async fn close(self) -> anyhow::Result<Reconciler> {
        drop(self.events);
        self.task.await.context("settings event loop panicked")
    }
}

async fn run(
    mut reconciler: Reconciler,
    mut events: mpsc::Receiver<(SettingsEvent, Option<Reply>)>,
    view: watch::Sender<SettingsView>,
) -> Reconciler {
    while let Some((event, reply)) = events.recv().await {
        let result = reconciler.handle(event).await;
        if let Err(e) = &result {
            tracing::error!(?event, error = %e, "settings event failed");
        }
        let result = result.map_err(SettingsError::from);
        view.send_replace(reconciler.view().clone());
        if let Some(reply) = reply
            && reply.send(result).is_err()
        {
            tracing::debug!(?event, "dispatch caller stopped waiting");
        }
    }
    tracing::debug!("settings event loop stopped");
    reconciler
}
