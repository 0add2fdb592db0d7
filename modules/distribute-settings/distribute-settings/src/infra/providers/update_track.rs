use distribute_settings_sdk::{UpdateTrack, UpdateTrackProvider};
use parking_lot::Mutex;

/// Live update track property. `None` until something is pushed.
#[derive(Debug, Default)]
pub struct InMemoryUpdateTrackProvider {
    current: Mutex<Option<UpdateTrack>>,
    pushes: Mutex<Vec<UpdateTrack>>,
}

impl InMemoryUpdateTrackProvider {
    #[must_use]
    pub fn new(initial: Option<UpdateTrack>) -> Self {
        Self {
            current: Mutex::new(initial),
            pushes: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<UpdateTrack> {
        *self.current.lock()
    }

    /// Every value pushed, oldest first.
    #[must_use]
    pub fn pushes(&self) -> Vec<UpdateTrack> {
        self.pushes.lock().clone()
    }
}

impl UpdateTrackProvider for InMemoryUpdateTrackProvider {
    fn set_update_track(&self, track: UpdateTrack) {
        *self.current.lock() = Some(track);
        self.pushes.lock().push(track);
    }
}
