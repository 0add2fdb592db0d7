//! UI-facing projection of the distribute settings.
//!
//! Nothing here is persisted. The reconciler rebuilds these values from the
//! store and the live providers on every refresh.

use std::fmt;

use distribute_settings_sdk::{UpdateTrack, UpdateTrackTime};

/// On/off switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleControl {
    pub on: bool,
    /// Whether the user can flip the switch.
    pub enabled: bool,
}

/// Drop-down list with ordered string choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerControl {
    pub choices: Vec<String>,
    pub selected: usize,
    pub enabled: bool,
}

impl PickerControl {
    #[must_use]
    pub fn new(choices: Vec<String>, selected: usize) -> Self {
        Self {
            choices,
            selected,
            enabled: false,
        }
    }

    /// Move the highlighted choice. Returns `false` when the picker is
    /// disabled or `index` is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if !self.enabled || index >= self.choices.len() {
            return false;
        }
        self.selected = index;
        true
    }

    #[must_use]
    pub fn selected_choice(&self) -> Option<&str> {
        self.choices.get(self.selected).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    UpdateTrack,
    UpdateTrackTime,
}

impl fmt::Display for PickerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateTrack => f.write_str("update track"),
            Self::UpdateTrackTime => f.write_str("update track time"),
        }
    }
}

/// Relationship between the distribute flag and the track pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackControlState {
    Disabled,
    EnabledChannelEditable,
}

/// Full settings screen state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub distribute: ToggleControl,
    pub push: ToggleControl,
    pub event_filter: ToggleControl,
    pub update_track: PickerControl,
    pub update_track_time: PickerControl,
}

impl SettingsView {
    /// Initial state before any live query: pickers show the persisted
    /// choices and stay disabled until the first refresh.
    #[must_use]
    pub fn new(track: UpdateTrack, time: UpdateTrackTime, distribute_on: bool) -> Self {
        Self {
            distribute: ToggleControl {
                on: distribute_on,
                enabled: false,
            },
            push: ToggleControl::default(),
            event_filter: ToggleControl::default(),
            update_track: PickerControl::new(
                UpdateTrack::choice_strings(),
                track.to_picker_index(),
            ),
            update_track_time: PickerControl::new(
                UpdateTrackTime::choice_strings(),
                time.to_picker_index(),
            ),
        }
    }

    #[must_use]
    pub fn track_control_state(&self) -> TrackControlState {
        if self.update_track.enabled {
            TrackControlState::EnabledChannelEditable
        } else {
            TrackControlState::Disabled
        }
    }

    #[must_use]
    pub fn picker(&self, kind: PickerKind) -> &PickerControl {
        match kind {
            PickerKind::UpdateTrack => &self.update_track,
            PickerKind::UpdateTrackTime => &self.update_track_time,
        }
    }

    pub(crate) fn picker_mut(&mut self, kind: PickerKind) -> &mut PickerControl {
        match kind {
            PickerKind::UpdateTrack => &mut self.update_track,
            PickerKind::UpdateTrackTime => &mut self.update_track_time,
        }
    }
}
