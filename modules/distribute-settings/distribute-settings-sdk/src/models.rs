//! Public models for the distribute-settings module.
//!
//! Both enums are shown to the user through selection pickers, so each one
//! carries a fixed choice order and a mapping between variants and picker
//! indices.

use serde::{Deserialize, Serialize};

/// Release track updates are delivered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTrack {
    Public,
    Private,
}

impl UpdateTrack {
    /// Picker order.
    pub const ALL: [Self; 2] = [Self::Public, Self::Private];

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }

    /// Numeric value used by the distribution SDK (`Public = 1`, `Private = 2`).
    #[must_use]
    pub fn sdk_value(self) -> u8 {
        match self {
            Self::Public => 1,
            Self::Private => 2,
        }
    }

    /// Picker index is the SDK value shifted to start at zero.
    #[must_use]
    pub fn to_picker_index(self) -> usize {
        usize::from(self.sdk_value() - 1)
    }

    #[must_use]
    pub fn from_picker_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display strings in picker order.
    #[must_use]
    pub fn choice_strings() -> Vec<String> {
        Self::ALL
            .iter()
            .map(|track| track.display_name().to_owned())
            .collect()
    }
}

/// When a track change takes live effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTrackTime {
    /// Push the new track to the SDK as soon as it is committed.
    Now,
    /// Only persist; the SDK picks the track up on the next app start.
    BeforeNextStart,
}

impl UpdateTrackTime {
    /// Picker order.
    pub const ALL: [Self; 2] = [Self::Now, Self::BeforeNextStart];

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Now => "Now",
            Self::BeforeNextStart => "Before next start",
        }
    }

    #[must_use]
    pub fn to_picker_index(self) -> usize {
        match self {
            Self::Now => 0,
            Self::BeforeNextStart => 1,
        }
    }

    #[must_use]
    pub fn from_picker_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn choice_strings() -> Vec<String> {
        Self::ALL
            .iter()
            .map(|time| time.display_name().to_owned())
            .collect()
    }
}
