//! Error types for the distribute-settings SDK.

use thiserror::Error;

/// Failure reported by an external capability provider.
///
/// The reconciler never surfaces these to the user: a failed query reads as
/// "disabled" and a failed write leaves state as last observed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider could not be reached or is not started.
    #[error("Provider unavailable: {message}")]
    Unavailable { message: String },

    /// The provider refused the requested change.
    #[error("Provider rejected request: {message}")]
    Rejected { message: String },
}

impl ProviderError {
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Public-facing error for settings operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid selection: {message}")]
    InvalidSelection { message: String },

    #[error("Settings could not be persisted")]
    Persistence,
}

impl SettingsError {
    #[must_use]
    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn persistence() -> Self {
        Self::Persistence
    }
}
