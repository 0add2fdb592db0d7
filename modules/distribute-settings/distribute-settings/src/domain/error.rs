use distribute_settings_sdk::SettingsError;

use super::view::PickerKind;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Index {index} is not a valid {picker} choice")]
    InvalidSelection { picker: PickerKind, index: usize },

    #[error("The {picker} picker is disabled")]
    PickerDisabled { picker: PickerKind },

    #[error("Persistence error: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl DomainError {
    pub fn invalid_selection(picker: PickerKind, index: usize) -> Self {
        Self::InvalidSelection { picker, index }
    }

    pub fn picker_disabled(picker: PickerKind) -> Self {
        Self::PickerDisabled { picker }
    }
}

impl From<DomainError> for SettingsError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidSelection { picker, index } => {
                Self::invalid_selection(format!("{picker}: {index}"))
            }
            DomainError::PickerDisabled { picker } => {
                Self::invalid_selection(format!("{picker} picker is disabled"))
            }
            DomainError::Persistence(_) => Self::persistence(),
        }
    }
}
