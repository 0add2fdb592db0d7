//! One-shot start of the optional event filter service.

use distribute_settings_sdk::{EventFilterProvider, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilterLifecycle {
    #[default]
    Uninitialized,
    Started,
}

impl EventFilterLifecycle {
    #[must_use]
    pub fn is_started(self) -> bool {
        self == Self::Started
    }

    /// Start the filter if it has not been started yet.
    ///
    /// The state only moves to `Started` when `start` succeeds, so a failed
    /// start is attempted again on the next call.
    ///
    /// # Errors
    ///
    /// Returns the provider error if starting fails.
    pub async fn ensure_started(
        &mut self,
        filter: &dyn EventFilterProvider,
    ) -> Result<(), ProviderError> {
        if self.is_started() {
            return Ok(());
        }
        filter.start().await?;
        *self = Self::Started;
        tracing::info!("event filter started");
        Ok(())
    }
}
