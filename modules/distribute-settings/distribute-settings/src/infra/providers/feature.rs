use async_trait::async_trait;
use distribute_settings_sdk::{FeatureProvider, ProviderError};
use parking_lot::Mutex;

/// How a provider answers `set_enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    #[default]
    Accept,
    /// Report success but keep the old state.
    IgnoreSilently,
    /// Fail with `ProviderError::Rejected`.
    Reject,
}

#[derive(Debug)]
struct FeatureState {
    enabled: bool,
    available: bool,
    writes: WritePolicy,
    set_calls: usize,
}

#[derive(Debug)]
pub struct InMemoryFeatureProvider {
    state: Mutex<FeatureState>,
}

impl InMemoryFeatureProvider {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            state: Mutex::new(FeatureState {
                enabled,
                available: true,
                writes: WritePolicy::Accept,
                set_calls: 0,
            }),
        }
    }

    /// A provider whose every call fails with `ProviderError::Unavailable`.
    #[must_use]
    pub fn unavailable() -> Self {
        let provider = Self::new(false);
        provider.set_available(false);
        provider
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    pub fn set_write_policy(&self, policy: WritePolicy) {
        self.state.lock().writes = policy;
    }

    /// Change the live state behind the reconciler's back.
    pub fn force_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    #[must_use]
    pub fn current(&self) -> bool {
        self.state.lock().enabled
    }

    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.state.lock().set_calls
    }
}

#[async_trait]
impl FeatureProvider for InMemoryFeatureProvider {
    async fn is_enabled(&self) -> Result<bool, ProviderError> {
        let state = self.state.lock();
        if !state.available {
            return Err(ProviderError::unavailable("feature provider is offline"));
        }
        Ok(state.enabled)
    }

    async fn set_enabled(&self, enabled: bool) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.set_calls += 1;
        if !state.available {
            return Err(ProviderError::unavailable("feature provider is offline"));
        }
        match state.writes {
            WritePolicy::Accept => {
                state.enabled = enabled;
                Ok(())
            }
            WritePolicy::IgnoreSilently => Ok(()),
            WritePolicy::Reject => Err(ProviderError::rejected("change not permitted")),
        }
    }
}
