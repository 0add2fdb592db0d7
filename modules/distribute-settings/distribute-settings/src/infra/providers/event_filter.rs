use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use distribute_settings_sdk::{EventFilterProvider, FeatureProvider, ProviderError};

use super::feature::InMemoryFeatureProvider;

/// Event filter that refuses to answer until started.
#[derive(Debug)]
pub struct InMemoryEventFilter {
    feature: InMemoryFeatureProvider,
    started: AtomicBool,
    start_calls: AtomicUsize,
    fail_start: AtomicBool,
}

impl Default for InMemoryEventFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventFilter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            feature: InMemoryFeatureProvider::new(false),
            started: AtomicBool::new(false),
            start_calls: AtomicUsize::new(0),
            fail_start: AtomicBool::new(false),
        }
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn check_started(&self) -> Result<(), ProviderError> {
        if self.is_started() {
            Ok(())
        } else {
            Err(ProviderError::unavailable("event filter not started"))
        }
    }
}

#[async_trait]
impl FeatureProvider for InMemoryEventFilter {
    async fn is_enabled(&self) -> Result<bool, ProviderError> {
        self.check_started()?;
        self.feature.is_enabled().await
    }

    async fn set_enabled(&self, enabled: bool) -> Result<(), ProviderError> {
        self.check_started()?;
        self.feature.set_enabled(enabled).await
    }
}

#[async_trait]
impl EventFilterProvider for InMemoryEventFilter {
    async fn start(&self) -> Result<(), ProviderError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(ProviderError::unavailable("event filter failed to start"));
        }
        self.started.store(true, Ordering::SeqCst);
        // Enabled by default once started.
        self.feature.force_enabled(true);
        Ok(())
    }
}
