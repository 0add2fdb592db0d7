//! In-process provider implementations.
//!
//! Hosts without SDK bindings (headless runs, tests) use these to stand in
//! for the live SDK. Each one records what it was asked to do.

pub mod event_filter;
pub mod feature;
pub mod update_track;

pub use event_filter::InMemoryEventFilter;
pub use feature::{InMemoryFeatureProvider, WritePolicy};
pub use update_track::InMemoryUpdateTrackProvider;
