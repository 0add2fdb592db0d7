pub mod error;
pub mod events;
pub mod lifecycle;
pub mod service;
pub mod view;

#[cfg(test)]
mod service_test;
