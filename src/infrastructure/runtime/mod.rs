//! Runtime infrastructure - Tokio runtime bridge for provider operations

mod bridge;
mod worker;

pub use bridge::{Operation, ProviderSource, RuntimeBridge, RuntimeCommand, RuntimeEvent};
