//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Built-in standards, interface JSON loading and ABI directory scanning
//! - The Alloy-backed contract provider
//! - Tokio runtime bridge for async operations

pub mod abi;
pub mod ethereum;
pub mod runtime;

pub use abi::AbiScanner;
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
