//! Ethereum infrastructure - Alloy provider implementation

mod provider;
mod types;

pub use provider::{create_provider, AlloyProvider, ContractProvider, ProviderConfig};
pub use types::{CallRequest, ProviderError, SignerHandle};
