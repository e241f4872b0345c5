//! Contract provider abstraction and the Alloy implementation

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use tracing::{debug, info};

use super::types::{CallRequest, ProviderError, SignerHandle};
use crate::domain::abi::FunctionSignature;
use crate::modules::toolkit::result::ResultValue;

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
}

impl ProviderConfig {
    /// Pick the transport from the URL scheme
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("ws://") || url.starts_with("wss://") {
            ProviderConfig::WebSocket(url.to_string())
        } else {
            ProviderConfig::Http(url.to_string())
        }
    }

    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
        }
    }

    /// Check if this is a WebSocket endpoint
    pub fn is_websocket(&self) -> bool {
        matches!(self, ProviderConfig::WebSocket(_))
    }
}

/// Signing and broadcast seam
///
/// The workbench only ever talks to this trait; tests plug in a mock.
#[async_trait::async_trait]
pub trait ContractProvider: Send + Sync + 'static {
    /// Resolve the signing account and the chain it is on
    async fn connect(&self) -> Result<SignerHandle, ProviderError>;

    /// Broadcast a state-changing call and wait for it to be mined
    async fn send_transaction(&self, request: CallRequest) -> Result<TxHash, ProviderError>;

    /// Execute a read-only call and decode the return data
    async fn call(
        &self,
        target: Address,
        function: &FunctionSignature,
        calldata: Bytes,
    ) -> Result<ResultValue, ProviderError>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

/// Alloy-backed provider, optionally carrying a local signing key
pub struct AlloyProvider {
    provider: DynProvider,
    endpoint: String,
    /// Address of the local key; None means the node's own accounts sign
    local_signer: Option<Address>,
}

/// Create a provider from configuration
pub async fn create_provider(
    config: ProviderConfig,
    private_key: Option<String>,
) -> Result<Box<dyn ContractProvider>> {
    let signer = private_key
        .map(|key| {
            key.trim()
                .parse::<PrivateKeySigner>()
                .context("Invalid private key")
        })
        .transpose()?;
    let local_signer = signer.as_ref().map(|s| s.address());
    let endpoint = config.display();

    let provider = match (config, signer) {
        (ProviderConfig::Http(url), Some(signer)) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(rpc_url)
                .erased()
        }
        (ProviderConfig::Http(url), None) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            ProviderBuilder::new().connect_http(rpc_url).erased()
        }
        (ProviderConfig::WebSocket(url), Some(signer)) => ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(&url)
            .await
            .context("Failed to create WebSocket provider")?
            .erased(),
        (ProviderConfig::WebSocket(url), None) => ProviderBuilder::new()
            .connect(&url)
            .await
            .context("Failed to create WebSocket provider")?
            .erased(),
    };

    info!(endpoint = %endpoint, local_signer = local_signer.is_some(), "provider created");

    Ok(Box::new(AlloyProvider {
        provider,
        endpoint,
        local_signer,
    }))
}

impl AlloyProvider {
    /// Local key address, or the node's first unlocked account
    async fn signer_address(&self) -> Result<Address, ProviderError> {
        if let Some(address) = self.local_signer {
            return Ok(address);
        }

        let accounts = self
            .provider
            .get_accounts()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;
        accounts.first().copied().ok_or_else(|| {
            ProviderError::new(
                "no signer available: set a private key or unlock an account on the node",
            )
        })
    }
}

#[async_trait::async_trait]
impl ContractProvider for AlloyProvider {
    async fn connect(&self) -> Result<SignerHandle, ProviderError> {
        let address = self.signer_address().await?;
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        info!(%address, chain_id, "signer connected");
        Ok(SignerHandle {
            address,
            chain_id,
            local: self.local_signer.is_some(),
        })
    }

    async fn send_transaction(&self, request: CallRequest) -> Result<TxHash, ProviderError> {
        let from = self.signer_address().await?;
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(request.to)
            .with_input(request.data.clone())
            .with_value(request.value);

        let attach = |err: ProviderError| err.with_transaction(Some(from), request.to, &request.data);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| attach(ProviderError::from_transport(&e)))?;
        let hash = *pending.tx_hash();
        debug!(%hash, "transaction submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| attach(ProviderError::new(e.to_string())))?;
        if !receipt.status() {
            return Err(attach(ProviderError::new(format!(
                "transaction {} reverted on-chain (execution reverted)",
                hash
            ))));
        }

        info!(%hash, block = ?receipt.block_number, "transaction mined");
        Ok(hash)
    }

    async fn call(
        &self,
        target: Address,
        function: &FunctionSignature,
        calldata: Bytes,
    ) -> Result<ResultValue, ProviderError> {
        let tx = TransactionRequest::default()
            .with_to(target)
            .with_input(calldata.clone());

        let output = self
            .provider
            .call(tx)
            .await
            .map_err(|e| {
                ProviderError::from_transport(&e).with_transaction(None, target, &calldata)
            })?;

        // Empty return data for a function with outputs means there was no code to run
        if output.is_empty() && !function.outputs.is_empty() {
            return Err(ProviderError::new(
                "missing revert data in call exception: call returned no data",
            )
            .with_transaction(None, target, &calldata));
        }

        let value = ResultValue::decode(&function.outputs, &output)
            .map_err(|e| ProviderError::new(e.to_string()))?;
        debug!(function = %function.signature, bytes = output.len(), "call returned");
        Ok(value)
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_url() {
        assert!(ProviderConfig::from_url("ws://localhost:8546").is_websocket());
        assert!(ProviderConfig::from_url("wss://node.example").is_websocket());
        assert!(!ProviderConfig::from_url("http://localhost:8545").is_websocket());
        assert_eq!(
            ProviderConfig::from_url("http://localhost:8545").display(),
            "http://localhost:8545"
        );
    }

    #[tokio::test]
    async fn test_invalid_private_key_rejected() {
        let result = create_provider(
            ProviderConfig::Http("http://localhost:8545".into()),
            Some("not-a-key".into()),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_provider_with_local_key() {
        // Anvil's first default account
        let key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let provider = create_provider(
            ProviderConfig::Http("http://localhost:8545".into()),
            Some(key.into()),
        )
        .await
        .unwrap();
        assert_eq!(provider.endpoint_name(), "http://localhost:8545");
    }
}
