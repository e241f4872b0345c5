//! Request, signer and error types shared by providers and the runtime bridge

use alloy::primitives::{Address, Bytes, U256};
use alloy::transports::TransportError;
use thiserror::Error;

use crate::modules::toolkit::errors::{RawExecutionError, TxDetails};

/// The account that signs outgoing transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerHandle {
    pub address: Address,
    pub chain_id: u64,
    /// True when signing with a local private key, false for a node account
    pub local: bool,
}

/// A state-changing call to broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// Provider failure, keeping what the classifier needs
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    pub revert_data: Option<Bytes>,
    pub transaction: Option<TxDetails>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            revert_data: None,
            transaction: None,
        }
    }

    /// Wrap a JSON-RPC failure, pulling revert data out of the error payload
    pub fn from_transport(err: &TransportError) -> Self {
        Self {
            message: err.to_string(),
            revert_data: err.as_error_resp().and_then(|payload| payload.as_revert_data()),
            transaction: None,
        }
    }

    pub fn with_transaction(mut self, from: Option<Address>, to: Address, data: &Bytes) -> Self {
        self.transaction = Some(TxDetails {
            from: from.map(|a| a.to_checksum(None)),
            to: Some(to.to_checksum(None)),
            data: Some(format!("0x{}", hex::encode(data))),
        });
        self
    }

    pub fn into_raw(self) -> RawExecutionError {
        RawExecutionError {
            message: self.message,
            revert_data: self.revert_data.map(|b| b.to_vec()),
            transaction: self.transaction,
        }
    }
}
