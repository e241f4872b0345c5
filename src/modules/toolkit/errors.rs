//! Classification of failed sends and reads into user-facing errors

use std::fmt;

use alloy_sol_types::{Revert, SolError};
use tracing::warn;

/// Substrings that mean the target has no code to execute
const NOT_A_CONTRACT_MARKERS: [&str; 5] = [
    "call_exception",
    "missing revert data",
    "cannot estimate gas",
    "cannot include data",
    "could not coalesce error",
];

const REVERT_MARKER: &str = "revert";
const INSUFFICIENT_FUNDS_MARKER: &str = "insufficient funds";
const USER_REJECTED_MARKERS: [&str; 2] = ["user rejected", "user denied"];

/// Request fields attached to a revert for context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxDetails {
    pub from: Option<String>,
    pub to: Option<String>,
    pub data: Option<String>,
}

impl fmt::Display for TxDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "from: {}, to: {}, data: {}",
            field(&self.from),
            field(&self.to),
            field(&self.data)
        )
    }
}

/// What the provider reported, before classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExecutionError {
    pub message: String,
    /// Revert payload returned by the node, if any
    pub revert_data: Option<Vec<u8>>,
    /// The request that was attempted
    pub transaction: Option<TxDetails>,
}

impl RawExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    NotAContract,
    Reverted {
        reason: Option<String>,
        transaction: Option<TxDetails>,
    },
    InsufficientFunds,
    UserRejected,
    Unknown(String),
}

/// A classified execution error ready to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    pub kind: ErrorKind,
    pub title: String,
    pub message: String,
    pub details: Option<String>,
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Classify a raw provider error; first matching category wins
pub fn classify(error: &RawExecutionError) -> ExecutionError {
    let lowered = error.message.to_lowercase();

    let classified = if NOT_A_CONTRACT_MARKERS.iter().any(|m| lowered.contains(m)) {
        ExecutionError {
            kind: ErrorKind::NotAContract,
            title: "Invalid Target Address".to_string(),
            message: "The target appears to be a regular account (EOA), not a contract".to_string(),
            details: Some(
                "Check the contract address and that it is deployed on the connected network"
                    .to_string(),
            ),
        }
    } else if lowered.contains(REVERT_MARKER) {
        let reason = error
            .revert_data
            .as_deref()
            .and_then(decode_error_string)
            .or_else(|| quoted_reason(&error.message))
            .or_else(|| reverted_suffix(&error.message));
        let transaction = error
            .transaction
            .clone()
            .or_else(|| transaction_from_message(&error.message));

        let mut message =
            "The transaction would fail: a condition in the contract was not met".to_string();
        if let Some(tx) = &transaction {
            message.push_str(&format!(" [{}]", tx));
        }

        ExecutionError {
            details: Some(format!(
                "Revert reason: {}",
                reason.as_deref().unwrap_or("Unknown reason")
            )),
            kind: ErrorKind::Reverted {
                reason,
                transaction,
            },
            title: "Transaction Would Fail".to_string(),
            message,
        }
    } else if lowered.contains(INSUFFICIENT_FUNDS_MARKER) {
        ExecutionError {
            kind: ErrorKind::InsufficientFunds,
            title: "Insufficient Funds".to_string(),
            message: "Not enough funds to cover gas * price + value".to_string(),
            details: None,
        }
    } else if USER_REJECTED_MARKERS.iter().any(|m| lowered.contains(m)) {
        ExecutionError {
            kind: ErrorKind::UserRejected,
            title: "Transaction Rejected".to_string(),
            message: "The signer rejected the transaction".to_string(),
            details: None,
        }
    } else {
        ExecutionError {
            kind: ErrorKind::Unknown(error.message.clone()),
            title: "Transaction Error".to_string(),
            message: "An error occurred while executing the call".to_string(),
            details: Some(error.message.clone()),
        }
    };

    warn!(title = %classified.title, raw = %error.message, "execution failed");
    classified
}

/// Decode an `Error(string)` revert payload
pub fn decode_error_string(data: &[u8]) -> Option<String> {
    if data.len() < 4 || data[..4] != Revert::SELECTOR {
        return None;
    }
    Revert::abi_decode(data).ok().map(|revert| revert.reason)
}

/// `reason="..."` as embedded by some node clients
fn quoted_reason(message: &str) -> Option<String> {
    let start = message.find("reason=\"")? + "reason=\"".len();
    let len = message[start..].find('"')?;
    Some(message[start..start + len].to_string()).filter(|r| !r.is_empty())
}

/// Text after `execution reverted:`, up to any attached data
fn reverted_suffix(message: &str) -> Option<String> {
    const PREFIX: &str = "execution reverted:";
    let start = message.find(PREFIX)? + PREFIX.len();
    let rest = &message[start..];
    let end = [", data:", "\""]
        .iter()
        .filter_map(|stop| rest.find(stop))
        .min()
        .unwrap_or(rest.len());
    let reason = rest[..end].trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

/// Best-effort parse of `transaction={ from: "0x..", to: "0x..", data: "0x.." }`
fn transaction_from_message(message: &str) -> Option<TxDetails> {
    let start = message.find("transaction={")? + "transaction={".len();
    let len = message[start..].find('}')?;
    let body = &message[start..start + len];

    let mut details = TxDetails::default();
    for pair in body.split(',') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches('"');
        let value = Some(value.trim().trim_matches('"').to_string());
        match key {
            "from" => details.from = value,
            "to" => details.to = value,
            "data" => details.data = value,
            _ => {}
        }
    }

    (details != TxDetails::default()).then_some(details)
}
