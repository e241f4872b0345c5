//! Function signatures as loaded from an interface description

use alloy_json_abi::{Function, Param, StateMutability};
use alloy_primitives::keccak256;
use serde::{Deserialize, Serialize};

use super::kind::ParamKind;

/// A function parameter specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Canonical Solidity type (e.g., "address", "uint256[]", "(uint256,address)")
    pub kind: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Classification of the declared type
    pub fn classify(&self) -> ParamKind {
        ParamKind::classify(&self.kind)
    }

    fn from_json(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            kind: param.selector_type().into_owned(),
        }
    }
}

/// Whether calling the function changes state, and whether it accepts value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutability {
    /// view / pure
    ReadOnly,
    /// nonpayable
    StateChanging,
    /// payable
    Payable,
}

impl Mutability {
    pub fn label(&self) -> &'static str {
        match self {
            Mutability::ReadOnly => "read",
            Mutability::StateChanging => "write",
            Mutability::Payable => "payable",
        }
    }
}

impl From<StateMutability> for Mutability {
    fn from(value: StateMutability) -> Self {
        match value {
            StateMutability::Pure | StateMutability::View => Mutability::ReadOnly,
            StateMutability::NonPayable => Mutability::StateChanging,
            StateMutability::Payable => Mutability::Payable,
        }
    }
}

/// A function signature with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub name: String,
    /// Canonical signature string (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
    /// Return values
    pub outputs: Vec<ParamSpec>,
    /// Read-only, state-changing or payable
    pub mutability: Mutability,
}

impl FunctionSignature {
    /// Build a signature from a name and typed parameters, deriving the
    /// canonical signature and selector
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<ParamSpec>,
        outputs: Vec<ParamSpec>,
        mutability: Mutability,
    ) -> Self {
        let name = name.into();
        let types: Vec<&str> = inputs.iter().map(|p| p.kind.as_str()).collect();
        let signature = format!("{}({})", name, types.join(","));
        let selector = compute_selector(&signature);

        Self {
            selector,
            name,
            signature,
            inputs,
            outputs,
            mutability,
        }
    }

    /// Convert a JSON ABI function entry
    pub fn from_json(function: &Function) -> Self {
        Self {
            selector: function.selector().0,
            name: function.name.clone(),
            signature: function.signature(),
            inputs: function.inputs.iter().map(ParamSpec::from_json).collect(),
            outputs: function.outputs.iter().map(ParamSpec::from_json).collect(),
            mutability: function.state_mutability.into(),
        }
    }

    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    pub fn is_read_only(&self) -> bool {
        self.mutability == Mutability::ReadOnly
    }

    pub fn is_payable(&self) -> bool {
        self.mutability == Mutability::Payable
    }
}

/// Compute the 4-byte function selector from a canonical signature
pub fn compute_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}
