//! Decoded call results and their human / raw renderings

use alloy_dyn_abi::{DynSolType, DynSolValue};
use thiserror::Error;

use super::units::to_display;
use crate::domain::abi::ParamSpec;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to parse output type '{kind}': {reason}")]
    Type { kind: String, reason: String },
    #[error("failed to decode return data: {0}")]
    Data(String),
}

/// Decoded return value of a read-only call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultValue {
    /// Any intN/uintN, kept as its exact decimal string
    Integer { raw: String },
    /// Addresses, bools, bytes and strings in their natural form
    Other(String),
    Sequence(Vec<ResultValue>),
    /// Tuple or multi-output result; names may be empty
    Aggregate(Vec<(String, ResultValue)>),
}

/// Both renderings of a result, independently copyable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub human: String,
    pub raw: String,
}

impl ResultValue {
    pub fn integer(raw: impl Into<String>) -> Self {
        ResultValue::Integer { raw: raw.into() }
    }

    pub fn from_dyn(value: &DynSolValue) -> Self {
        match value {
            DynSolValue::Int(i, _) => ResultValue::integer(i.to_string()),
            DynSolValue::Uint(u, _) => ResultValue::integer(u.to_string()),
            DynSolValue::Address(addr) => ResultValue::Other(addr.to_checksum(None)),
            DynSolValue::Bool(b) => ResultValue::Other(b.to_string()),
            DynSolValue::FixedBytes(bytes, size) => {
                ResultValue::Other(format!("0x{}", hex::encode(&bytes[..*size])))
            }
            DynSolValue::Bytes(bytes) => ResultValue::Other(format!("0x{}", hex::encode(bytes))),
            DynSolValue::String(s) => ResultValue::Other(s.clone()),
            DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
                ResultValue::Sequence(values.iter().map(ResultValue::from_dyn).collect())
            }
            DynSolValue::Tuple(values) => ResultValue::Aggregate(
                values
                    .iter()
                    .map(|v| (String::new(), ResultValue::from_dyn(v)))
                    .collect(),
            ),
            _ => ResultValue::Other(format!("{:?}", value)),
        }
    }

    /// Build a result from a function's outputs; a single output is returned bare
    pub fn from_outputs(outputs: &[ParamSpec], values: &[DynSolValue]) -> Self {
        if let [single] = values {
            return ResultValue::from_dyn(single);
        }

        ResultValue::Aggregate(
            values
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let name = outputs.get(i).map(|p| p.name.clone()).unwrap_or_default();
                    (name, ResultValue::from_dyn(value))
                })
                .collect(),
        )
    }

    /// Decode raw return data against the declared outputs
    pub fn decode(outputs: &[ParamSpec], data: &[u8]) -> Result<Self, DecodeError> {
        let mut types = Vec::with_capacity(outputs.len());
        for output in outputs {
            let ty = DynSolType::parse(&output.kind).map_err(|e| DecodeError::Type {
                kind: output.kind.clone(),
                reason: e.to_string(),
            })?;
            types.push(ty);
        }

        if types.is_empty() {
            return Ok(ResultValue::Aggregate(Vec::new()));
        }

        let decoded = DynSolType::Tuple(types)
            .abi_decode_sequence(data)
            .map_err(|e| DecodeError::Data(e.to_string()))?;

        match decoded {
            DynSolValue::Tuple(values) => Ok(ResultValue::from_outputs(outputs, &values)),
            other => Ok(ResultValue::from_dyn(&other)),
        }
    }
}

/// Render a result with integers scaled by `scale` decimals in the human form
pub fn render(value: &ResultValue, scale: u8) -> Rendered {
    Rendered {
        human: render_one(value, Some(scale), true),
        raw: render_one(value, None, true),
    }
}

fn render_one(value: &ResultValue, scale: Option<u8>, top: bool) -> String {
    match value {
        ResultValue::Integer { raw } => match scale {
            Some(decimals) => to_display(raw, decimals).unwrap_or_else(|_| raw.clone()),
            None => raw.clone(),
        },
        ResultValue::Other(s) => s.clone(),
        ResultValue::Sequence(items) => {
            let formatted: Vec<String> = items.iter().map(|v| render_one(v, scale, false)).collect();
            format!("[{}]", formatted.join(", "))
        }
        ResultValue::Aggregate(members) => {
            let formatted: Vec<String> = members
                .iter()
                .map(|(name, v)| {
                    let rendered = render_one(v, scale, false);
                    if name.is_empty() {
                        rendered
                    } else {
                        format!("{}: {}", name, rendered)
                    }
                })
                .collect();
            if top {
                formatted.join(", ")
            } else {
                format!("({})", formatted.join(", "))
            }
        }
    }
}
