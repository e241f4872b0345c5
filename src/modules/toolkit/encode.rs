//! ABI encoding of function calldata

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, FixedBytes, I256, U256};
use thiserror::Error;
use tracing::debug;

use super::checksum::{validate_address, AddressValidity};
use super::ToolResult;
use crate::core::{Action, NotifyLevel};
use crate::domain::abi::{FunctionSignature, Mutability, ParamSpec};

/// Resolved raw value for one parameter, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArg {
    Scalar(String),
    /// One raw string per element of a dynamic array
    Array(Vec<String>),
}

/// Encoded call payload: selector followed by the argument encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub selector: [u8; 4],
    /// Full calldata, selector included
    pub data: Vec<u8>,
}

impl EncodedCall {
    /// Lowercase hex with the `0x` prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.data))
    }

    /// Lowercase hex without the prefix
    pub fn payload_hex(&self) -> String {
        hex::encode(&self.data)
    }

    /// Argument bytes after the selector
    pub fn arguments(&self) -> &[u8] {
        &self.data[4..]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("argument count mismatch: expected {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },
    #[error("failed to parse type '{kind}': {reason}")]
    Type { kind: String, reason: String },
    #[error("invalid value for '{name}' ({kind}): {reason}")]
    Argument {
        name: String,
        kind: String,
        reason: String,
    },
    #[error("invalid function signature: {0}")]
    Signature(String),
}

/// Quick encode from a textual signature, e.g.
/// `:encode transfer(address,uint256) 0x123... 1000`
pub fn encode(input: Option<String>) -> Action {
    let Some(input) = input else {
        return Action::Notify(
            "Usage: :encode <function_sig> <arg1> <arg2> ...".into(),
            NotifyLevel::Warn,
        );
    };

    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some((signature, args)) = parts.split_first() else {
        return Action::Notify(
            "Usage: :encode transfer(address,uint256) 0x123... 1000".into(),
            NotifyLevel::Warn,
        );
    };

    match encode_signature(signature, args) {
        Ok(call) => ToolResult::new("ABI Encode")
            .add("signature", *signature)
            .add("calldata", call.to_hex())
            .into_action(),
        Err(e) => Action::Notify(format!("Encoding error: {}", e), NotifyLevel::Error),
    }
}

/// Encode a call to `function` with the resolved raw values of its inputs
///
/// Fails atomically: either every argument coerces or no payload is produced.
pub fn encode_call(function: &FunctionSignature, args: &[RawArg]) -> Result<EncodedCall, EncodeError> {
    if args.len() != function.inputs.len() {
        return Err(EncodeError::ArgumentCount {
            expected: function.inputs.len(),
            got: args.len(),
        });
    }

    let mut values = Vec::with_capacity(args.len());
    for (idx, (param, arg)) in function.inputs.iter().zip(args).enumerate() {
        values.push(coerce_arg(idx, param, arg)?);
    }

    let mut data = function.selector.to_vec();
    if !values.is_empty() {
        data.extend_from_slice(&DynSolValue::Tuple(values).abi_encode_params());
    }

    debug!(
        function = %function.signature,
        bytes = data.len(),
        "encoded calldata"
    );

    Ok(EncodedCall {
        selector: function.selector,
        data,
    })
}

/// Encode from a textual signature and one literal per argument
pub fn encode_signature(signature: &str, args: &[&str]) -> Result<EncodedCall, EncodeError> {
    let function = parse_function_signature(signature)?;
    let args: Vec<RawArg> = args.iter().map(|a| RawArg::Scalar(a.to_string())).collect();
    encode_call(&function, &args)
}

/// Parse `name(type1,type2)` into an unnamed, state-changing signature
fn parse_function_signature(signature: &str) -> Result<FunctionSignature, EncodeError> {
    let normalized = signature.replace(' ', "");

    let open_paren = normalized
        .find('(')
        .ok_or_else(|| EncodeError::Signature("missing '('".to_string()))?;
    let close_paren = normalized
        .rfind(')')
        .ok_or_else(|| EncodeError::Signature("missing ')'".to_string()))?;

    if close_paren <= open_paren || open_paren == 0 {
        return Err(EncodeError::Signature("malformed parentheses".to_string()));
    }

    let name = &normalized[..open_paren];
    let params_str = &normalized[open_paren + 1..close_paren];

    let inputs = if params_str.is_empty() {
        Vec::new()
    } else {
        // Splitting through the tuple type keeps nested commas intact
        match DynSolType::parse(&format!("({})", params_str)) {
            Ok(DynSolType::Tuple(types)) => types
                .iter()
                .enumerate()
                .map(|(i, ty)| ParamSpec::new(format!("arg{}", i), ty.sol_type_name()))
                .collect(),
            Ok(_) => return Err(EncodeError::Signature("malformed parameter list".to_string())),
            Err(e) => {
                return Err(EncodeError::Type {
                    kind: params_str.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    };

    Ok(FunctionSignature::new(
        name,
        inputs,
        Vec::new(),
        Mutability::StateChanging,
    ))
}

fn coerce_arg(idx: usize, param: &ParamSpec, arg: &RawArg) -> Result<DynSolValue, EncodeError> {
    let name = if param.name.trim().is_empty() {
        format!("arg{}", idx)
    } else {
        param.name.clone()
    };
    let fail = |reason: String| EncodeError::Argument {
        name: name.clone(),
        kind: param.kind.clone(),
        reason,
    };

    let ty = DynSolType::parse(&param.kind).map_err(|e| EncodeError::Type {
        kind: param.kind.clone(),
        reason: e.to_string(),
    })?;

    match (arg, &ty) {
        (RawArg::Array(elements), DynSolType::Array(inner)) => {
            let mut values = Vec::with_capacity(elements.len());
            for (i, element) in elements.iter().enumerate() {
                let value =
                    parse_value(inner, element).map_err(|e| fail(format!("element {}: {}", i, e)))?;
                values.push(value);
            }
            Ok(DynSolValue::Array(values))
        }
        (RawArg::Array(_), _) => Err(fail("expected a single value, got a list".to_string())),
        (RawArg::Scalar(value), _) => parse_value(&ty, value).map_err(fail),
    }
}

/// Parse a single value according to its type
fn parse_value(ty: &DynSolType, raw: &str) -> Result<DynSolValue, String> {
    // Strings are taken verbatim, surrounding whitespace included
    if let DynSolType::String = ty {
        return Ok(DynSolValue::String(unquote(raw).to_string()));
    }

    let arg = raw.trim();
    match ty {
        DynSolType::Address => {
            let digits = arg
                .strip_prefix("0x")
                .or_else(|| arg.strip_prefix("0X"))
                .unwrap_or(arg);

            if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err("expected 40 hex characters".to_string());
            }
            if validate_address(&format!("0x{}", digits)) == AddressValidity::Invalid {
                return Err("bad address checksum".to_string());
            }

            let bytes = hex::decode(digits).map_err(|e| format!("invalid hex: {}", e))?;
            Ok(DynSolValue::Address(Address::from_slice(&bytes)))
        }

        DynSolType::Bool => {
            let value = match arg.to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(format!("expected true/false, got '{}'", arg)),
            };
            Ok(DynSolValue::Bool(value))
        }

        DynSolType::Int(size) => {
            let value = if let Some(hex_str) = strip_hex_prefix(arg) {
                let bytes = parse_hex_to_bytes(hex_str, 32)?;
                let mut array = [0u8; 32];
                array.copy_from_slice(&bytes);
                I256::from_be_bytes(array)
            } else {
                if arg.is_empty() {
                    return Err("empty integer".to_string());
                }
                arg.parse::<I256>()
                    .map_err(|e| format!("invalid integer: {}", e))?
            };
            check_int_range(value, *size)?;
            Ok(DynSolValue::Int(value, *size))
        }

        DynSolType::Uint(size) => {
            let value = if let Some(hex_str) = strip_hex_prefix(arg) {
                let bytes = parse_hex_to_bytes(hex_str, 32)?;
                U256::from_be_slice(&bytes)
            } else {
                if arg.is_empty() || arg.starts_with('-') {
                    return Err(format!("invalid unsigned integer: '{}'", arg));
                }
                arg.parse::<U256>()
                    .map_err(|e| format!("invalid unsigned integer: {}", e))?
            };
            if *size < 256 && value.bit_len() > *size {
                return Err(format!("value does not fit in uint{}", size));
            }
            Ok(DynSolValue::Uint(value, *size))
        }

        DynSolType::Bytes => {
            let hex_str = strip_hex_prefix(arg).unwrap_or(arg);
            let bytes = hex::decode(hex_str).map_err(|e| format!("invalid hex: {}", e))?;
            Ok(DynSolValue::Bytes(bytes))
        }

        DynSolType::FixedBytes(size) => {
            let hex_str = strip_hex_prefix(arg).unwrap_or(arg);
            let bytes = hex::decode(hex_str).map_err(|e| format!("invalid hex: {}", e))?;

            if bytes.len() != *size {
                return Err(format!(
                    "expected {} bytes, got {}",
                    size,
                    bytes.len()
                ));
            }

            let mut word = [0u8; 32];
            word[..*size].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(FixedBytes::from(word), *size))
        }

        // Arrays given as one literal, fixed arrays and tuples
        DynSolType::Array(_) | DynSolType::FixedArray(..) | DynSolType::Tuple(_) => {
            ty.coerce_str(arg).map_err(|e| e.to_string())
        }

        _ => Err(format!("unsupported type: {}", ty)),
    }
}

/// Strip one pair of matching quotes, if the trimmed value is quoted
fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    if quoted {
        &trimmed[1..trimmed.len() - 1]
    } else {
        raw
    }
}

fn strip_hex_prefix(arg: &str) -> Option<&str> {
    arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X"))
}

fn check_int_range(value: I256, size: usize) -> Result<(), String> {
    if size >= 256 {
        return Ok(());
    }
    let bound = U256::from(1u8) << (size - 1);
    let magnitude = value.unsigned_abs();
    let fits = if value.is_negative() {
        magnitude <= bound
    } else {
        magnitude < bound
    };
    if fits {
        Ok(())
    } else {
        Err(format!("value does not fit in int{}", size))
    }
}

/// Parse hex string to bytes with padding
fn parse_hex_to_bytes(hex_str: &str, expected_size: usize) -> Result<Vec<u8>, String> {
    // Odd-length hex like 0x3e8 is common for quantities
    let padded_hex;
    let hex_str = if hex_str.len() % 2 == 1 {
        padded_hex = format!("0{}", hex_str);
        padded_hex.as_str()
    } else {
        hex_str
    };
    let bytes = hex::decode(hex_str).map_err(|e| format!("invalid hex: {}", e))?;

    if bytes.len() > expected_size {
        return Err(format!(
            "hex value too large: expected max {} bytes, got {}",
            expected_size,
            bytes.len()
        ));
    }

    // Pad with zeros on the left
    let mut padded = vec![0u8; expected_size];
    padded[expected_size - bytes.len()..].copy_from_slice(&bytes);

    Ok(padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> FunctionSignature {
        FunctionSignature::new(
            "transfer",
            vec![
                ParamSpec::new("to", "address"),
                ParamSpec::new("amount", "uint256"),
            ],
            vec![ParamSpec::new("", "bool")],
            Mutability::StateChanging,
        )
    }

    #[test]
    fn test_encode_transfer() {
        let to = format!("0x{}", "11".repeat(20));
        let call = encode_call(
            &transfer(),
            &[
                RawArg::Scalar(to),
                RawArg::Scalar("1500000000000000000".into()),
            ],
        )
        .unwrap();

        let hex_result = call.to_hex();
        assert!(hex_result.starts_with("0xa9059cbb"));
        assert_eq!(call.data.len(), 4 + 32 * 2);
        assert_eq!(
            &call.payload_hex()[8..72],
            &format!("{}{}", "0".repeat(24), "11".repeat(20))
        );
        // 1.5e18 = 0x14d1120d7b160000
        assert!(call.payload_hex().ends_with("00000000000000000000000000000000000000000000000014d1120d7b160000"));
    }

    #[test]
    fn test_encode_no_args() {
        let total_supply = FunctionSignature::new("totalSupply", vec![], vec![], Mutability::ReadOnly);
        let call = encode_call(&total_supply, &[]).unwrap();
        assert_eq!(call.to_hex(), "0x18160ddd");
    }

    #[test]
    fn test_encode_dynamic_array() {
        let function = FunctionSignature::new(
            "batch",
            vec![ParamSpec::new("amounts", "uint256[]")],
            vec![],
            Mutability::StateChanging,
        );
        let call = encode_call(
            &function,
            &[RawArg::Array(vec!["10".into(), "20".into(), "30".into()])],
        )
        .unwrap();

        let args = call.arguments();
        // offset word, length word, three elements
        assert_eq!(args.len(), 32 * 5);
        assert_eq!(args[31], 0x20);
        assert_eq!(args[63], 3);
        assert_eq!(args[95], 10);
        assert_eq!(args[159], 30);
    }

    #[test]
    fn test_encode_tuple_literal() {
        let function = FunctionSignature::new(
            "submit",
            vec![ParamSpec::new("order", "(uint256,bool)")],
            vec![],
            Mutability::StateChanging,
        );
        let call = encode_call(&function, &[RawArg::Scalar("(7, true)".into())]).unwrap();
        assert_eq!(call.arguments().len(), 64);
        assert_eq!(call.arguments()[31], 7);
        assert_eq!(call.arguments()[63], 1);
    }

    #[test]
    fn test_malformed_address_fails() {
        let result = encode_call(
            &transfer(),
            &[RawArg::Scalar("0x1234".into()), RawArg::Scalar("1".into())],
        );
        assert!(matches!(result, Err(EncodeError::Argument { ref name, .. }) if name == "to"));
    }

    #[test]
    fn test_bad_checksum_fails() {
        let result = encode_call(
            &transfer(),
            &[
                RawArg::Scalar("0xFb6916095ca1df60bB79Ce92cE3Ea74c37c5d359".into()),
                RawArg::Scalar("1".into()),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_uint_range_checked() {
        let function = FunctionSignature::new(
            "setV",
            vec![ParamSpec::new("v", "uint8")],
            vec![],
            Mutability::StateChanging,
        );
        assert!(encode_call(&function, &[RawArg::Scalar("255".into())]).is_ok());
        assert!(encode_call(&function, &[RawArg::Scalar("256".into())]).is_err());
        assert!(encode_call(&function, &[RawArg::Scalar("".into())]).is_err());
    }

    #[test]
    fn test_int_range_checked() {
        let ty = DynSolType::Int(8);
        assert!(parse_value(&ty, "-128").is_ok());
        assert!(parse_value(&ty, "127").is_ok());
        assert!(parse_value(&ty, "128").is_err());
        assert!(parse_value(&ty, "-129").is_err());
    }

    #[test]
    fn test_parse_bool() {
        let ty = DynSolType::Bool;
        assert!(matches!(parse_value(&ty, "true"), Ok(DynSolValue::Bool(true))));
        assert!(matches!(parse_value(&ty, "0"), Ok(DynSolValue::Bool(false))));
        assert!(parse_value(&ty, "maybe").is_err());
    }

    #[test]
    fn test_parse_string() {
        let ty = DynSolType::String;
        assert!(matches!(
            parse_value(&ty, "\"hello\""),
            Ok(DynSolValue::String(s)) if s == "hello"
        ));
        assert!(matches!(
            parse_value(&ty, "world"),
            Ok(DynSolValue::String(s)) if s == "world"
        ));
        assert!(matches!(
            parse_value(&ty, "  padded  "),
            Ok(DynSolValue::String(s)) if s == "  padded  "
        ));
        assert!(matches!(
            parse_value(&ty, " \" inner space \" "),
            Ok(DynSolValue::String(s)) if s == " inner space "
        ));
    }

    #[test]
    fn test_argument_count_mismatch() {
        let result = encode_call(&transfer(), &[RawArg::Scalar("0x00".into())]);
        assert_eq!(
            result,
            Err(EncodeError::ArgumentCount {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_encode_signature() {
        let call = encode_signature(
            "transfer(address, uint256)",
            &["0x742d35cc6634c0532925a3b844bc9e7595f0beb0", "1000000"],
        )
        .unwrap();
        assert!(call.to_hex().starts_with("0xa9059cbb"));

        assert!(encode_signature("invalid", &[]).is_err());
    }
}
