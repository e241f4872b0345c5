//! Interface JSON parsing

use std::fs;
use std::path::Path;

use alloy_json_abi::Function;
use anyhow::Context;
use serde_json::Value;

use crate::domain::abi::{CatalogError, FunctionSignature, Interface, InterfaceOrigin};

/// Parse an interface from JSON text
///
/// Accepts a bare entry list or an artifact object with an `abi` list. Every
/// entry must be an object with a string `type`; only functions are kept.
pub fn parse_interface(
    name: &str,
    json: &str,
    origin: InterfaceOrigin,
) -> Result<Interface, CatalogError> {
    let value: Value = serde_json::from_str(json)?;

    let entries = match &value {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("abi") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(CatalogError::NotAList),
        },
        _ => return Err(CatalogError::NotAList),
    };

    let mut functions = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let Some(kind) = entry.get("type").and_then(Value::as_str) else {
            return Err(CatalogError::MissingType { index });
        };
        if kind != "function" {
            continue;
        }

        let function: Function =
            serde_json::from_value(entry.clone()).map_err(|e| CatalogError::BadFunction {
                index,
                reason: e.to_string(),
            })?;
        functions.push(FunctionSignature::from_json(&function));
    }

    Ok(Interface::new(name, functions, origin))
}

/// Load an interface file, naming it after the file stem
pub fn load_file(path: &Path) -> anyhow::Result<Interface> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("custom")
        .to_string();

    let interface = parse_interface(&name, &content, InterfaceOrigin::File(path.to_path_buf()))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(interface)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_ABI: &str = r#"[
        {"type": "constructor", "inputs": [], "stateMutability": "nonpayable"},
        {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
            {"name": "from", "type": "address", "indexed": true},
            {"name": "to", "type": "address", "indexed": true},
            {"name": "value", "type": "uint256", "indexed": false}
        ]},
        {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
         "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
         "outputs": [{"name": "", "type": "bool"}]},
        {"type": "function", "name": "deposit", "stateMutability": "payable",
         "inputs": [], "outputs": []}
    ]"#;

    #[test]
    fn test_parse_filters_non_functions() {
        let interface = parse_interface("Token", TOKEN_ABI, InterfaceOrigin::Custom).unwrap();
        assert_eq!(interface.functions.len(), 2);
        assert_eq!(interface.functions[0].signature, "transfer(address,uint256)");
        assert!(interface.functions[1].is_payable());
    }

    #[test]
    fn test_parse_artifact() {
        let artifact = format!(r#"{{"contractName": "Token", "abi": {}}}"#, TOKEN_ABI);
        let interface = parse_interface("Token", &artifact, InterfaceOrigin::Custom).unwrap();
        assert_eq!(interface.functions.len(), 2);
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            parse_interface("x", "{not json", InterfaceOrigin::Custom),
            Err(CatalogError::Json(_))
        ));
        assert!(matches!(
            parse_interface("x", r#"{"name": "transfer"}"#, InterfaceOrigin::Custom),
            Err(CatalogError::NotAList)
        ));
        assert!(matches!(
            parse_interface("x", r#"[{"type": "function", "name": "a", "inputs": [], "outputs": [], "stateMutability": "view"}, {"name": "b"}]"#, InterfaceOrigin::Custom),
            Err(CatalogError::MissingType { index: 1 })
        ));
        assert!(matches!(
            parse_interface("x", r#"[{"type": "function", "inputs": 7}]"#, InterfaceOrigin::Custom),
            Err(CatalogError::BadFunction { index: 0, .. })
        ));
    }

    #[test]
    fn test_load_file_uses_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MyToken.json");
        fs::write(&path, TOKEN_ABI).unwrap();

        let interface = load_file(&path).unwrap();
        assert_eq!(interface.name, "MyToken");
        assert_eq!(interface.origin, InterfaceOrigin::File(path));
    }
}
