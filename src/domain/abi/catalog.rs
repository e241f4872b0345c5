//! Interface catalog - named interfaces and their callable functions

use std::path::PathBuf;

use thiserror::Error;

use super::FunctionSignature;

/// Lookup prefix that skips built-in standards
pub const LOADED_PREFIX: &str = "file:";

/// Errors raised while loading an interface description
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid interface JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("interface must be a JSON array of entries (or an artifact with an \"abi\" array)")]
    NotAList,
    #[error("entry {index} has no \"type\" discriminator")]
    MissingType { index: usize },
    #[error("function entry {index} is malformed: {reason}")]
    BadFunction { index: usize, reason: String },
    #[error("unknown interface: {0}")]
    UnknownInterface(String),
    #[error("unknown function: {0}")]
    UnknownFunction(String),
}

/// Where an interface came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceOrigin {
    /// Built into the binary
    Standard,
    /// Pasted or loaded by the user during the session
    Custom,
    /// Found by the ABI directory scanner
    File(PathBuf),
}

/// A named interface with its function entries in declaration order
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub functions: Vec<FunctionSignature>,
    pub origin: InterfaceOrigin,
}

impl Interface {
    pub fn new(
        name: impl Into<String>,
        functions: Vec<FunctionSignature>,
        origin: InterfaceOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            functions,
            origin,
        }
    }

    /// Find a function by name, or by full signature for overloaded names
    ///
    /// A bare name resolves to the first declared overload.
    pub fn function(&self, key: &str) -> Result<&FunctionSignature, CatalogError> {
        let key = key.trim();
        let found = if key.contains('(') {
            let normalized = key.replace(' ', "");
            self.functions.iter().find(|f| f.signature == normalized)
        } else {
            self.functions.iter().find(|f| f.name == key)
        };
        found.ok_or_else(|| CatalogError::UnknownFunction(key.to_string()))
    }

    /// Whether more than one function shares this name
    pub fn is_overloaded(&self, name: &str) -> bool {
        self.functions.iter().filter(|f| f.name == name).count() > 1
    }
}

/// Registry of interfaces indexed by display name
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    interfaces: Vec<Interface>,
    /// Errors collected while scanning ABI directories
    pub errors: Vec<String>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an interface, replacing any existing one with the same name
    pub fn insert(&mut self, interface: Interface) {
        match self
            .interfaces
            .iter_mut()
            .find(|existing| existing.name == interface.name)
        {
            Some(existing) => *existing = interface,
            None => self.interfaces.push(interface),
        }
    }

    /// Look up an interface by name: exact, then case-insensitive, then prefix
    ///
    /// Built-in standards resolve before loaded interfaces, so a stray
    /// `erc20.json` never shadows the ERC20 standard. A `file:` prefix
    /// searches only loaded interfaces.
    pub fn get(&self, name: &str) -> Result<&Interface, CatalogError> {
        let wanted = name.trim();
        let found = match wanted.strip_prefix(LOADED_PREFIX) {
            Some(rest) => Self::resolve(self.loaded(), rest.trim()),
            None => Self::resolve(self.standards(), wanted)
                .or_else(|| Self::resolve(self.loaded(), wanted)),
        };
        found.ok_or_else(|| CatalogError::UnknownInterface(wanted.to_string()))
    }

    fn standards(&self) -> impl Iterator<Item = &Interface> + Clone {
        self.interfaces
            .iter()
            .filter(|i| i.origin == InterfaceOrigin::Standard)
    }

    fn loaded(&self) -> impl Iterator<Item = &Interface> + Clone {
        self.interfaces
            .iter()
            .filter(|i| i.origin != InterfaceOrigin::Standard)
    }

    fn resolve<'a>(
        mut candidates: impl Iterator<Item = &'a Interface> + Clone,
        wanted: &str,
    ) -> Option<&'a Interface> {
        let lowered = wanted.to_lowercase();
        candidates
            .clone()
            .find(|i| i.name == wanted)
            .or_else(|| {
                candidates
                    .clone()
                    .find(|i| i.name.eq_ignore_ascii_case(wanted))
            })
            // "erc20" matches "ERC20 - Token Standard"
            .or_else(|| candidates.find(|i| i.name.to_lowercase().starts_with(&lowered)))
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Merge another catalog into this one (later entries replace earlier ones)
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        for interface in other.interfaces {
            self.insert(interface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::{Mutability, ParamSpec};

    fn token_interface() -> Interface {
        Interface::new(
            "ERC20 - Token Standard",
            vec![
                FunctionSignature::new(
                    "transfer",
                    vec![
                        ParamSpec::new("to", "address"),
                        ParamSpec::new("amount", "uint256"),
                    ],
                    vec![ParamSpec::new("", "bool")],
                    Mutability::StateChanging,
                ),
                FunctionSignature::new(
                    "totalSupply",
                    vec![],
                    vec![ParamSpec::new("", "uint256")],
                    Mutability::ReadOnly,
                ),
            ],
            InterfaceOrigin::Standard,
        )
    }

    #[test]
    fn test_lookup_by_prefix_and_case() {
        let mut catalog = Catalog::new();
        catalog.insert(token_interface());

        assert!(catalog.get("ERC20 - Token Standard").is_ok());
        assert!(catalog.get("erc20").is_ok());
        assert!(matches!(
            catalog.get("ERC777"),
            Err(CatalogError::UnknownInterface(_))
        ));
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut catalog = Catalog::new();
        catalog.insert(token_interface());
        catalog.insert(Interface::new(
            "ERC20 - Token Standard",
            vec![],
            InterfaceOrigin::Custom,
        ));

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("erc20").unwrap().functions.is_empty());
    }

    #[test]
    fn test_loaded_interface_does_not_shadow_standard() {
        let mut catalog = Catalog::new();
        catalog.insert(token_interface());
        catalog.insert(Interface::new(
            "erc20",
            vec![FunctionSignature::new(
                "transfer",
                vec![ParamSpec::new("to", "address")],
                vec![],
                Mutability::StateChanging,
            )],
            InterfaceOrigin::File(PathBuf::from("docs/erc20.json")),
        ));

        let standard = catalog.get("erc20").unwrap();
        assert_eq!(standard.origin, InterfaceOrigin::Standard);
        assert_eq!(
            standard.function("transfer").unwrap().signature,
            "transfer(address,uint256)"
        );

        let loaded = catalog.get("file:erc20").unwrap();
        assert!(matches!(loaded.origin, InterfaceOrigin::File(_)));
        assert!(catalog.get("file:ERC777").is_err());
    }

    #[test]
    fn test_function_lookup() {
        let interface = token_interface();
        assert_eq!(interface.function("transfer").unwrap().selector_hex(), "0xa9059cbb");
        assert!(interface.function("transfer(address, uint256)").is_ok());
        assert!(matches!(
            interface.function("mint"),
            Err(CatalogError::UnknownFunction(_))
        ));
    }
}
