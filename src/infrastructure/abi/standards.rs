//! Built-in standard interfaces embedded at compile time

use tracing::warn;

use super::loader::parse_interface;
use crate::domain::abi::{Catalog, InterfaceOrigin};

/// (display name, ABI JSON)
const STANDARDS: &[(&str, &str)] = &[
    ("ERC20 - Token Standard", include_str!("../../../abis/erc20.json")),
    ("ERC721 - Non-Fungible Token", include_str!("../../../abis/erc721.json")),
    ("ERC1155 - Multi Token", include_str!("../../../abis/erc1155.json")),
    ("ERC165 - Interface Detection", include_str!("../../../abis/erc165.json")),
    ("ERC677 - TransferAndCall Token", include_str!("../../../abis/erc677.json")),
    ("ERC2612 - Permit", include_str!("../../../abis/erc2612.json")),
    ("Ownable - Access Control", include_str!("../../../abis/ownable.json")),
    ("AccessControl - RBAC", include_str!("../../../abis/access_control.json")),
    ("Pausable - Circuit Breaker", include_str!("../../../abis/pausable.json")),
    ("ERC4626 - Tokenized Vault", include_str!("../../../abis/erc4626.json")),
    ("ERC2981 - NFT Royalty", include_str!("../../../abis/erc2981.json")),
    ("Chainlink - Price Feed", include_str!("../../../abis/chainlink_price_feed.json")),
];

/// Catalog holding every built-in standard
pub fn standard_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for (name, json) in STANDARDS {
        match parse_interface(name, json, InterfaceOrigin::Standard) {
            Ok(interface) => catalog.insert(interface),
            Err(err) => {
                warn!(standard = name, error = %err, "skipping built-in interface");
                catalog.errors.push(format!("{}: {}", name, err));
            }
        }
    }
    catalog
}
