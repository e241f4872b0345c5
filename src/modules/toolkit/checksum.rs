//! Ethereum address validation and checksum (EIP-55)

use alloy_primitives::Address;

/// Length of a `0x`-prefixed address
pub const ADDRESS_LEN: usize = 42;

/// Tri-state validity of an address input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressValidity {
    /// Input does not look like a hex address yet (no `0x` prefix)
    #[default]
    NotApplicable,
    /// Wrong length, non-hex digits, or a mixed-case checksum mismatch
    Invalid,
    /// Correct shape; checksum verified when the input is mixed-case
    Valid,
}

impl AddressValidity {
    pub fn symbol(&self) -> &'static str {
        match self {
            AddressValidity::NotApplicable => " ",
            AddressValidity::Invalid => "✗",
            AddressValidity::Valid => "✓",
        }
    }
}

/// Validate an address as typed by the user
///
/// All-lowercase and all-uppercase inputs are accepted without a checksum;
/// once casing is mixed it must match EIP-55.
pub fn validate_address(input: &str) -> AddressValidity {
    let Some(digits) = input.strip_prefix("0x") else {
        return AddressValidity::NotApplicable;
    };

    if input.len() != ADDRESS_LEN || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return AddressValidity::Invalid;
    }

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return AddressValidity::Valid;
    }

    if to_checksum_address(digits).as_deref() == Some(input) {
        AddressValidity::Valid
    } else {
        AddressValidity::Invalid
    }
}

/// Render 40 hex digits (any case, no prefix) as an EIP-55 checksummed address
pub fn to_checksum_address(addr: &str) -> Option<String> {
    addr.parse::<Address>()
        .ok()
        .map(|address| address.to_checksum(None))
}
