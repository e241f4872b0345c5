//! Type classification for declared Solidity parameter types
//!
//! Everything here is plain string inspection on the declared type, e.g.
//! `uint256`, `address[]`, `(uint256,address)`. Tuple types are opaque: the
//! form never looks inside them and the encoder coerces them as a whole.

/// Suffix that marks a dynamic array type
pub const ARRAY_SUFFIX: &str = "[]";

/// Broad kind of a parameter's base type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    /// intN / uintN
    Numeric,
    /// address
    Address,
    /// Anything else (bool, bytes, string, tuples, nested arrays)
    Other,
}

/// Classification of a declared parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamKind {
    /// Kind of the scalar (or of each element, for arrays)
    pub base: BaseKind,
    /// Whether the form expands this parameter into per-element inputs
    pub array: bool,
}

impl ParamKind {
    /// Classify a declared type string
    pub fn classify(ty: &str) -> Self {
        let array = is_array(ty) && !is_tuple(ty);
        let scalar = if array { element_type(ty) } else { ty };

        // Nested arrays stay opaque literals at the element level
        let base = if is_tuple(scalar) || scalar.ends_with(']') {
            BaseKind::Other
        } else if is_numeric(scalar) {
            BaseKind::Numeric
        } else if is_address(scalar) {
            BaseKind::Address
        } else {
            BaseKind::Other
        };

        Self { base, array }
    }

    pub fn is_numeric(&self) -> bool {
        self.base == BaseKind::Numeric
    }

    pub fn is_address(&self) -> bool {
        self.base == BaseKind::Address
    }
}

/// True for the integer family (`int8`..`int256`, `uint8`..`uint256`)
pub fn is_numeric(ty: &str) -> bool {
    let base = base_type(ty);
    !is_tuple(base) && base.contains("int")
}

/// True if the type ends in the dynamic array suffix
pub fn is_array(ty: &str) -> bool {
    ty.trim().ends_with(ARRAY_SUFFIX)
}

/// Exact match against `address`
pub fn is_address(ty: &str) -> bool {
    ty.trim() == "address"
}

/// True for tuple/struct types like `(uint256,address)` or `(uint256,address)[]`
pub fn is_tuple(ty: &str) -> bool {
    ty.trim_start().starts_with('(')
}

/// Type with every trailing array suffix (`[]` or `[N]`) removed
pub fn base_type(ty: &str) -> &str {
    let mut base = ty.trim();
    while base.ends_with(']') {
        match base.rfind('[') {
            Some(open) => base = &base[..open],
            None => break,
        }
    }
    base
}

/// Type with exactly one trailing `[]` removed
pub fn element_type(ty: &str) -> &str {
    let ty = ty.trim();
    ty.strip_suffix(ARRAY_SUFFIX).unwrap_or(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("uint256"));
        assert!(is_numeric("int8"));
        assert!(is_numeric("uint256[]"));
        assert!(!is_numeric("address"));
        assert!(!is_numeric("string"));
        assert!(!is_numeric("bytes32"));
        assert!(!is_numeric("(uint256,address)"));
    }

    #[test]
    fn test_is_array_and_base_type() {
        assert!(is_array("address[]"));
        assert!(!is_array("address"));
        assert!(!is_array("uint256[3]"));
        assert_eq!(base_type("uint256[]"), "uint256");
        assert_eq!(base_type("uint256[][]"), "uint256");
        assert_eq!(base_type("bytes32[4]"), "bytes32");
        assert_eq!(base_type("address"), "address");
    }

    #[test]
    fn test_base_type_idempotent() {
        for ty in ["uint256[]", "address", "(uint256,bool)[]", "int8[2][]", "string"] {
            let once = base_type(ty);
            assert_eq!(base_type(once), once);
            assert_eq!(is_numeric(ty), is_numeric(ty));
            assert_eq!(is_array(ty), is_array(ty));
        }
    }

    #[test]
    fn test_element_type() {
        assert_eq!(element_type("uint256[][]"), "uint256[]");
        assert_eq!(element_type("address[]"), "address");
        assert_eq!(element_type("address"), "address");
    }

    #[test]
    fn test_classify() {
        let kind = ParamKind::classify("uint256");
        assert!(kind.is_numeric() && !kind.array);

        let kind = ParamKind::classify("address[]");
        assert!(kind.is_address() && kind.array);

        // Tuples are opaque and never expanded
        let kind = ParamKind::classify("(uint256,address)[]");
        assert_eq!(kind.base, BaseKind::Other);
        assert!(!kind.array);

        // Nested arrays expand one level, elements are opaque literals
        let kind = ParamKind::classify("uint256[][]");
        assert!(kind.array);
        assert_eq!(kind.base, BaseKind::Other);
    }
}
