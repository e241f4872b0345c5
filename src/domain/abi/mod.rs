//! ABI domain models
//!
//! Interfaces, function signatures and the type classifier used by the form.
//! JSON entries are converted from alloy-json-abi at the edge and never
//! carried around afterwards.

mod catalog;
mod function;
pub mod kind;

pub use catalog::{Catalog, CatalogError, Interface, InterfaceOrigin};
pub use function::{compute_selector, FunctionSignature, Mutability, ParamSpec};
pub use kind::{BaseKind, ParamKind};
