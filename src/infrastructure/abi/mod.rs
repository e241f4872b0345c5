//! ABI infrastructure - built-in standards, JSON loading and directory scanning

mod loader;
mod scanner;
mod standards;

pub use loader::{load_file, parse_interface};
pub use scanner::AbiScanner;
pub use standards::standard_catalog;
