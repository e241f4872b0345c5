//! Feature modules
//!
//! - form: per-parameter input state for the selected function
//! - toolkit: encoding, units, checksums, result rendering, error classification

pub mod form;
pub mod toolkit;
