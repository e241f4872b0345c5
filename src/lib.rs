//! callsmith - build, encode and execute EVM contract calls from typed forms

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod modules;
