use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::modules::toolkit::units::DEFAULT_DECIMALS;

pub const DEFAULT_RPC: &str = "http://localhost:8545";
pub const DEFAULT_PRIVATE_KEY_ENV: &str = "CALLSMITH_PRIVATE_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP or WebSocket endpoint
    #[serde(default = "default_rpc")]
    pub rpc: String,

    /// Name of the environment variable holding the signer key
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,

    #[serde(default)]
    pub abi_paths: Vec<String>,

    #[serde(default = "default_decimals")]
    pub default_decimals: u8,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: default_rpc(),
            private_key_env: default_private_key_env(),
            abi_paths: Vec::new(),
            default_decimals: DEFAULT_DECIMALS,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Signer key from the configured environment variable, if set
    pub fn private_key(&self) -> Option<String> {
        std::env::var(&self.private_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

fn default_rpc() -> String {
    DEFAULT_RPC.to_string()
}

fn default_private_key_env() -> String {
    DEFAULT_PRIVATE_KEY_ENV.to_string()
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => Config::default(),
    }
}

/// Load a config file; missing or unparseable files fall back to defaults
pub fn load_from(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring unparseable config");
        Config::default()
    })
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CALLSMITH_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("callsmith").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("callsmith").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "callsmith", "callsmith")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
