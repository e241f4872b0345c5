//! Toolkit for calldata encoding and result handling

pub mod checksum;
pub mod encode;
pub mod errors;
pub mod result;
pub mod units;

use crate::core::{Action, NotifyLevel};

/// Result of a toolkit operation
pub struct ToolResult {
    pub title: String,
    pub content: Vec<(String, String)>, // (label, value) pairs
}

impl ToolResult {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Vec::new(),
        }
    }

    pub fn add(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.content.push((label.into(), value.into()));
        self
    }

    pub fn into_action(self) -> Action {
        Action::Notify(self.to_string(), NotifyLevel::Info)
    }
}

impl std::fmt::Display for ToolResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = self
            .content
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(" | ");
        write!(f, "{} - {}", self.title, msg)
    }
}
