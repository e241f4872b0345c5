//! Actions that commands return to the prompt loop

/// Actions returned by the workbench to communicate side effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// Copy text to the clipboard
    Copy(String),

    /// Show a notification line
    Notify(String, NotifyLevel),

    /// Print a multi-line listing
    Print(Vec<String>),

    /// Request quit
    Quit,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}

impl NotifyLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            NotifyLevel::Info => "",
            NotifyLevel::Warn => "warning: ",
            NotifyLevel::Error => "error: ",
        }
    }
}
