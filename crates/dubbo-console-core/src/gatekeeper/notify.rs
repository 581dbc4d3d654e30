use std::fmt;

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// A toast for the user: a short headline plus a longer description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(message: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn error(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(message, description, Severity::Error)
    }

    pub fn success(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(message, description, Severity::Success)
    }
}

/// The surface notifications are shown on.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sends notifications to the log. Useful for headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Error => error!(title = %n.message, detail = %n.description, "notification"),
            Severity::Warning => warn!(title = %n.message, detail = %n.description, "notification"),
            Severity::Info | Severity::Success => {
                info!(title = %n.message, detail = %n.description, severity = %n.severity, "notification")
            }
        }
    }
}
