use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use dubbo_console_core::{Notification, Notifier, Severity};

fn icon(severity: Severity) -> (&'static str, Color) {
    match severity {
        Severity::Info => ("ℹ", Color::Blue),
        Severity::Success => ("✓", Color::Green),
        Severity::Warning => ("!", Color::Yellow),
        Severity::Error => ("✗", Color::Red),
    }
}

/// Plain two-line rendering, used when stderr is not a terminal
pub fn render_plain(n: &Notification) -> String {
    let (icon, _) = icon(n.severity);
    if n.description.is_empty() {
        format!("{} {}", icon, n.message)
    } else {
        format!("{} {}\n  {}", icon, n.message, n.description)
    }
}

/// Prints notifications to stderr, coloured when `color` is set
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, n: Notification) {
        let mut stderr = io::stderr().lock();
        let result = if self.color {
            let (icon, color) = icon(n.severity);
            writeln!(stderr, "{} {}", icon.with(color).bold(), n.message.as_str().bold())
                .and_then(|_| {
                    if n.description.is_empty() {
                        Ok(())
                    } else {
                        writeln!(stderr, "  {}", n.description.as_str().dim())
                    }
                })
        } else {
            writeln!(stderr, "{}", render_plain(&n))
        };
        // Nowhere left to report a failed stderr write
        let _ = result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_with_description() {
        let n = Notification::error("Network abnormality", "Your network is abnormal, unable to connect to the server");
        assert_eq!(
            render_plain(&n),
            "✗ Network abnormality\n  Your network is abnormal, unable to connect to the server"
        );
    }

    #[test]
    fn test_render_plain_without_description() {
        let n = Notification::success("Login successful!", "");
        assert_eq!(render_plain(&n), "✓ Login successful!");
    }
}
