use dubbo_console_core::Navigator;

/// Remembers which page the console is on
#[derive(Debug)]
pub struct TerminalNavigator {
    current: String,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        Self {
            current: "/".to_string(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }
}

impl Navigator for TerminalNavigator {
    fn push(&mut self, path: &str) {
        self.current = path.to_string();
    }
}

impl Default for TerminalNavigator {
    fn default() -> Self {
        Self::new()
    }
}
