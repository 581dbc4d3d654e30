//! Terminal stand-ins for the browser's toast surface and router.

pub mod navigator;
pub mod notify;

pub use navigator::TerminalNavigator;
pub use notify::TerminalNotifier;
