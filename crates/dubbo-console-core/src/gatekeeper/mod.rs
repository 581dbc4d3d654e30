//! Request gatekeeper: the policy layer between pages and the registry.
//!
//! - `StatusCodeMap`: HTTP status code to user-facing description
//! - `NavigationGuard`: sends navigation without a session token to login
//! - `ErrorHandler`: turns failed requests into notifications, then hands
//!   the error back so the caller still sees it
//! - `Notifier` / `Navigator`: the seams a front end implements

pub mod guard;
pub mod handler;
pub mod notify;
pub mod status;

pub use guard::{should_redirect, NavigationDecision, NavigationGuard, Navigator, DEFAULT_LOGIN_PATH};
pub use handler::{ErrorHandler, NETWORK_ERROR_DESCRIPTION, NETWORK_ERROR_MESSAGE};
pub use notify::{Notification, Notifier, Severity, TracingNotifier};
pub use status::{StatusCodeMap, UNKNOWN_ERROR_DESCRIPTION};
