//! Core library for the Dubbo admin console.
//!
//! The console is a thin client over a service registry's admin REST API.
//! What it owns locally is small: a durable credential store holding the
//! session token and username, and a request gatekeeper that attaches the
//! token to outgoing calls, turns failed responses into user-facing
//! notifications, and sends unauthenticated navigation to the login page.
//!
//! Front ends plug in their own [`gatekeeper::Notifier`] and
//! [`gatekeeper::Navigator`].

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod gatekeeper;
pub mod models;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, CredentialStore};
pub use catalog::{ItemCatalog, ItemKind};
pub use config::{Config, StorageBackend};
pub use gatekeeper::{
    ErrorHandler, NavigationDecision, NavigationGuard, Navigator, Notification, Notifier,
    Severity, StatusCodeMap, TracingNotifier,
};
pub use models::{RuleKind, RuleQuery, ServiceDetail, ServiceSummary};
pub use storage::{FileStorage, KeyValueStorage, KeyringStorage, MemoryStorage, StorageError};
