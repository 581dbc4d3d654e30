//! Authentication state for the console.
//!
//! This module provides:
//! - `CredentialStore`: durable storage of the session token and username
//! - `AuthState`: whether a session token is currently present
//!
//! The token is opaque here. Whether it is still accepted is only ever
//! decided by the registry when a request carrying it comes back 401.

pub mod credentials;

pub use credentials::{AuthState, CredentialStore, TOKEN_KEY, USERNAME_KEY};
