//! REST API client module for the registry admin backend.
//!
//! This module provides the `ApiClient` for listing services, applications
//! and consumers, and for managing governance rules.
//!
//! The backend authenticates with an opaque token sent verbatim in the
//! `Authorization` header, obtained from `/user/login`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
