//! Data models for registry API responses.
//!
//! The admin backends disagree on response shape: some return the payload
//! bare, others wrap it as `{"code": 1, "data": ...}`. `Envelope` accepts
//! both so callers only ever see the payload.

pub mod rule;
pub mod service;

use serde::Deserialize;

pub use rule::{RuleKind, RuleQuery};
pub use service::{ServiceDetail, ServiceSummary};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}
