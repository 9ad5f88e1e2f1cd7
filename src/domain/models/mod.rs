pub mod auth;
pub mod money;
pub mod notification;
pub mod payment;
pub mod principal;
pub mod property;
pub mod stats;
pub mod tenant;
pub mod visitor;

use thiserror::Error;

/// Raised when a stored or submitted code does not name a known variant.
#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }
}
