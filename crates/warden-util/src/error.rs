//! Error types for wardend

use thiserror::Error;

use crate::RuleId;

/// Core error type for wardend operations
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Rule not found: {0}")]
    RuleNotFound(RuleId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WardenError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, WardenError>;
