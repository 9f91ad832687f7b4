//! Persistence layer for wardend
//!
//! Provides:
//! - The persisted application document (rules, usage records, settings)
//! - The `Store` trait and the JSON file implementation
//! - An in-memory store for tests

mod json;
mod memory;
mod model;
mod traits;

pub use json::*;
pub use memory::*;
pub use model::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
