//! Shared utilities for wardend
//!
//! This crate provides:
//! - ID types (RuleId)
//! - Time utilities (wall-clock now with mock-time support)
//! - Error types
//! - Default paths for the data and log directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
