//! Monitoring and enforcement engine for wardend
//!
//! This crate is the heart of wardend, containing:
//! - Rule-to-process matching
//! - Usage accrual and warning/kill threshold evaluation
//! - The rule-edit command surface used by the presentation layer

mod engine;
mod events;
mod matcher;
mod validate;

pub use engine::*;
pub use events::*;
pub use matcher::*;
pub use validate::*;
