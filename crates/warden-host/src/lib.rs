//! Process host boundary for wardend
//!
//! The enforcement cycle needs exactly two things from the operating
//! system: a snapshot of running processes and a way to terminate one.
//! Both are blocking OS calls and must run outside the engine's state lock,
//! so the trait is synchronous and implementations hold no engine state.

mod mock;
mod system;

pub use mock::*;
pub use system::*;

use std::path::PathBuf;
use thiserror::Error;

/// A running process observed during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,

    /// Short name, e.g. `firefox` or `game.exe`
    pub name: String,

    /// Full executable path, when readable
    pub exe: Option<PathBuf>,
}

impl ProcessInfo {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            exe: None,
        }
    }

    pub fn with_exe(mut self, exe: impl Into<PathBuf>) -> Self {
        self.exe = Some(exe.into());
        self
    }
}

/// Errors from host operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Process {0} is no longer running")]
    ProcessGone(u32),

    #[error("Termination signal was not delivered to process {0}")]
    TerminateFailed(u32),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Host trait - implemented by the live system host and the test mock
pub trait ProcessHost: Send + Sync {
    /// Snapshot of currently running processes.
    ///
    /// Processes whose metadata cannot be read (exited mid-enumeration,
    /// access denied) are omitted rather than reported as errors.
    fn processes(&self) -> Vec<ProcessInfo>;

    /// Request OS-level termination of a process.
    fn terminate(&self, pid: u32) -> HostResult<()>;
}
