//! Store trait definition

use crate::{AppData, StoreResult};

/// Persistence gateway for the application document.
pub trait Store: Send + Sync {
    /// Load the persisted document.
    ///
    /// Never fails visibly: a missing or corrupt document yields the default
    /// empty document. In-memory state stays authoritative either way.
    fn load(&self) -> AppData;

    /// Save the document. Best-effort at call sites: callers log failures
    /// and keep running on in-memory state.
    fn save(&self, data: &AppData) -> StoreResult<()>;

    /// Check if the store is usable.
    fn is_healthy(&self) -> bool;
}
