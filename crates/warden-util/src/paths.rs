//! Default paths for wardend components
//!
//! Paths are user-writable by default (no root required):
//! - Data: `$XDG_DATA_HOME/wardend` or `~/.local/share/wardend`
//! - Logs: `$XDG_STATE_HOME/wardend` or `~/.local/state/wardend`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const WARDEN_DATA_DIR_ENV: &str = "WARDEN_DATA_DIR";

/// Filename of the persisted application document
pub const DATA_FILENAME: &str = "appdata.json";

/// Application subdirectory name
const APP_DIR: &str = "wardend";

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$WARDEN_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/wardend` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/wardend` (fallback)
pub fn default_data_dir() -> PathBuf {
    // Check environment override first
    if let Ok(path) = std::env::var(WARDEN_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking WARDEN_DATA_DIR env var.
pub fn data_dir_without_env() -> PathBuf {
    // Try XDG_DATA_HOME first
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    // Fallback to ~/.local/share/wardend
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default log directory.
///
/// Order of precedence:
/// 1. `$XDG_STATE_HOME/wardend` (if XDG_STATE_HOME is set)
/// 2. `~/.local/state/wardend` (fallback)
pub fn default_log_dir() -> PathBuf {
    // Try XDG_STATE_HOME first
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home).join(APP_DIR);
    }

    // Fallback to ~/.local/state/wardend
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_contains_wardend() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("wardend"));
    }

    #[test]
    fn log_dir_contains_wardend() {
        let path = default_log_dir();
        assert!(path.to_string_lossy().contains("wardend"));
    }

}
