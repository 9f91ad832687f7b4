//! JSON file store implementation

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{AppData, Store, StoreResult};

/// Stores the application document as a single JSON file.
///
/// Writes go to a temp file in the same directory followed by a rename, so
/// a crash mid-write can never leave a torn document behind and overlapping
/// saves resolve to the last completed writer.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonStore {
    fn load(&self) -> AppData {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No document yet, starting empty");
                return AppData::default();
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read document, starting from defaults"
                );
                return AppData::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Corrupt document, starting from defaults"
                );
                AppData::default()
            }
        }
    }

    fn save(&self, data: &AppData) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(data)?;

        // Write atomically using a temp file in the same directory.
        let temp_path = self.path.with_extension("tmp");

        // Remove a temp file left over from a previous failed write.
        let _ = fs::remove_file(&temp_path);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), "Document saved");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.path.parent() {
            Some(parent) => parent.exists() || fs::create_dir_all(parent).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rule;

    #[test]
    fn missing_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("appdata.json"));

        let data = store.load();
        assert!(data.rules.is_empty());
        assert!(data.usage_records.is_empty());
    }

    #[test]
    fn corrupt_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appdata.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonStore::new(&path);
        let data = store.load();
        assert!(data.rules.is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("appdata.json"));

        let mut data = AppData::default();
        data.rules.push(Rule::new("game.exe", 60, 10));
        data.settings.polling_interval_seconds = 10;

        store.save(&data).unwrap();
        let loaded = store.load();
        assert_eq!(loaded, data);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("appdata.json"));

        store.save(&AppData::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn save_replaces_rather_than_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("appdata.json"));

        let mut data = AppData::default();
        data.rules.push(Rule::new("game", 60, 10));
        store.save(&data).unwrap();

        data.rules.clear();
        store.save(&data).unwrap();

        assert!(store.load().rules.is_empty());
    }
}
