//! Preference stores for one-time flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use toolkit_model::{Result, ToolkitError};
use tracing::{debug, info};

use crate::services::PreferenceStore;

type Flags = BTreeMap<String, bool>;

/// Flags persisted to a TOML file, rewritten atomically on every change.
#[derive(Debug)]
pub struct TomlPreferenceStore {
    path: PathBuf,
    flags: Mutex<Flags>,
}

impl TomlPreferenceStore {
    /// Open the store at `path`. A missing file starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let flags = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| ToolkitError::Io(format!("read {}: {e}", path.display())))?;
            toml::from_str(&content)
                .map_err(|e| ToolkitError::Parse(format!("{}: {e}", path.display())))?
        } else {
            debug!(path = %path.display(), "preference file not found, starting empty");
            Flags::new()
        };
        Ok(Self {
            path,
            flags: Mutex::new(flags),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, flags: &Flags) -> Result<()> {
        let content =
            toml::to_string(flags).map_err(|e| ToolkitError::Parse(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("toml.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn set_flag(&self, name: &str, value: bool) -> Result<()> {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        flags.insert(name.to_string(), value);
        self.save(&flags)?;
        info!(name, value, "preference saved");
        Ok(())
    }

    fn flag(&self, name: &str) -> bool {
        self.flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(false)
    }
}

/// Flags kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    flags: Mutex<Flags>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn set_flag(&self, name: &str, value: bool) -> Result<()> {
        self.flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value);
        Ok(())
    }

    fn flag(&self, name: &str) -> bool {
        self.flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_flags_survive_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/prefs.toml");

        let store = TomlPreferenceStore::load(&path).unwrap();
        assert!(!store.flag("CIEHasDoneOnboarding"));
        store.set_flag("CIEHasDoneOnboarding", true).unwrap();

        let reloaded = TomlPreferenceStore::load(&path).unwrap();
        assert!(reloaded.flag("CIEHasDoneOnboarding"));
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "not = [valid").unwrap();

        assert!(matches!(
            TomlPreferenceStore::load(&path),
            Err(ToolkitError::Parse(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        store.set_flag("seen", true).unwrap();
        assert!(store.flag("seen"));
        assert!(!store.flag("other"));
    }
}
