//! Application settings loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use toolkit_content::DownloadConfig;
use toolkit_view::SearchConfig;
use tracing::debug;

/// Preference recording that the first-run flow was completed.
pub const DEFAULT_ONBOARDING_FLAG: &str = "CIEHasDoneOnboarding";

/// Where one-time flags are stored.
pub const DEFAULT_PREFERENCES_FILE: &str = "toolkit-preferences.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub download: DownloadConfig,
    pub onboarding_flag: String,
    pub preferences_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            download: DownloadConfig::default(),
            onboarding_flag: DEFAULT_ONBOARDING_FLAG.to_string(),
            preferences_file: PathBuf::from(DEFAULT_PREFERENCES_FILE),
        }
    }
}

impl AppConfig {
    /// Load settings from `path`. No path, or a missing file, yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parse settings {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_no_path_gives_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.onboarding_flag, "CIEHasDoneOnboarding");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toolkit.toml");
        fs::write(
            &path,
            "[search]\ndebounce_ms = 250\n\n[download]\nbundle_id = \"7\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.search.settle_window(), Duration::from_millis(250));
        assert_eq!(config.download.bundle_id, "7");
        assert_eq!(config.download.content_dir, PathBuf::from("content"));
        assert_eq!(config.onboarding_flag, DEFAULT_ONBOARDING_FLAG);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toolkit.toml");
        fs::write(&path, "[search\n").unwrap();

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("parse settings"));
    }
}
