//! Configuration for content downloads.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Bundle requested when none is configured.
pub const DEFAULT_BUNDLE_ID: &str = "1";

/// Directory, relative to the working directory, holding downloaded content.
pub const DEFAULT_CONTENT_DIR: &str = "content";

/// Download settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Identifier of the content bundle fetched on first run.
    pub bundle_id: String,

    /// Where downloaded bundles and documents are stored.
    pub content_dir: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            bundle_id: DEFAULT_BUNDLE_ID.to_string(),
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
        }
    }
}
