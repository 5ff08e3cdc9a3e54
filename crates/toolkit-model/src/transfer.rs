//! Transient values exchanged with search and download collaborators.

use std::sync::Arc;

use crate::module::Module;

/// A tool returned by the index, with the label of the bucket it groups under.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub tool: Arc<Module>,
    pub parent: String,
}

impl SearchHit {
    pub fn new(tool: Arc<Module>, parent: impl Into<String>) -> Self {
        Self {
            tool,
            parent: parent.into(),
        }
    }
}

/// Metadata describing a downloadable bundle. Fetched per download attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BundleInfo {
    /// Where the bundle can be downloaded. `None` means nothing to download.
    pub download_url: Option<String>,
}

impl BundleInfo {
    pub fn new(download_url: impl Into<String>) -> Self {
        Self {
            download_url: Some(download_url.into()),
        }
    }

    /// Bundle info that carries no download URL.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Progress of an in-flight transfer, forwarded unmodified to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferProgress {
    /// Completed fraction in `0.0..=1.0`; `0.0` while the total is unknown.
    pub fraction: f64,
    /// Bytes received so far.
    pub downloaded: u64,
    /// Expected total bytes; `0` when the server did not say.
    pub total: u64,
}

impl TransferProgress {
    #[must_use]
    pub fn new(downloaded: u64, total: u64) -> Self {
        let fraction = if total == 0 {
            0.0
        } else {
            (downloaded as f64 / total as f64).min(1.0)
        };
        Self {
            fraction,
            downloaded,
            total,
        }
    }

    /// Progress as a percentage (0 to 100).
    #[must_use]
    pub fn percentage(&self) -> u8 {
        (self.fraction * 100.0).clamp(0.0, 100.0) as u8
    }
}
