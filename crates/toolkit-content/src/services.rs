//! Collaborators consumed by the download workflow.
//!
//! The coordinator only sees these traits; `HttpTransfer` and the preference
//! stores are the concrete implementations shipped with the crate.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use toolkit_model::{BundleInfo, Result, TransferProgress};

/// Receives progress events of a running transfer.
pub type ProgressSink = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// A sink that drops every event.
pub fn ignore_progress() -> ProgressSink {
    Arc::new(|_| {})
}

/// Resolves a bundle identifier to its download location.
pub trait BundleMetadataService: Send + Sync {
    fn bundle_info(&self, bundle_id: &str) -> impl Future<Output = Result<BundleInfo>> + Send;
}

/// Downloads a URL to local storage.
pub trait TransferService: Send + Sync {
    /// Download `url`, reporting progress to `progress`, and return the local path.
    fn download(
        &self,
        url: &str,
        progress: ProgressSink,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

impl<M: BundleMetadataService> BundleMetadataService for Arc<M> {
    fn bundle_info(&self, bundle_id: &str) -> impl Future<Output = Result<BundleInfo>> + Send {
        (**self).bundle_info(bundle_id)
    }
}

impl<T: TransferService> TransferService for Arc<T> {
    fn download(
        &self,
        url: &str,
        progress: ProgressSink,
    ) -> impl Future<Output = Result<PathBuf>> + Send {
        (**self).download(url, progress)
    }
}

/// Persists one-time completion flags.
pub trait PreferenceStore: Send + Sync {
    fn set_flag(&self, name: &str, value: bool) -> Result<()>;

    /// Current value of `name`; unset flags read as `false`.
    fn flag(&self, name: &str) -> bool;
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for Arc<P> {
    fn set_flag(&self, name: &str, value: bool) -> Result<()> {
        (**self).set_flag(name, value)
    }

    fn flag(&self, name: &str) -> bool {
        (**self).flag(name)
    }
}

/// Metadata source that always answers with the same bundle info.
#[derive(Debug, Clone, Default)]
pub struct StaticBundleSource {
    info: BundleInfo,
}

impl StaticBundleSource {
    pub fn new(info: BundleInfo) -> Self {
        Self { info }
    }

    /// Every bundle downloads from `url`.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(BundleInfo::new(url))
    }
}

impl BundleMetadataService for StaticBundleSource {
    async fn bundle_info(&self, _bundle_id: &str) -> Result<BundleInfo> {
        Ok(self.info.clone())
    }
}
