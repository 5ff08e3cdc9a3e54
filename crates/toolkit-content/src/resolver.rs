//! Resolves tool attachments to local files.

use std::path::PathBuf;

use toolkit_model::{FileDescriptor, Result, ToolkitError};
use tracing::debug;

use crate::services::{ProgressSink, TransferService};
use crate::store::ContentStore;

/// Finds an attachment on disk, downloading it first when needed.
#[derive(Debug, Clone)]
pub struct DocumentResolver<T> {
    store: ContentStore,
    transfer: T,
}

impl<T: TransferService> DocumentResolver<T> {
    pub fn new(store: ContentStore, transfer: T) -> Self {
        Self { store, transfer }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Local path of `attachment`.
    ///
    /// A stored copy is returned without any transfer. Attachments without a
    /// URL cannot be resolved.
    pub async fn resolve(
        &self,
        attachment: &FileDescriptor,
        progress: ProgressSink,
    ) -> Result<PathBuf> {
        let Some(url) = attachment.url() else {
            return Err(ToolkitError::MetadataUnavailable(format!(
                "\"{}\" has no download URL",
                attachment.title()
            )));
        };

        if let Some(path) = self.store.local_file(url) {
            debug!(url, path = %path.display(), "document already stored");
            return Ok(path);
        }

        debug!(url, "downloading document");
        self.transfer.download(url, progress).await
    }
}
