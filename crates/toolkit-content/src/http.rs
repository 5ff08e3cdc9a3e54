//! HTTP transfer with streamed progress.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, USER_AGENT};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use toolkit_model::{Result, ToolkitError, TransferProgress};
use tracing::{debug, info, warn};

use crate::services::{ProgressSink, TransferService};
use crate::store::ContentStore;

/// User agent string for download requests.
const USER_AGENT_VALUE: &str = concat!("emergency-toolkit/", env!("CARGO_PKG_VERSION"));

/// Minimum time between two progress events.
const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_millis(100);

/// Downloads over HTTP(S) into a [`ContentStore`].
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: reqwest::Client,
    store: ContentStore,
}

impl HttpTransfer {
    pub fn new(store: ContentStore) -> Self {
        Self::with_client(reqwest::Client::new(), store)
    }

    pub fn with_client(client: reqwest::Client, store: ContentStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }
}

impl TransferService for HttpTransfer {
    async fn download(&self, url: &str, progress: ProgressSink) -> Result<PathBuf> {
        info!("Starting download from {}", url);

        let mut response = self
            .client
            .get(url)
            .header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolkitError::TransferFailed(format!(
                "download failed with status {status}"
            )));
        }

        let target = self.store.path_for(url);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        let partial = partial_path(&target);
        let mut throttle = ProgressThrottle::new(response.content_length().unwrap_or(0));
        let written = match write_partial(&mut response, &partial, &mut throttle, &progress).await
        {
            Ok(()) => fs::rename(&partial, &target).await.map_err(ToolkitError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            warn!(error = %err, partial = %partial.display(), "discarding partial download");
            if let Err(cleanup) = fs::remove_file(&partial).await {
                debug!(error = %cleanup, "partial download not removed");
            }
            return Err(err);
        }

        let done = throttle.finish();
        progress(done);

        info!(
            "Download complete: {} to {}",
            format_bytes(done.downloaded),
            target.display()
        );
        Ok(target)
    }
}

/// Stream the response body into `partial`.
async fn write_partial(
    response: &mut reqwest::Response,
    partial: &Path,
    throttle: &mut ProgressThrottle,
    progress: &ProgressSink,
) -> Result<()> {
    let mut file = fs::File::create(partial).await?;
    while let Some(chunk) = response.chunk().await.map_err(network_error)? {
        file.write_all(&chunk).await?;
        if let Some(update) = throttle.advance(chunk.len() as u64, Instant::now()) {
            progress(update);
        }
    }
    file.sync_all().await?;
    Ok(())
}

fn network_error(err: reqwest::Error) -> ToolkitError {
    debug!(error = %err, "request failed");
    ToolkitError::TransferFailed(err.to_string())
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// Counts received bytes and rate-limits progress events.
#[derive(Debug)]
struct ProgressThrottle {
    downloaded: u64,
    total: u64,
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    fn new(total: u64) -> Self {
        Self {
            downloaded: 0,
            total,
            last_emit: None,
        }
    }

    fn advance(&mut self, bytes: u64, now: Instant) -> Option<TransferProgress> {
        self.downloaded += bytes;
        let due = self
            .last_emit
            .is_none_or(|last| now.duration_since(last) >= PROGRESS_UPDATE_INTERVAL);
        if due {
            self.last_emit = Some(now);
            Some(TransferProgress::new(self.downloaded, self.total))
        } else {
            None
        }
    }

    /// Final event. An unknown total becomes the received byte count.
    fn finish(&self) -> TransferProgress {
        let total = if self.total == 0 {
            self.downloaded
        } else {
            self.total
        };
        TransferProgress::new(self.downloaded, total)
    }
}

/// Format bytes as a human-readable string.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}
