//! Download coordinator.
//!
//! Drives one bundle download at a time through
//! `Idle -> FetchingMetadata -> Downloading -> {Completed, Failed}`. The state
//! lives in a `watch` channel: transitions are made under its lock, which is
//! what rejects a second request while one is in flight, and observers can
//! follow every transition without polling.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use toolkit_model::{Result, ToolkitError};
use tracing::{error, info, warn};

use crate::bus::{NotificationBus, Topic};
use crate::services::{BundleMetadataService, ProgressSink, TransferService, ignore_progress};

/// Where a coordinator is in its download workflow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadState {
    #[default]
    Idle,
    FetchingMetadata {
        bundle_id: String,
    },
    Downloading {
        bundle_id: String,
        url: String,
    },
    Completed {
        bundle_id: String,
        path: PathBuf,
    },
    Failed {
        bundle_id: String,
        error: ToolkitError,
    },
}

impl DownloadState {
    /// Whether a request is being worked on.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::FetchingMetadata { .. } | Self::Downloading { .. }
        )
    }

    #[must_use]
    pub fn bundle_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::FetchingMetadata { bundle_id }
            | Self::Downloading { bundle_id, .. }
            | Self::Completed { bundle_id, .. }
            | Self::Failed { bundle_id, .. } => Some(bundle_id),
        }
    }

    /// Short label for status displays.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingMetadata { .. } => "fetching metadata",
            Self::Downloading { .. } => "downloading",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Coordinates bundle downloads for one content location.
pub struct DownloadCoordinator<M, T> {
    metadata: M,
    transfer: T,
    bus: Arc<dyn NotificationBus>,
    progress: ProgressSink,
    state: watch::Sender<DownloadState>,
    has_content: AtomicBool,
}

impl<M, T> DownloadCoordinator<M, T>
where
    M: BundleMetadataService,
    T: TransferService,
{
    pub fn new(metadata: M, transfer: T, bus: Arc<dyn NotificationBus>) -> Self {
        Self {
            metadata,
            transfer,
            bus,
            progress: ignore_progress(),
            state: watch::Sender::new(DownloadState::Idle),
            has_content: AtomicBool::new(false),
        }
    }

    /// Forward transfer progress to `observer`, unmodified.
    #[must_use]
    pub fn with_progress(mut self, observer: ProgressSink) -> Self {
        self.progress = observer;
        self
    }

    pub fn state(&self) -> DownloadState {
        self.state.borrow().clone()
    }

    /// Follow state transitions.
    pub fn subscribe(&self) -> watch::Receiver<DownloadState> {
        self.state.subscribe()
    }

    /// Whether any download has completed on this coordinator.
    pub fn has_content(&self) -> bool {
        self.has_content.load(Ordering::Acquire)
    }

    /// Download bundle `bundle_id`.
    ///
    /// Returns [`ToolkitError::Busy`] without touching the running request when
    /// one is already in flight.
    pub async fn download(&self, bundle_id: &str) -> Result<PathBuf> {
        let bundle_id = self.begin(Some(bundle_id))?;
        self.run_guarded(bundle_id).await
    }

    /// Re-run the last failed request.
    pub async fn retry(&self) -> Result<PathBuf> {
        let bundle_id = self.begin(None)?;
        info!(bundle_id, "retrying download");
        self.run_guarded(bundle_id).await
    }

    /// Run a request that has entered `FetchingMetadata`. A caller that drops
    /// the future early leaves the request `Failed` rather than in flight.
    async fn run_guarded(&self, bundle_id: String) -> Result<PathBuf> {
        let mut guard = CancelGuard {
            state: &self.state,
            bundle_id: Some(bundle_id.clone()),
        };
        let result = self.run(bundle_id).await;
        guard.bundle_id = None;
        result
    }

    /// Enter `FetchingMetadata` for `requested`, or for the failed bundle when
    /// retrying. The check and the transition happen under one lock.
    fn begin(&self, requested: Option<&str>) -> Result<String> {
        let mut outcome = Err(ToolkitError::Busy);
        self.state.send_if_modified(|state| {
            let bundle_id = match (&*state, requested) {
                (current, _) if current.is_in_flight() => return false,
                (_, Some(bundle_id)) => bundle_id.to_string(),
                (DownloadState::Failed { bundle_id, .. }, None) => bundle_id.clone(),
                (_, None) => {
                    outcome = Err(ToolkitError::NothingToRetry);
                    return false;
                }
            };
            *state = DownloadState::FetchingMetadata {
                bundle_id: bundle_id.clone(),
            };
            outcome = Ok(bundle_id);
            true
        });
        outcome
    }

    async fn run(&self, bundle_id: String) -> Result<PathBuf> {
        info!(bundle_id, "fetching bundle metadata");
        let url = match self.metadata.bundle_info(&bundle_id).await {
            Ok(info) => match info.download_url {
                Some(url) => url,
                None => {
                    let error = ToolkitError::MetadataUnavailable(format!(
                        "bundle {bundle_id} has no download URL"
                    ));
                    return Err(self.fail(bundle_id, error));
                }
            },
            Err(err) => return Err(self.fail(bundle_id, as_metadata_error(err))),
        };

        info!(bundle_id, url, "downloading bundle");
        self.state.send_replace(DownloadState::Downloading {
            bundle_id: bundle_id.clone(),
            url: url.clone(),
        });

        match self.transfer.download(&url, Arc::clone(&self.progress)).await {
            Ok(path) => {
                info!(bundle_id, path = %path.display(), "bundle downloaded");
                self.has_content.store(true, Ordering::Release);
                self.state.send_replace(DownloadState::Completed {
                    bundle_id,
                    path: path.clone(),
                });
                self.bus.publish(Topic::ContentUpdated);
                Ok(path)
            }
            Err(err) => Err(self.fail(bundle_id, as_transfer_error(err))),
        }
    }

    fn fail(&self, bundle_id: String, error: ToolkitError) -> ToolkitError {
        error!(bundle_id, %error, "download failed");
        self.state.send_replace(DownloadState::Failed {
            bundle_id,
            error: error.clone(),
        });
        error
    }
}

/// Marks an abandoned request failed so later requests are not rejected as
/// busy.
struct CancelGuard<'a> {
    state: &'a watch::Sender<DownloadState>,
    /// `None` once the request has finished on its own.
    bundle_id: Option<String>,
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        let Some(bundle_id) = self.bundle_id.take() else {
            return;
        };
        warn!(bundle_id, "download cancelled");
        self.state.send_if_modified(|state| {
            if !state.is_in_flight() {
                return false;
            }
            *state = DownloadState::Failed {
                bundle_id,
                error: ToolkitError::TransferFailed("download cancelled".to_string()),
            };
            true
        });
    }
}

fn as_metadata_error(err: ToolkitError) -> ToolkitError {
    match err {
        ToolkitError::MetadataUnavailable(_) => err,
        other => ToolkitError::MetadataUnavailable(other.to_string()),
    }
}

fn as_transfer_error(err: ToolkitError) -> ToolkitError {
    match err {
        ToolkitError::TransferFailed(_) => err,
        other => ToolkitError::TransferFailed(other.to_string()),
    }
}
