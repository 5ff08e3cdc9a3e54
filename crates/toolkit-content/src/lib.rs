//! Content side of the emergency toolkit.
//!
//! - [`DownloadCoordinator`]: one bundle download at a time, with retry
//! - [`HttpTransfer`] and [`ContentStore`]: where downloads come from and go
//! - [`DocumentResolver`]: attachments to local files
//! - [`LocalBus`]: "content updated" / "modules indexed" announcements
//! - [`ReadinessGate`] and [`Onboarding`]: the first-run join

pub mod bus;
pub mod config;
pub mod coordinator;
pub mod gate;
pub mod http;
pub mod prefs;
pub mod resolver;
pub mod services;
pub mod store;

pub use bus::{Handler, LocalBus, NotificationBus, Topic};
pub use config::DownloadConfig;
pub use coordinator::{DownloadCoordinator, DownloadState};
pub use gate::{Onboarding, ReadinessGate};
pub use http::{HttpTransfer, format_bytes};
pub use prefs::{MemoryPreferenceStore, TomlPreferenceStore};
pub use resolver::DocumentResolver;
pub use services::{
    BundleMetadataService, PreferenceStore, ProgressSink, StaticBundleSource, TransferService,
    ignore_progress,
};
pub use store::ContentStore;
