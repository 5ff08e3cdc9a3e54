//! Configuration for the toolkit view.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default idle time before a typed query is sent to the index.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Search behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Debounce delay in milliseconds. Each keystroke restarts the wait.
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl SearchConfig {
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
