//! Readiness gate for the first-run screen.
//!
//! The screen may close only once the user is ready to proceed and content
//! has been downloaded. Both halves are independent signals; [`ReadinessGate`]
//! joins them so callers wait for one event instead of polling two flags.

use std::sync::Arc;

use tokio::sync::watch;
use toolkit_model::Result;
use tracing::info;

use crate::bus::{NotificationBus, Topic};
use crate::services::PreferenceStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Readiness {
    user_ready: bool,
    has_content: bool,
}

impl Readiness {
    fn is_open(self) -> bool {
        self.user_ready && self.has_content
    }
}

/// Join of "user is ready" and "content is present". Clones share state.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    state: Arc<watch::Sender<Readiness>>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self {
            state: Arc::new(watch::Sender::new(Readiness::default())),
        }
    }

    pub fn mark_user_ready(&self) {
        self.state.send_modify(|state| state.user_ready = true);
    }

    pub fn mark_content_ready(&self) {
        self.state.send_modify(|state| state.has_content = true);
    }

    pub fn is_user_ready(&self) -> bool {
        self.state.borrow().user_ready
    }

    pub fn has_content(&self) -> bool {
        self.state.borrow().has_content
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    /// Resolve once both halves have fired.
    pub async fn wait(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|state| state.is_open()).await;
    }
}

/// First-run flow: the user skips or finishes the intro while the bundle
/// downloads in the background.
pub struct Onboarding<P> {
    gate: ReadinessGate,
    prefs: P,
    flag: String,
}

impl<P: PreferenceStore> Onboarding<P> {
    /// `flag` names the preference recording that onboarding was completed.
    pub fn new(gate: ReadinessGate, prefs: P, flag: impl Into<String>) -> Self {
        Self {
            gate,
            prefs,
            flag: flag.into(),
        }
    }

    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    /// Whether onboarding was completed in an earlier run.
    pub fn is_complete(&self) -> bool {
        self.prefs.flag(&self.flag)
    }

    /// The user skipped the intro.
    pub fn skip(&self) -> Result<()> {
        info!("onboarding skipped");
        self.user_ready()
    }

    /// The intro played to the end.
    pub fn video_finished(&self) -> Result<()> {
        info!("onboarding video finished");
        self.user_ready()
    }

    /// Open the content half of the gate on every `ContentUpdated`.
    pub fn watch_content(&self, bus: &dyn NotificationBus) {
        let gate = self.gate.clone();
        bus.subscribe(
            Topic::ContentUpdated,
            Arc::new(move |_| gate.mark_content_ready()),
        );
    }

    fn user_ready(&self) -> Result<()> {
        self.gate.mark_user_ready();
        self.prefs.set_flag(&self.flag, true)
    }
}

#[cfg(test)]
mod tests {
    use crate::prefs::MemoryPreferenceStore;

    use super::*;

    #[test]
    fn test_gate_needs_both_halves() {
        let gate = ReadinessGate::new();
        assert!(!gate.is_open());
        gate.mark_content_ready();
        assert!(!gate.is_open());
        gate.clone().mark_user_ready();
        assert!(gate.is_open());
    }

    #[test]
    fn test_skip_persists_flag() {
        let onboarding = Onboarding::new(
            ReadinessGate::new(),
            MemoryPreferenceStore::new(),
            "CIEHasDoneOnboarding",
        );
        assert!(!onboarding.is_complete());
        onboarding.skip().unwrap();
        assert!(onboarding.is_complete());
        assert!(onboarding.gate().is_user_ready());
        assert!(!onboarding.gate().is_open());
    }
}
