//! Debounced search input.
//!
//! A two-state machine (`Idle`, `PendingQuery`) driven by text-change events
//! and an explicit clock, so it can run under a real timer or a test clock.
//! Every issued query carries a sequence number; results for anything but the
//! latest number are stale and must be dropped.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Debouncer state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DebounceState {
    #[default]
    Idle,
    PendingQuery { text: String, deadline: Instant },
}

/// What the caller must do after a text change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChange {
    /// The text was cleared: show the standard dataset now.
    ShowStandard,
    /// A query is scheduled for `deadline`.
    Scheduled { deadline: Instant },
}

/// A query that is due to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub query: String,
}

/// Coalesces keystrokes into at most one query per settle window.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    settle: Duration,
    state: DebounceState,
    latest_seq: u64,
}

impl SearchDebouncer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            state: DebounceState::Idle,
            latest_seq: 0,
        }
    }

    pub fn settle_window(&self) -> Duration {
        self.settle
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    /// Deadline of the pending query, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Idle => None,
            DebounceState::PendingQuery { deadline, .. } => Some(*deadline),
        }
    }

    /// Handle a text change at `now`. Any pending or in-flight query is
    /// superseded.
    pub fn on_text_change(&mut self, text: &str, now: Instant) -> TextChange {
        if text.is_empty() {
            self.cancel();
            return TextChange::ShowStandard;
        }

        let deadline = now + self.settle;
        trace!(text, "search query rescheduled");
        // Results for the previous text no longer match what was typed.
        self.latest_seq += 1;
        self.state = DebounceState::PendingQuery {
            text: text.to_string(),
            deadline,
        };
        TextChange::Scheduled { deadline }
    }

    /// Issue the pending query if its deadline has passed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<SearchTicket> {
        match &self.state {
            DebounceState::PendingQuery { deadline, .. } if now >= *deadline => {}
            _ => return None,
        }

        let DebounceState::PendingQuery { text, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        self.latest_seq += 1;
        Some(SearchTicket {
            seq: self.latest_seq,
            query: text,
        })
    }

    /// Drop any pending query and invalidate queries already in flight.
    pub fn cancel(&mut self) {
        self.state = DebounceState::Idle;
        self.latest_seq += 1;
    }

    /// Whether results tagged `seq` are still the latest.
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = Duration::from_millis(500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_rapid_typing_fires_once_for_last_text() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(SETTLE);
        let mut fired = Vec::new();

        for (at, text) in [(0, "a"), (100, "ab"), (200, "abc")] {
            debouncer.on_text_change(text, start + ms(at));
        }

        for at in (0..=1500).step_by(10) {
            if let Some(ticket) = debouncer.poll(start + ms(at)) {
                fired.push((at, ticket.query));
            }
        }

        assert_eq!(fired, vec![(700, "abc".to_string())]);
    }

    #[test]
    fn test_clearing_text_cancels_pending_query() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(SETTLE);

        debouncer.on_text_change("water", start);
        let change = debouncer.on_text_change("", start + ms(100));

        assert_eq!(change, TextChange::ShowStandard);
        assert_eq!(debouncer.state(), &DebounceState::Idle);
        assert!(debouncer.poll(start + ms(5000)).is_none());
    }

    #[test]
    fn test_stale_results_are_detected() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(SETTLE);

        debouncer.on_text_change("cash", start);
        let first = debouncer.poll(start + SETTLE).expect("first ticket");
        assert!(debouncer.is_current(first.seq));

        debouncer.on_text_change("cash grants", start + ms(600));
        assert!(!debouncer.is_current(first.seq));
        let second = debouncer.poll(start + ms(1100)).expect("second ticket");

        assert!(!debouncer.is_current(first.seq));
        assert!(debouncer.is_current(second.seq));
    }

    #[test]
    fn test_cancel_invalidates_in_flight_query() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(SETTLE);

        debouncer.on_text_change("cash", start);
        let ticket = debouncer.poll(start + SETTLE).expect("ticket");
        debouncer.cancel();

        assert!(!debouncer.is_current(ticket.seq));
        assert_eq!(debouncer.deadline(), None);
    }
}
