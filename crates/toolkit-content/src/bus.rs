//! Publish/subscribe announcements between content and view components.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// Announcements carried on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A content bundle finished downloading.
    ContentUpdated,
    /// The content index was rebuilt.
    ModulesIndexed,
}

/// Callback invoked for every publication of a subscribed topic.
pub type Handler = Arc<dyn Fn(Topic) + Send + Sync>;

/// Explicit publish/subscribe channel.
pub trait NotificationBus: Send + Sync {
    fn publish(&self, topic: Topic);

    fn subscribe(&self, topic: Topic, handler: Handler);
}

/// In-process bus. Handlers run synchronously on the publishing thread.
#[derive(Default)]
pub struct LocalBus {
    handlers: Mutex<HashMap<Topic, Vec<Handler>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handlers registered for `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&topic)
            .map_or(0, Vec::len)
    }
}

impl NotificationBus for LocalBus {
    fn publish(&self, topic: Topic) {
        // Handlers may subscribe or publish themselves, so run them unlocked.
        let handlers = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&topic)
            .cloned()
            .unwrap_or_default();

        debug!(?topic, subscribers = handlers.len(), "publishing");
        for handler in handlers {
            handler(topic);
        }
    }

    fn subscribe(&self, topic: Topic, handler: Handler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic)
            .or_default()
            .push(handler);
    }
}

impl fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        let counts: HashMap<_, _> = handlers.iter().map(|(t, h)| (*t, h.len())).collect();
        f.debug_struct("LocalBus").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_publish_reaches_only_matching_subscribers() {
        let bus = LocalBus::new();
        let updated = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&updated);
        bus.subscribe(
            Topic::ContentUpdated,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        bus.publish(Topic::ContentUpdated);
        bus.publish(Topic::ModulesIndexed);
        bus.publish(Topic::ContentUpdated);

        assert_eq!(updated.load(Ordering::SeqCst), 2);
        assert_eq!(bus.subscriber_count(Topic::ContentUpdated), 1);
        assert_eq!(bus.subscriber_count(Topic::ModulesIndexed), 0);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = Arc::new(LocalBus::new());
        let indexed = Arc::new(AtomicUsize::new(0));

        let relay = Arc::clone(&bus);
        bus.subscribe(
            Topic::ContentUpdated,
            Arc::new(move |_| relay.publish(Topic::ModulesIndexed)),
        );
        let counter = Arc::clone(&indexed);
        bus.subscribe(
            Topic::ModulesIndexed,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        bus.publish(Topic::ContentUpdated);
        assert_eq!(indexed.load(Ordering::SeqCst), 1);
    }
}
