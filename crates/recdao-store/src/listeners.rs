//! Per-store listener registry for mutation notifications.
//!
//! Listeners are invoked synchronously by the store that performs a
//! mutation, after the mutation is applied and before the operation's
//! result is returned to the caller.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use recdao_core::Record;

/// Channel name every store notification is published under.
pub const ON: &str = "on";

/// Mutation topics a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Put,
    Remove,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Put => "put",
            Topic::Remove => "remove",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle identifying one subscription; pass it to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The subscription being notified.
    pub subscription: SubscriptionId,
    /// Always [`ON`].
    pub channel: &'static str,
    /// Which mutation happened.
    pub topic: Topic,
    /// The record as stored (for `Put`) or as removed (for `Remove`).
    pub record: Record,
}

impl Notification {
    pub fn new(subscription: SubscriptionId, topic: Topic, record: Record) -> Self {
        Self {
            subscription,
            channel: ON,
            topic,
            record,
        }
    }
}

/// Callback invoked for each matching notification.
pub type Listener = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Entry {
    id: SubscriptionId,
    topic: Option<Topic>,
    listener: Listener,
}

/// Listener registry owned by a single store instance.
pub struct Listeners {
    next_id: AtomicU64,
    entries: RwLock<Vec<Entry>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener for one topic, or for every topic with `None`.
    pub fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        // The registry only holds Arcs, so a poisoned lock still has valid data.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(Entry {
            id,
            topic,
            listener,
        });
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a notification to every listener registered for `topic`.
    ///
    /// Listeners run on a snapshot of the registry with no lock held, so a
    /// listener may subscribe or unsubscribe without deadlocking.
    pub fn notify(&self, topic: Topic, record: &Record) {
        let targets: Vec<(SubscriptionId, Listener)> = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            entries
                .iter()
                .filter(|e| e.topic.map_or(true, |t| t == topic))
                .map(|e| (e.id, Arc::clone(&e.listener)))
                .collect()
        };

        for (id, listener) in targets {
            listener(&Notification::new(id, topic, record.clone()));
        }
    }
}

impl Default for Listeners {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<Notification>>>, Listener) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: Listener = Arc::new(move |n: &Notification| {
            sink.lock().unwrap().push(n.clone());
        });
        (seen, listener)
    }

    #[test]
    fn test_topic_filtering() {
        let listeners = Listeners::new();
        let (puts, on_put) = recorder();
        let (all, on_all) = recorder();

        let put_id = listeners.subscribe(Some(Topic::Put), on_put);
        listeners.subscribe(None, on_all);

        let record = Record::new().with_id(1);
        listeners.notify(Topic::Put, &record);
        listeners.notify(Topic::Remove, &record);

        let puts = puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].subscription, put_id);
        assert_eq!(puts[0].channel, "on");
        assert_eq!(puts[0].topic.as_str(), "put");
        assert_eq!(all.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let listeners = Listeners::new();
        let (seen, listener) = recorder();

        let id = listeners.subscribe(None, listener);
        assert_eq!(listeners.len(), 1);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        assert!(listeners.is_empty());

        listeners.notify(Topic::Put, &Record::new());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let listeners = Arc::new(Listeners::new());
        let registry = Arc::clone(&listeners);
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);

        listeners.subscribe(
            Some(Topic::Put),
            Arc::new(move |n: &Notification| {
                counter.fetch_add(1, Ordering::SeqCst);
                registry.unsubscribe(n.subscription);
            }),
        );

        listeners.notify(Topic::Put, &Record::new());
        listeners.notify(Topic::Put, &Record::new());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
