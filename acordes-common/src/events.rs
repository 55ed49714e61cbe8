//! Storage change events and the change bus
//!
//! Several cache instances ("tabs") may share one durable store. Each
//! successful durable write is announced on a [`ChangeBus`] so the other
//! instances can drop their in-process snapshot of that key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A durable store key was rewritten by some instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageChange {
    /// Durable store key that changed
    pub key: String,
    /// Instance that performed the write
    pub writer: Uuid,
    /// When the write happened
    pub timestamp: DateTime<Utc>,
}

impl StorageChange {
    pub fn new(key: impl Into<String>, writer: Uuid) -> Self {
        Self {
            key: key.into(),
            writer,
            timestamp: crate::time::now(),
        }
    }
}

/// Broadcast channel carrying [`StorageChange`] notifications
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers never block writers)
/// - Any number of subscribers
/// - Synchronous draining via `try_recv`, so single-threaded callers
///   never need a runtime
///
/// Cloning the bus yields another handle to the same channel.
///
/// # Examples
///
/// ```
/// use acordes_common::events::{ChangeBus, StorageChange};
/// use uuid::Uuid;
///
/// let bus = ChangeBus::new(64);
/// let mut rx = bus.subscribe();
///
/// bus.publish(StorageChange::new("acordesai_history", Uuid::new_v4()));
/// assert_eq!(rx.try_recv().unwrap().key, "acordesai_history");
/// ```
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<StorageChange>,
    capacity: usize,
}

impl ChangeBus {
    /// Creates a new bus buffering up to `capacity` undelivered notifications
    /// per subscriber. Subscribers that fall further behind observe a lag.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to all future notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.tx.subscribe()
    }

    /// Publish a notification, ignoring the case where nobody listens
    pub fn publish(&self, change: StorageChange) {
        let _ = self.tx.send(change);
    }

    /// Current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured per-subscriber capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = ChangeBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(StorageChange::new("k", Uuid::new_v4()));
    }

    #[test]
    fn test_every_subscriber_receives_change() {
        let bus = ChangeBus::new(4);
        let mut a = bus.subscribe();
        let mut b = bus.clone().subscribe();
        let writer = Uuid::new_v4();

        bus.publish(StorageChange::new("acordesai_favorites", writer));

        assert_eq!(a.try_recv().unwrap().writer, writer);
        assert_eq!(b.try_recv().unwrap().key, "acordesai_favorites");
        assert!(matches!(a.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_slow_subscriber_observes_lag() {
        let bus = ChangeBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..5 {
            bus.publish(StorageChange::new("k", Uuid::new_v4()));
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(_))));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bus = ChangeBus::new(0);
        assert_eq!(bus.capacity(), 1);
    }
}
