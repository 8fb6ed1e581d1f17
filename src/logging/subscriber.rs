//! Live subscribers fed by the ring buffer.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use super::entry::Entry;
use super::level::Level;
use super::threshold::LevelThreshold;

/// Depth of each subscriber's delivery queue.
pub const SUBSCRIBER_QUEUE_DEPTH: usize = 256;

/// Consumer side of one live subscription.
///
/// Obtained from [`RingBuffer::subscribe`](super::RingBuffer::subscribe).
/// Entries arrive in the order they were stored; when the queue is full the
/// ring drops new entries for this subscriber only and bumps
/// [`dropped`](Self::dropped).
///
/// After [`RingBuffer::unsubscribe`](super::RingBuffer::unsubscribe) the
/// sending side is released: entries already queued can still be drained,
/// after which the receive methods report that the subscription is closed.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    filter: LevelThreshold,
    dropped: Arc<AtomicU64>,
    active: Arc<AtomicBool>,
    receiver: Receiver<Entry>,
}

impl Subscription {
    /// Unique identity within the owning ring buffer.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Number of entries dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Take the next queued entry without waiting.
    #[must_use]
    pub fn try_recv(&self) -> Option<Entry> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next entry.
    ///
    /// Returns `Ok(None)` on timeout and `Err(Closed)` once the subscription
    /// has been removed and its queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Closed`] when no further entries can arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Entry>, Closed> {
        match self.receiver.recv_timeout(timeout) {
            Ok(entry) => Ok(Some(entry)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Closed),
        }
    }

    /// Take everything currently queued.
    #[must_use]
    pub fn drain(&self) -> Vec<Entry> {
        self.receiver.try_iter().collect()
    }

    /// Number of entries waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Whether the ring still delivers to this subscription.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(super) const fn filter(&self) -> &LevelThreshold {
        &self.filter
    }
}

/// The subscription has been removed and its queue is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("subscription closed")]
pub struct Closed;

/// Producer side of one subscription, owned by the registry.
#[derive(Debug)]
struct Subscriber {
    id: u64,
    filter: LevelThreshold,
    dropped: Arc<AtomicU64>,
    active: Arc<AtomicBool>,
    sender: Sender<Entry>,
}

/// Outcome of one delivery attempt.
enum Delivery {
    Sent,
    Filtered,
    Dropped,
    Gone,
}

impl Subscriber {
    fn offer(&self, entry: &Entry) -> Delivery {
        if !self.filter.admits(entry.level) {
            return Delivery::Filtered;
        }
        match self.sender.try_send(entry.clone()) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Delivery::Dropped
            }
            Err(TrySendError::Disconnected(_)) => Delivery::Gone,
        }
    }
}

/// Source of subscription ids, shared by every registry in the process so a
/// handle from one ring never matches a subscriber of another.
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(0);

/// Set of live subscribers.
///
/// Not synchronized on its own: the ring buffer keeps it inside the same
/// mutex as its slots so that a write and its fan-out are one step.
#[derive(Debug, Default)]
pub(super) struct Registry {
    live: Vec<Subscriber>,
}

impl Registry {
    pub(super) fn subscribe(&mut self, min_level: Level) -> Subscription {
        let (sender, receiver) = bounded(SUBSCRIBER_QUEUE_DEPTH);
        let id = NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed);
        let filter = LevelThreshold::new(min_level);
        let dropped = Arc::new(AtomicU64::new(0));
        let active = Arc::new(AtomicBool::new(true));
        self.live.push(Subscriber {
            id,
            filter: filter.clone(),
            dropped: Arc::clone(&dropped),
            active: Arc::clone(&active),
            sender,
        });
        Subscription {
            id,
            filter,
            dropped,
            active,
            receiver,
        }
    }

    /// Remove subscriber `id`, releasing its sender.  Returns `false` if it
    /// was not live.
    pub(super) fn unsubscribe(&mut self, id: u64) -> bool {
        let Some(pos) = self.live.iter().position(|s| s.id == id) else {
            return false;
        };
        let removed = self.live.swap_remove(pos);
        removed.active.store(false, Ordering::Release);
        true
    }

    /// Offer `entry` to every live subscriber without blocking.
    ///
    /// Subscribers whose [`Subscription`] has been dropped are pruned.
    /// Returns the number of drops caused by full queues.
    pub(super) fn deliver(&mut self, entry: &Entry) -> usize {
        let mut dropped = 0;
        self.live.retain(|subscriber| match subscriber.offer(entry) {
            Delivery::Sent | Delivery::Filtered => true,
            Delivery::Dropped => {
                dropped += 1;
                true
            }
            Delivery::Gone => false,
        });
        dropped
    }

    pub(super) fn len(&self) -> usize {
        self.live.len()
    }
}
