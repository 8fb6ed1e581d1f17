//! Fixed-capacity history of recent entries with live fan-out.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::entry::Entry;
use super::layer::DIAGNOSTIC_TARGET;
use super::level::Level;
use super::subscriber::{Registry, Subscription};

/// Capacity used when a non-positive capacity is requested.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Point-in-time counters for a [`RingBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingStats {
    /// Number of slots.
    pub capacity: usize,
    /// Valid entries currently held, `min(total_writes, capacity)`.
    pub len: usize,
    /// Entries written since construction or the last resize.
    pub total_writes: u64,
    /// Live subscriptions.
    pub subscribers: usize,
}

/// Slots, cursor, counters and the subscriber set; one unit behind one lock.
#[derive(Debug)]
struct RingState {
    slots: Vec<Option<Entry>>,
    cursor: usize,
    total: u64,
    registry: Registry,
}

impl RingState {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            cursor: 0,
            total: 0,
            registry: Registry::default(),
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        usize::try_from(self.total).map_or(self.capacity(), |total| total.min(self.capacity()))
    }

    /// Claim the cursor slot and advance.  Returns the claimed index.
    fn advance(&mut self) -> usize {
        let at = self.cursor;
        self.cursor = (self.cursor + 1) % self.capacity();
        self.total += 1;
        at
    }

    /// Store `entry` without notifying subscribers.
    fn store(&mut self, entry: Entry) {
        let at = self.advance();
        if let Some(slot) = self.slots.get_mut(at) {
            *slot = Some(entry);
        }
    }

    /// Store `entry` and offer it to every live subscriber.
    fn push(&mut self, entry: Entry) {
        let at = self.advance();
        if let Some(slot) = self.slots.get_mut(at) {
            let stored = slot.insert(entry);
            self.registry.deliver(stored);
        }
    }

    /// Valid entries, oldest first.
    fn chronological(&self) -> impl Iterator<Item = &Entry> {
        let capacity = self.capacity();
        let len = self.len();
        let start = (self.cursor + capacity - len) % capacity;
        (0..len).filter_map(move |i| self.slots.get((start + i) % capacity)?.as_ref())
    }
}

/// Bounded, thread-safe history of the most recent log entries.
///
/// Every write overwrites the oldest slot once the buffer is full and is
/// immediately offered to each live [`Subscription`] whose filter admits it.
/// Writes, fan-out, snapshots, subscription changes and resizes are all
/// serialized by one mutex; none of them ever waits on a consumer, because
/// delivery to a full subscriber queue drops the entry for that subscriber.
///
/// Cloning the buffer yields another handle to the same storage.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    state: Arc<Mutex<RingState>>,
}

impl RingBuffer {
    /// Create a buffer holding `capacity` entries (`0` means
    /// [`DEFAULT_CAPACITY`]).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        Self {
            state: Arc::new(Mutex::new(RingState::with_capacity(capacity))),
        }
    }

    /// Create a buffer from a signed configuration value; non-positive
    /// values fall back to [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn from_config(capacity: i64) -> Self {
        Self::new(usize::try_from(capacity).unwrap_or(0))
    }

    fn lock(&self) -> MutexGuard<'_, RingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `entry` and fan it out to live subscribers.
    ///
    /// Accepts every severity.  Never blocks on a subscriber and never fails.
    pub fn add(&self, entry: Entry) {
        self.lock().push(entry);
    }

    /// Up to `limit` of the most recent entries at or above `min_level`,
    /// oldest first.
    ///
    /// Filters first and truncates second, so the result holds the newest
    /// qualifying entries even when lower-severity entries sit between
    /// them.  `limit == 0` returns every qualifying entry.
    #[must_use]
    pub fn recent(&self, limit: usize, min_level: Level) -> Vec<Entry> {
        let state = self.lock();
        let matching: Vec<&Entry> = state
            .chronological()
            .filter(|e| e.level >= min_level)
            .collect();
        let skip = if limit == 0 {
            0
        } else {
            matching.len().saturating_sub(limit)
        };
        matching.into_iter().skip(skip).cloned().collect()
    }

    /// Change the capacity, keeping the newest entries that fit.
    ///
    /// `0` is ignored.  Subscribers are not notified and keep their
    /// subscriptions.
    pub fn resize(&self, new_capacity: usize) {
        if new_capacity == 0 {
            return;
        }
        let (old_capacity, kept) = {
            let mut state = self.lock();
            let old_capacity = state.capacity();
            let mut snapshot: Vec<Entry> = state.chronological().cloned().collect();
            let excess = snapshot.len().saturating_sub(new_capacity);
            snapshot.drain(..excess);
            let kept = snapshot.len();

            let registry = std::mem::take(&mut state.registry);
            *state = RingState::with_capacity(new_capacity);
            state.registry = registry;
            for entry in snapshot {
                state.store(entry);
            }
            (old_capacity, kept)
        };
        tracing::debug!(
            target: DIAGNOSTIC_TARGET,
            old_capacity,
            new_capacity,
            kept,
            "resized log ring buffer"
        );
    }

    /// Open a live subscription receiving entries at or above `min_level`.
    #[must_use]
    pub fn subscribe(&self, min_level: Level) -> Subscription {
        self.lock().registry.subscribe(min_level)
    }

    /// Stop delivering to `subscription`.  Idempotent.
    ///
    /// Entries already queued stay readable; nothing new arrives once this
    /// returns.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.lock().registry.unsubscribe(subscription.id());
    }

    /// Change the minimum level of `subscription`, effective from the next
    /// write.
    pub fn set_min_level(&self, subscription: &Subscription, level: Level) {
        let _state = self.lock();
        subscription.filter().set(level);
    }

    /// Current minimum level of `subscription`.
    #[must_use]
    pub fn min_level(&self, subscription: &Subscription) -> Level {
        let _state = self.lock();
        subscription.filter().get()
    }

    /// Number of valid entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Entries written since construction or the last resize.
    #[must_use]
    pub fn total_writes(&self) -> u64 {
        self.lock().total
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().registry.len()
    }

    /// All counters, read under one lock.
    #[must_use]
    pub fn stats(&self) -> RingStats {
        let state = self.lock();
        RingStats {
            capacity: state.capacity(),
            len: state.len(),
            total_writes: state.total,
            subscribers: state.registry.len(),
        }
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{Record, Scope, subscriber::SUBSCRIBER_QUEUE_DEPTH};

    fn entry(level: Level, msg: impl Into<String>) -> Entry {
        Scope::default().entry(&Record::new(level, msg))
    }

    fn tagged(ring: &RingBuffer, range: std::ops::Range<usize>) {
        for i in range {
            ring.add(entry(Level::Info, i.to_string()));
        }
    }

    fn messages(entries: &[Entry]) -> Vec<String> {
        entries.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn zero_capacity_uses_default() {
        assert_eq!(RingBuffer::new(0).capacity(), DEFAULT_CAPACITY);
        assert_eq!(RingBuffer::from_config(-5).capacity(), DEFAULT_CAPACITY);
        assert_eq!(RingBuffer::from_config(0).capacity(), DEFAULT_CAPACITY);
        assert_eq!(RingBuffer::from_config(16).capacity(), 16);
    }

    #[test]
    fn partially_filled_returns_all_in_order() {
        let ring = RingBuffer::new(10);
        tagged(&ring, 0..4);
        assert_eq!(ring.len(), 4);
        assert_eq!(messages(&ring.recent(0, Level::Debug)), ["0", "1", "2", "3"]);
    }

    #[test]
    fn overwrite_keeps_newest_in_order() {
        let ring = RingBuffer::new(3);
        tagged(&ring, 0..5);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.total_writes(), 5);
        assert_eq!(messages(&ring.recent(0, Level::Debug)), ["2", "3", "4"]);
    }

    #[test]
    fn holds_last_min_w_c_for_many_lengths() {
        for capacity in 1..6 {
            for writes in 0..13 {
                let ring = RingBuffer::new(capacity);
                tagged(&ring, 0..writes);
                let expected: Vec<String> = (writes.saturating_sub(capacity)..writes)
                    .map(|i| i.to_string())
                    .collect();
                assert_eq!(
                    messages(&ring.recent(0, Level::Debug)),
                    expected,
                    "capacity {capacity}, writes {writes}"
                );
            }
        }
    }

    #[test]
    fn filters_then_truncates() {
        let ring = RingBuffer::new(10);
        for (level, msg) in [
            (Level::Debug, "d"),
            (Level::Info, "i1"),
            (Level::Warn, "w"),
            (Level::Error, "e"),
            (Level::Info, "i2"),
        ] {
            ring.add(entry(level, msg));
        }
        assert_eq!(ring.recent(10, Level::Warn).len(), 2);
        assert_eq!(ring.recent(10, Level::Error).len(), 1);
        assert_eq!(messages(&ring.recent(1, Level::Warn)), ["e"]);
        assert_eq!(messages(&ring.recent(2, Level::Info)), ["e", "i2"]);
    }

    #[test]
    fn limit_returns_most_recent_qualifying() {
        let ring = RingBuffer::new(20);
        for i in 0..10 {
            let level = if i % 2 == 0 { Level::Warn } else { Level::Debug };
            ring.add(entry(level, i.to_string()));
        }
        assert_eq!(messages(&ring.recent(3, Level::Warn)), ["4", "6", "8"]);
    }

    #[test]
    fn filtering_is_monotonic() {
        let ring = RingBuffer::new(50);
        for i in 0..40 {
            ring.add(entry(Level::ALL[i % 4], i.to_string()));
        }
        for pair in Level::ALL.windows(2) {
            let looser = messages(&ring.recent(0, pair[0]));
            let stricter = messages(&ring.recent(0, pair[1]));
            assert!(stricter.iter().all(|m| looser.contains(m)));
            assert!(stricter.len() < looser.len());
        }
    }

    #[test]
    fn snapshot_is_a_copy() {
        let ring = RingBuffer::new(2);
        tagged(&ring, 0..2);
        let before = ring.recent(0, Level::Debug);
        tagged(&ring, 2..4);
        assert_eq!(messages(&before), ["0", "1"]);
    }

    #[test]
    fn resize_shrink_keeps_newest() {
        let ring = RingBuffer::new(5);
        tagged(&ring, 0..7);
        ring.resize(2);
        assert_eq!(ring.capacity(), 2);
        assert_eq!(messages(&ring.recent(0, Level::Debug)), ["5", "6"]);
        tagged(&ring, 7..8);
        assert_eq!(messages(&ring.recent(0, Level::Debug)), ["6", "7"]);
    }

    #[test]
    fn resize_grow_keeps_everything() {
        let ring = RingBuffer::new(3);
        tagged(&ring, 0..5);
        ring.resize(6);
        assert_eq!(messages(&ring.recent(0, Level::Debug)), ["2", "3", "4"]);
        tagged(&ring, 5..8);
        assert_eq!(
            messages(&ring.recent(0, Level::Debug)),
            ["2", "3", "4", "5", "6", "7"]
        );
    }

    #[test]
    fn resize_zero_is_noop() {
        let ring = RingBuffer::new(3);
        tagged(&ring, 0..2);
        ring.resize(0);
        assert_eq!(ring.capacity(), 3);
        assert_eq!(messages(&ring.recent(0, Level::Debug)), ["0", "1"]);
    }

    #[test]
    fn resize_keeps_subscribers_without_notifying() {
        let ring = RingBuffer::new(4);
        let sub = ring.subscribe(Level::Debug);
        tagged(&ring, 0..3);
        assert_eq!(sub.drain().len(), 3);
        ring.resize(8);
        assert!(sub.try_recv().is_none(), "resize must not deliver");
        tagged(&ring, 3..4);
        assert_eq!(messages(&sub.drain()), ["3"]);
        assert_eq!(ring.subscriber_count(), 1);
    }

    #[test]
    fn subscriber_never_sees_below_filter() {
        let ring = RingBuffer::new(10);
        let sub = ring.subscribe(Level::Warn);
        for level in Level::ALL {
            ring.add(entry(level, level.as_str()));
        }
        let got = sub.drain();
        assert!(got.iter().all(|e| e.level >= Level::Warn));
        assert_eq!(messages(&got), ["WARN", "ERROR"]);
    }

    #[test]
    fn lowering_filter_affects_only_later_writes() {
        let ring = RingBuffer::new(10);
        let sub = ring.subscribe(Level::Error);
        ring.add(entry(Level::Info, "before"));
        ring.set_min_level(&sub, Level::Debug);
        assert_eq!(ring.min_level(&sub), Level::Debug);
        ring.add(entry(Level::Info, "after"));
        assert_eq!(messages(&sub.drain()), ["after"]);
    }

    #[test]
    fn saturated_subscriber_drops_only_for_itself() {
        let ring = RingBuffer::new(1000);
        let stalled = ring.subscribe(Level::Debug);
        let reader = ring.subscribe(Level::Debug);
        let total = SUBSCRIBER_QUEUE_DEPTH + 44;
        let mut seen = 0;
        for i in 0..total {
            ring.add(entry(Level::Info, i.to_string()));
            seen += reader.drain().len();
        }
        assert_eq!(seen, total);
        assert_eq!(reader.dropped(), 0);
        assert_eq!(stalled.pending(), SUBSCRIBER_QUEUE_DEPTH);
        assert_eq!(stalled.dropped(), 44);
        assert_eq!(ring.len(), total);
    }

    #[test]
    fn unsubscribed_receives_nothing_new() {
        let ring = RingBuffer::new(10);
        let sub = ring.subscribe(Level::Debug);
        ring.add(entry(Level::Info, "kept"));
        ring.unsubscribe(&sub);
        ring.unsubscribe(&sub);
        ring.add(entry(Level::Error, "missed"));
        assert_eq!(messages(&sub.drain()), ["kept"]);
        assert!(!sub.is_active());
        assert_eq!(ring.subscriber_count(), 0);
    }

    #[test]
    fn foreign_subscription_is_ignored() {
        let a = RingBuffer::new(4);
        let b = RingBuffer::new(4);
        let from_a = a.subscribe(Level::Debug);
        let from_b = b.subscribe(Level::Debug);

        b.unsubscribe(&from_a);
        assert!(from_a.is_active());
        assert_eq!(a.subscriber_count(), 1);
        assert_eq!(b.subscriber_count(), 1);

        b.add(entry(Level::Info, "still live"));
        assert_eq!(messages(&from_b.drain()), ["still live"]);
    }

    #[test]
    fn concurrent_writers_lose_nothing_below_capacity() {
        let ring = RingBuffer::new(4000);
        let sub = ring.subscribe(Level::Error);
        std::thread::scope(|s| {
            for t in 0..8 {
                let ring = ring.clone();
                s.spawn(move || {
                    for i in 0..500 {
                        let level = if i % 100 == 0 { Level::Error } else { Level::Info };
                        ring.add(entry(level, format!("{t}-{i}")));
                    }
                });
            }
        });
        let stats = ring.stats();
        assert_eq!(stats.len, 4000);
        assert_eq!(stats.total_writes, 4000);
        assert_eq!(sub.drain().len(), 40);
    }

    #[test]
    fn stats_reflect_state() {
        let ring = RingBuffer::new(2);
        let _sub = ring.subscribe(Level::Info);
        tagged(&ring, 0..3);
        assert_eq!(
            ring.stats(),
            RingStats {
                capacity: 2,
                len: 2,
                total_writes: 3,
                subscribers: 1,
            }
        );
    }
}
