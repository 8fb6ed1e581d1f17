//! Command: drive concurrent producers and live subscribers.
use std::thread;
use std::time::Duration;

use anyhow::Result;
use rayon::prelude::*;

use crate::cli::StressOpts;
use crate::logging::{Attr, Level, LogSystem, Logger, RingSink, RingStats, Subscription};

/// How long a consumer waits before re-checking its queue.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// What one subscriber observed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberReport {
    /// Subscription id.
    pub id: u64,
    /// Minimum level the subscriber asked for.
    pub min_level: Level,
    /// Entries received.
    pub received: usize,
    /// Entries dropped because its queue was full.
    pub dropped: u64,
}

/// Outcome of a stress run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressReport {
    /// Ring counters after all producers finished.
    pub stats: RingStats,
    /// One report per subscriber, in subscription order.
    pub subscribers: Vec<SubscriberReport>,
}

/// Run the stress scenario and print its report.
///
/// # Errors
///
/// Returns an error if the entry snapshot cannot be serialized.
pub fn run(opts: &StressOpts, system: &LogSystem) -> Result<()> {
    let report = execute(opts, system);
    let log = system.logger().with_group("stress");

    println!(
        "ring: capacity={} len={} writes={} subscribers={}",
        report.stats.capacity,
        report.stats.len,
        report.stats.total_writes,
        report.stats.subscribers
    );
    for sub in &report.subscribers {
        println!(
            "subscriber {} (>= {}): received={} dropped={}",
            sub.id, sub.min_level, sub.received, sub.dropped
        );
        if sub.dropped > 0 {
            log.warn(
                "subscriber fell behind",
                [Attr::new("id", sub.id), Attr::new("dropped", sub.dropped)],
            );
        }
    }

    if opts.show > 0 {
        let recent = system.ring().recent(opts.show, Level::Debug);
        println!("{}", serde_json::to_string_pretty(&recent)?);
    }

    log.info(
        "stress run complete",
        [
            Attr::new("producers", opts.producers),
            Attr::new("records", opts.records),
        ],
    );
    Ok(())
}

/// Run producers and subscribers against `system`'s ring buffer.
///
/// Producers write through a ring-only logger so the console is not flooded;
/// subscribers cycle through the four levels as their minimum.  Every
/// subscription is removed once the producers finish and its consumer drains
/// what was queued.
pub fn execute(opts: &StressOpts, system: &LogSystem) -> StressReport {
    let ring = system.ring();
    if let Some(capacity) = opts.capacity {
        ring.resize(capacity);
    }

    let subs: Vec<Subscription> = Level::ALL
        .into_iter()
        .cycle()
        .take(opts.subscribers)
        .map(|level| ring.subscribe(level))
        .collect();

    let producer_log = Logger::new(RingSink::new(ring.clone())).with_group("producer");

    let (received, stats) = thread::scope(|s| {
        let consumers: Vec<_> = subs.iter().map(|sub| s.spawn(move || consume(sub))).collect();

        (0..opts.producers).into_par_iter().for_each(|id| {
            let log = producer_log.with_attrs([Attr::new("id", id)]);
            for (seq, level) in (0..opts.records).zip(Level::ALL.into_iter().cycle()) {
                log.log(level, "synthetic request", [Attr::new("seq", seq)]);
            }
        });

        let stats = ring.stats();
        for sub in &subs {
            ring.unsubscribe(sub);
        }
        let received: Vec<usize> = consumers
            .into_iter()
            .map(|handle| handle.join().unwrap_or(0))
            .collect();
        (received, stats)
    });

    let subscribers = subs
        .iter()
        .zip(received)
        .map(|(sub, received)| SubscriberReport {
            id: sub.id(),
            min_level: ring.min_level(sub),
            received,
            dropped: sub.dropped(),
        })
        .collect();

    StressReport { stats, subscribers }
}

fn consume(sub: &Subscription) -> usize {
    let mut received = 0;
    while let Ok(next) = sub.recv_timeout(POLL_INTERVAL) {
        if next.is_some() {
            received += 1;
        }
    }
    received
}
