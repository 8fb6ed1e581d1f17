//! Command: follow live entries as JSON lines.
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::cli::TailOpts;
use crate::logging::{Attr, Entry, Level, LogSystem, Subscription};

/// How long to wait for an entry before re-checking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Follow the ring buffer until `--count` entries were printed or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed or stdout
/// cannot be written.
pub fn run(opts: &TailOpts, system: &LogSystem) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        tracing::info!("received Ctrl+C, stopping tail");
        handler_stop.store(true, Ordering::Release);
    })
    .context("failed to set Ctrl+C handler")?;

    let mut out = std::io::stdout().lock();
    let printed = follow(opts, system, &stop, &mut out)?;
    tracing::debug!(printed, "tail finished");
    Ok(())
}

/// Print entries at or above `--min-level` to `out`, one JSON object per
/// line, until `stop` is set or `--count` entries were written.
///
/// With `--history` the buffered entries are printed first; entries written
/// between the history snapshot and the subscription are not shown.  When
/// `--interval-ms` is non-zero a background producer emits synthetic traffic
/// through the system's root logger.  Returns the number of lines written.
///
/// # Errors
///
/// Returns an error if an entry cannot be serialized or `out` fails.
pub fn follow(
    opts: &TailOpts,
    system: &LogSystem,
    stop: &AtomicBool,
    out: &mut impl Write,
) -> Result<usize> {
    let min_level = Level::parse(&opts.min_level);
    let ring = system.ring();

    let mut printed = 0;
    if opts.history {
        for entry in ring.recent(0, min_level) {
            if reached(opts.count, printed) {
                return Ok(printed);
            }
            write_entry(out, &entry)?;
            printed += 1;
        }
    }

    let sub = ring.subscribe(min_level);
    let finished = AtomicBool::new(false);
    let result = thread::scope(|s| {
        if opts.interval_ms > 0 {
            let interval = Duration::from_millis(opts.interval_ms);
            let log = system.logger().with_group("synthetic");
            let finished = &finished;
            s.spawn(move || {
                for (seq, level) in (0_u64..).zip(Level::ALL.into_iter().cycle()) {
                    if finished.load(Ordering::Acquire) || stop.load(Ordering::Acquire) {
                        break;
                    }
                    log.log(level, "synthetic request", [Attr::new("seq", seq)]);
                    thread::sleep(interval);
                }
            });
        }
        let result = pump(&sub, out, stop, opts.count, printed);
        finished.store(true, Ordering::Release);
        result
    });
    ring.unsubscribe(&sub);
    result
}

const fn reached(count: usize, printed: usize) -> bool {
    count != 0 && printed >= count
}

fn pump(
    sub: &Subscription,
    out: &mut impl Write,
    stop: &AtomicBool,
    count: usize,
    mut printed: usize,
) -> Result<usize> {
    while !reached(count, printed) && !stop.load(Ordering::Acquire) {
        if let Ok(Some(entry)) = sub.recv_timeout(POLL_INTERVAL) {
            write_entry(out, &entry)?;
            printed += 1;
        }
    }
    Ok(printed)
}

fn write_entry(out: &mut impl Write, entry: &Entry) -> Result<()> {
    let line = serde_json::to_string(entry).context("failed to serialize entry")?;
    writeln!(out, "{line}").context("failed to write entry")?;
    out.flush().context("failed to flush output")
}
