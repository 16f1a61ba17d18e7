//! Progress-instrumented transfer pipeline.
//!
//! [`pump`] is the single place bytes move through: an explicit bounded
//! read/write loop that forwards chunks unchanged from the source stream to
//! the destination sink, counts them in a [`ProgressMeter`], and pushes a
//! [`ProgressSnapshot`] to the caller's callback whenever the configured
//! period has elapsed. Backpressure comes from awaiting each sink write;
//! nothing is buffered beyond the chunk in flight.

use std::time::{Duration, Instant};

use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};
use crate::stream::{ByteStream, Sink};

/// A point-in-time view of an active transfer.
///
/// The final snapshot of a successful copy always has
/// `transferred == length`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Cumulative bytes transferred so far
    pub transferred: u64,
    /// Total declared transfer length in bytes
    pub length: u64,
    /// Bytes still to transfer
    pub remaining: u64,
    /// Completion percentage, derived from `length`
    pub percentage: f64,
    /// Transfer rate estimate in bytes per second
    pub speed: f64,
    /// Estimated seconds to completion at the current rate
    pub eta: u64,
    /// Seconds since the transfer started
    pub runtime: u64,
}

/// A progress push: the operation id plus the current snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// Correlation id of the copy operation
    pub id: String,
    /// Snapshot at emission time
    pub stat: ProgressSnapshot,
}

/// Callback for progress updates.
///
/// Invoked zero or more times during an active transfer, monotonically
/// non-decreasing in `stat.transferred`, and never after the copy
/// operation has returned.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Byte counter and snapshot producer for one transfer.
///
/// Owns the single source of truth for "bytes transferred so far".
#[derive(Debug)]
pub(crate) struct ProgressMeter {
    length: u64,
    transferred: u64,
    period: Duration,
    started: Instant,
    last_emit: Instant,
}

impl ProgressMeter {
    pub(crate) fn new(length: u64, period: Duration) -> Self {
        let now = Instant::now();
        Self {
            length,
            transferred: 0,
            period,
            started: now,
            last_emit: now,
        }
    }

    pub(crate) fn record(&mut self, bytes: u64) {
        self.transferred += bytes;
    }

    /// Whether a period boundary has elapsed since the last emission.
    pub(crate) fn due(&self) -> bool {
        self.last_emit.elapsed() >= self.period
    }

    pub(crate) fn mark_emitted(&mut self) -> ProgressSnapshot {
        self.last_emit = Instant::now();
        self.snapshot()
    }

    pub(crate) fn transferred(&self) -> u64 {
        self.transferred
    }

    pub(crate) fn length(&self) -> u64 {
        self.length
    }

    pub(crate) fn snapshot(&self) -> ProgressSnapshot {
        let runtime = self.started.elapsed();
        let secs = runtime.as_secs_f64();
        let speed = if secs > 0.0 {
            self.transferred as f64 / secs
        } else {
            0.0
        };
        let remaining = self.length.saturating_sub(self.transferred);
        let percentage = if self.length == 0 {
            100.0
        } else {
            self.transferred as f64 * 100.0 / self.length as f64
        };
        let eta = if speed > 0.0 {
            (remaining as f64 / speed).round() as u64
        } else {
            0
        };
        ProgressSnapshot {
            transferred: self.transferred,
            length: self.length,
            remaining,
            percentage,
            speed,
            eta,
            runtime: runtime.as_secs(),
        }
    }
}

/// Drive the transfer: move every chunk from `source` into `sink`, then
/// finish the sink and return its completion payload with the final
/// snapshot.
///
/// Fails with [`Error::Truncated`] if the source ends before the declared
/// length arrived. The final snapshot is also pushed to the callback so the
/// sink always observes 100% on success.
pub(crate) async fn pump(
    id: &str,
    mut source: ByteStream,
    mut sink: Sink,
    mut meter: ProgressMeter,
    progress: Option<&ProgressCallback>,
) -> Result<(Value, ProgressSnapshot)> {
    loop {
        let chunk = match source.try_next().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(source) => return Err(Error::Read { source }),
        };
        meter.record(chunk.len() as u64);
        trace!(id, bytes = chunk.len(), "forwarding chunk");
        sink.write(chunk).await?;
        if meter.due() {
            if let Some(callback) = progress {
                callback(ProgressEvent {
                    id: id.to_owned(),
                    stat: meter.mark_emitted(),
                });
            }
        }
    }

    if meter.transferred() < meter.length() {
        return Err(Error::Truncated {
            expected: meter.length(),
            transferred: meter.transferred(),
        });
    }

    let data = sink.finish().await?;
    let stat = meter.snapshot();
    if let Some(callback) = progress {
        callback(ProgressEvent {
            id: id.to_owned(),
            stat,
        });
    }
    Ok((data, stat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_counts_and_percentage() {
        let mut meter = ProgressMeter::new(1000, Duration::from_millis(5000));
        meter.record(250);
        meter.record(250);
        let stat = meter.snapshot();
        assert_eq!(stat.transferred, 500);
        assert_eq!(stat.length, 1000);
        assert_eq!(stat.remaining, 500);
        assert!((stat.percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_meter_zero_length_is_complete() {
        let meter = ProgressMeter::new(0, Duration::from_millis(5000));
        let stat = meter.snapshot();
        assert_eq!(stat.transferred, 0);
        assert!((stat.percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_meter_zero_period_is_always_due() {
        let mut meter = ProgressMeter::new(10, Duration::ZERO);
        assert!(meter.due());
        meter.mark_emitted();
        assert!(meter.due());
    }

    #[test]
    fn test_meter_long_period_not_due_immediately() {
        let meter = ProgressMeter::new(10, Duration::from_secs(3600));
        assert!(!meter.due());
    }

    #[test]
    fn test_snapshot_serializes() {
        let meter = ProgressMeter::new(10, Duration::ZERO);
        let value = serde_json::to_value(meter.snapshot()).unwrap();
        assert_eq!(value["length"], 10);
        assert_eq!(value["transferred"], 0);
    }
}
