//! Pluggable detection of in-flight tasks that are taking too long.

use std::time::{Duration, Instant};

use crate::task::TaskSnapshot;

/// Running-time statistics over tasks that have completed so far this run,
/// handed to detectors that want a percentile-based threshold.
#[derive(Debug, Default, Clone)]
pub struct RuntimeStats {
    durations: Vec<Duration>,
}

impl RuntimeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, d: Duration) {
        self.durations.push(d);
    }

    /// Returns the `p`-th percentile (0.0..=1.0) completed-task duration, or
    /// `None` if nothing has completed yet.
    pub fn percentile(&self, p: f64) -> Option<Duration> {
        if self.durations.is_empty() {
            return None;
        }
        let mut sorted = self.durations.clone();
        sorted.sort();
        let idx = ((sorted.len() as f64 - 1.0) * p.clamp(0.0, 1.0)).round() as usize;
        sorted.get(idx).copied()
    }
}

/// Context a [`StragglerDetector`] needs, supplied by the Dispatcher. A
/// detector holds no state of its own about Dispatcher internals.
pub struct StragglerContext<'a> {
    pub now: Instant,
    pub stats: &'a RuntimeStats,
}

/// A predicate evaluated against every in-flight task on each sweep.
/// Kept non-generic over a task's work/value types so implementations stay
/// object-safe.
pub trait StragglerDetector: Send + Sync {
    fn is_straggler(&self, snapshot: &TaskSnapshot, ctx: &StragglerContext<'_>) -> bool;
}

/// Default: never flags anything.
#[derive(Debug, Default)]
pub struct NoStragglerDetection;

impl StragglerDetector for NoStragglerDetection {
    fn is_straggler(&self, _snapshot: &TaskSnapshot, _ctx: &StragglerContext<'_>) -> bool {
        false
    }
}

/// Flags a task once it has been running longer than a fixed deadline.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineStraggler {
    pub deadline: Duration,
}

impl DeadlineStraggler {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

impl StragglerDetector for DeadlineStraggler {
    fn is_straggler(&self, snapshot: &TaskSnapshot, ctx: &StragglerContext<'_>) -> bool {
        ctx.now.duration_since(snapshot.last_submit_ts) > self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;

    fn snapshot_aged(d: Duration) -> TaskSnapshot {
        let now = Instant::now();
        TaskSnapshot {
            task_id: TaskId(1),
            attempt: 1,
            first_submit_ts: now,
            last_submit_ts: now.checked_sub(d).unwrap_or(now),
        }
    }

    #[test]
    fn no_op_detector_never_flags() {
        let detector = NoStragglerDetection;
        let stats = RuntimeStats::new();
        let ctx = StragglerContext {
            now: Instant::now(),
            stats: &stats,
        };
        assert!(!detector.is_straggler(&snapshot_aged(Duration::from_secs(3600)), &ctx));
    }

    #[test]
    fn deadline_detector_flags_past_deadline() {
        let detector = DeadlineStraggler::new(Duration::from_millis(500));
        let stats = RuntimeStats::new();
        let ctx = StragglerContext {
            now: Instant::now(),
            stats: &stats,
        };
        assert!(detector.is_straggler(&snapshot_aged(Duration::from_secs(1)), &ctx));
        assert!(!detector.is_straggler(&snapshot_aged(Duration::from_millis(10)), &ctx));
    }

    #[test]
    fn runtime_stats_percentile_on_empty_is_none() {
        let stats = RuntimeStats::new();
        assert_eq!(stats.percentile(0.5), None);
    }

    #[test]
    fn runtime_stats_percentile_over_samples() {
        let mut stats = RuntimeStats::new();
        for ms in [10, 20, 30, 40, 50] {
            stats.record(Duration::from_millis(ms));
        }
        assert_eq!(stats.percentile(0.0), Some(Duration::from_millis(10)));
        assert_eq!(stats.percentile(1.0), Some(Duration::from_millis(50)));
    }
}
