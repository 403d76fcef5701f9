//! The seam between the probing core and whatever records its results.

use std::sync::Arc;
use std::time::Duration;

use crate::types::CheckResult;

/// Summary of one finished cycle, handed to sinks after its results.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle counter.
    pub cycle: u64,
    /// Number of targets probed.
    pub targets: usize,
    /// Wall-clock duration of the cycle, result emission included.
    pub elapsed: Duration,
    /// Pause before the next cycle starts.
    pub idle: Duration,
    /// The cycle overran the checking period and `idle` is the randomized
    /// fallback pause.
    pub degraded: bool,
}

/// Consumer of check results.
///
/// Results arrive once per cycle, already in configured target order,
/// from a single collector task.
pub trait ResultSink: Send + Sync {
    /// Record every result of one cycle.
    fn record(&self, results: &[CheckResult]);

    /// Called once per cycle after [`ResultSink::record`].
    fn cycle_completed(&self, _report: &CycleReport) {}
}

impl<S: ResultSink + ?Sized> ResultSink for Arc<S> {
    fn record(&self, results: &[CheckResult]) {
        (**self).record(results)
    }

    fn cycle_completed(&self, report: &CycleReport) {
        (**self).cycle_completed(report)
    }
}
