//! Metrics collector — tracks per-target outcomes and cycle health.
//!
//! Counters are atomics; the target map and latency windows sit behind
//! short-lived std mutexes because sinks are called synchronously from
//! the scheduler task.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use pagewatch_core::{CheckResult, CycleReport, Outcome, ResultSink};

/// Response-time samples kept per target for percentile gauges.
const LATENCY_WINDOW: usize = 100;

/// Per-target metrics bucket. Duplicate URLs share one bucket.
struct TargetMetrics {
    /// Cumulative checks, indexed by [`Outcome::index`].
    outcomes: [AtomicU64; 5],
    /// Most recent response times (microseconds).
    latencies: Mutex<VecDeque<u64>>,
}

impl TargetMetrics {
    fn new() -> Self {
        Self {
            outcomes: Default::default(),
            latencies: Mutex::new(VecDeque::with_capacity(LATENCY_WINDOW)),
        }
    }

    fn record(&self, result: &CheckResult) {
        self.outcomes[result.outcome.index()].fetch_add(1, Ordering::Relaxed);

        let mut latencies = lock(&self.latencies);
        if latencies.len() == LATENCY_WINDOW {
            latencies.pop_front();
        }
        latencies.push_back((result.elapsed_ms * 1000.0) as u64);
    }
}

/// Point-in-time view of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSnapshot {
    pub url: String,
    /// Cumulative checks, indexed by [`Outcome::index`].
    pub outcomes: [u64; 5],
    pub latency_p50_ms: f64,
    pub latency_p99_ms: f64,
}

impl TargetSnapshot {
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.outcomes[outcome.index()]
    }

    pub fn total(&self) -> u64 {
        self.outcomes.iter().sum()
    }
}

/// Point-in-time view of everything the collector knows.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    /// Sorted by URL.
    pub targets: Vec<TargetSnapshot>,
    pub cycles: u64,
    pub degraded_cycles: u64,
    pub last_cycle_secs: f64,
}

/// Collects metrics across all targets.
#[derive(Default)]
pub struct MetricsCollector {
    /// url → metrics.
    targets: Mutex<HashMap<String, Arc<TargetMetrics>>>,
    cycles: AtomicU64,
    degraded_cycles: AtomicU64,
    /// Duration of the last cycle in microseconds.
    last_cycle_us: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn target(&self, url: &str) -> Arc<TargetMetrics> {
        let mut targets = lock(&self.targets);
        targets
            .entry(url.to_string())
            .or_insert_with(|| {
                debug!(%url, "registered for metrics collection");
                Arc::new(TargetMetrics::new())
            })
            .clone()
    }

    /// Take a snapshot of every target seen so far.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let entries: Vec<(String, Arc<TargetMetrics>)> = lock(&self.targets)
            .iter()
            .map(|(url, m)| (url.clone(), m.clone()))
            .collect();

        let mut targets: Vec<TargetSnapshot> = entries
            .into_iter()
            .map(|(url, m)| {
                let outcomes = std::array::from_fn(|i| m.outcomes[i].load(Ordering::Relaxed));
                let samples: Vec<u64> = lock(&m.latencies).iter().copied().collect();
                let (latency_p50_ms, latency_p99_ms) = compute_percentiles(&samples);
                TargetSnapshot {
                    url,
                    outcomes,
                    latency_p50_ms,
                    latency_p99_ms,
                }
            })
            .collect();
        targets.sort_by(|a, b| a.url.cmp(&b.url));

        MetricsSnapshot {
            targets,
            cycles: self.cycles.load(Ordering::Relaxed),
            degraded_cycles: self.degraded_cycles.load(Ordering::Relaxed),
            last_cycle_secs: self.last_cycle_us.load(Ordering::Relaxed) as f64 / 1_000_000.0,
        }
    }
}

impl ResultSink for MetricsCollector {
    fn record(&self, results: &[CheckResult]) {
        for result in results {
            self.target(&result.url).record(result);
        }
    }

    fn cycle_completed(&self, report: &CycleReport) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        if report.degraded {
            self.degraded_cycles.fetch_add(1, Ordering::Relaxed);
        }
        self.last_cycle_us
            .store(report.elapsed.as_micros() as u64, Ordering::Relaxed);
    }
}

/// Compute P50 and P99 latency from unsorted samples (microseconds).
///
/// Returns (p50_ms, p99_ms). If empty, returns (0.0, 0.0).
fn compute_percentiles(latencies: &[u64]) -> (f64, f64) {
    if latencies.is_empty() {
        return (0.0, 0.0);
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_unstable();

    let p50_idx = (sorted.len() as f64 * 0.50) as usize;
    let p99_idx = (sorted.len() as f64 * 0.99) as usize;

    let p50 = sorted[p50_idx.min(sorted.len() - 1)] as f64 / 1000.0;
    let p99 = sorted[p99_idx.min(sorted.len() - 1)] as f64 / 1000.0;

    (p50, p99)
}

/// A poisoned lock only means a sink panicked mid-update; counters stay usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn result(url: &str, outcome: Outcome, elapsed_ms: f64) -> CheckResult {
        CheckResult {
            url: url.to_string(),
            content_requirement: "hello".to_string(),
            elapsed_ms,
            outcome,
            status_code: None,
            checked_at: 0,
        }
    }

    fn report(cycle: u64, degraded: bool) -> CycleReport {
        CycleReport {
            cycle,
            targets: 1,
            elapsed: Duration::from_millis(1500),
            idle: Duration::from_secs(5),
            degraded,
        }
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = MetricsCollector::new().snapshot();
        assert!(snapshot.targets.is_empty());
        assert_eq!(snapshot.cycles, 0);
        assert_eq!(snapshot.degraded_cycles, 0);
    }

    #[test]
    fn counts_outcomes_per_target() {
        let collector = MetricsCollector::new();
        collector.record(&[
            result("http://b", Outcome::Success, 10.0),
            result("http://a", Outcome::ClientError, 5.0),
        ]);
        collector.record(&[
            result("http://b", Outcome::ContentMismatch, 12.0),
            result("http://a", Outcome::ClientError, 6.0),
        ]);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.targets.len(), 2);

        let a = &snapshot.targets[0];
        assert_eq!(a.url, "http://a");
        assert_eq!(a.count(Outcome::ClientError), 2);
        assert_eq!(a.total(), 2);

        let b = &snapshot.targets[1];
        assert_eq!(b.count(Outcome::Success), 1);
        assert_eq!(b.count(Outcome::ContentMismatch), 1);
        assert_eq!(b.count(Outcome::Unreachable), 0);
    }

    #[test]
    fn duplicate_urls_share_a_bucket() {
        let collector = MetricsCollector::new();
        collector.record(&[
            result("http://a", Outcome::Success, 1.0),
            result("http://a", Outcome::Unreachable, 1000.0),
        ]);
        let snapshot = collector.snapshot();
        assert_eq!(snapshot.targets.len(), 1);
        assert_eq!(snapshot.targets[0].total(), 2);
    }

    #[test]
    fn counts_degraded_cycles() {
        let collector = MetricsCollector::new();
        collector.cycle_completed(&report(1, false));
        collector.cycle_completed(&report(2, true));
        collector.cycle_completed(&report(3, true));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.cycles, 3);
        assert_eq!(snapshot.degraded_cycles, 2);
        assert_eq!(snapshot.last_cycle_secs, 1.5);
    }

    #[test]
    fn latency_window_is_bounded() {
        let collector = MetricsCollector::new();
        for i in 0..(LATENCY_WINDOW as u64 + 50) {
            collector.record(&[result("http://a", Outcome::Success, i as f64)]);
        }
        let metrics = collector.target("http://a");
        assert_eq!(lock(&metrics.latencies).len(), LATENCY_WINDOW);
        // Oldest samples (0..50 ms) were evicted.
        let snapshot = collector.snapshot();
        assert!(snapshot.targets[0].latency_p50_ms >= 50.0);
    }

    #[test]
    fn percentiles_empty() {
        let (p50, p99) = compute_percentiles(&[]);
        assert_eq!(p50, 0.0);
        assert_eq!(p99, 0.0);
    }

    #[test]
    fn percentiles_single_value() {
        let (p50, p99) = compute_percentiles(&[5000]);
        assert_eq!(p50, 5.0);
        assert_eq!(p99, 5.0);
    }

    #[test]
    fn percentiles_distribution() {
        // 100 samples: 1ms to 100ms.
        let latencies: Vec<u64> = (1..=100).map(|i| i * 1000).collect();
        let (p50, p99) = compute_percentiles(&latencies);
        assert_eq!(p50, 51.0);
        assert_eq!(p99, 100.0);
    }
}
