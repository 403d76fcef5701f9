//! Cycle scheduler — runs cycles back to back at the checking period.
//!
//! Each cycle's own duration is subtracted from the period, so cycle
//! starts stay `checking_period` apart however long the probes take.
//! When a cycle overruns the period there is nothing left to subtract;
//! the scheduler then pauses for a random 5–20 s instead of starting the
//! next cycle immediately, and reports the cycle as degraded.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use pagewatch_core::{ConfigResult, CycleReport, ProbeConfig, ResultSink};

use crate::prober::Prober;
use crate::runner::run_cycle;

/// Range of the randomized pause after an overrunning cycle, in seconds.
pub const FALLBACK_IDLE_SECS: RangeInclusive<u64> = 5..=20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Sleeping,
}

/// How long to wait before the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePlan {
    /// `checking_period - elapsed`.
    OnSchedule(Duration),
    /// The cycle took at least the whole period; randomized fallback.
    Degraded(Duration),
}

impl IdlePlan {
    pub fn duration(&self) -> Duration {
        match self {
            IdlePlan::OnSchedule(d) | IdlePlan::Degraded(d) => *d,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, IdlePlan::Degraded(_))
    }
}

/// Idle time after a cycle that took `elapsed`.
pub fn compute_idle<R: Rng + ?Sized>(period: Duration, elapsed: Duration, rng: &mut R) -> IdlePlan {
    match period.checked_sub(elapsed) {
        Some(idle) if !idle.is_zero() => IdlePlan::OnSchedule(idle),
        _ => IdlePlan::Degraded(Duration::from_secs(rng.random_range(FALLBACK_IDLE_SECS))),
    }
}

/// Drives cycles forever, feeding every registered sink.
pub struct CycleScheduler<P> {
    prober: Arc<P>,
    config: Arc<ProbeConfig>,
    sinks: Vec<Box<dyn ResultSink>>,
    state: SchedulerState,
    cycles: u64,
}

impl<P: Prober> CycleScheduler<P> {
    /// Create a scheduler. Fails fast on an invalid config.
    pub fn new(prober: Arc<P>, config: Arc<ProbeConfig>) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            prober,
            config,
            sinks: Vec::new(),
            state: SchedulerState::Sleeping,
            cycles: 0,
        })
    }

    /// Register a sink. Sinks see results in registration order.
    pub fn with_sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one cycle, emit its results and work out the following pause.
    ///
    /// Does not sleep.
    pub async fn run_once(&mut self) -> CycleReport {
        self.state = SchedulerState::Running;
        self.cycles += 1;
        let cycle = self.cycles;
        debug!(cycle, targets = self.config.targets.len(), "cycle started");

        let started = Instant::now();
        let results = run_cycle(self.prober.clone(), &self.config).await;
        for sink in &self.sinks {
            sink.record(&results);
        }
        let elapsed = started.elapsed();

        let period = self.config.period();
        let plan = compute_idle(period, elapsed, &mut rand::rng());
        if plan.is_degraded() {
            warn!(
                cycle,
                elapsed_secs = elapsed.as_secs_f64(),
                checking_period_secs = period.as_secs_f64(),
                idle_secs = plan.duration().as_secs(),
                "checking period shorter than cycle duration, pausing for a random interval"
            );
        }

        let report = CycleReport {
            cycle,
            targets: results.len(),
            elapsed,
            idle: plan.duration(),
            degraded: plan.is_degraded(),
        };
        for sink in &self.sinks {
            sink.cycle_completed(&report);
        }

        self.state = SchedulerState::Sleeping;
        debug!(
            cycle,
            elapsed_ms = elapsed.as_millis() as u64,
            idle_ms = report.idle.as_millis() as u64,
            "cycle finished"
        );
        report
    }

    /// Run cycles until `shutdown` fires.
    ///
    /// Shutdown is honoured mid-cycle and mid-sleep; an interrupted cycle
    /// emits nothing.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            targets = self.config.targets.len(),
            checking_period_secs = self.config.checking_period,
            concurrency = self.config.concurrency,
            "scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = tokio::select! {
                report = self.run_once() => report,
                _ = shutdown.changed() => break,
            };

            tokio::select! {
                _ = tokio::time::sleep(report.idle) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.state = SchedulerState::Sleeping;
        info!(cycles = self.cycles, "scheduler stopped");
    }
}
