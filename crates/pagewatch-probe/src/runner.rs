//! One pass over every configured target.
//!
//! Probes run as tokio tasks gated by a semaphore sized to the configured
//! concurrency. A single collector gathers `(index, result)` pairs and
//! puts them back into configured order, so callers see the same order no
//! matter which probe finished first.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use pagewatch_core::{CheckResult, Outcome, ProbeConfig, Target};

use crate::classifier::classify;
use crate::prober::Prober;

/// Probe one target and classify the response.
///
/// `elapsed_ms` covers the network call only.
pub async fn check_target<P: Prober>(prober: &P, target: &Target, timeout: Duration) -> CheckResult {
    let checked_at = epoch_millis();
    let started = Instant::now();
    let response = prober.probe(&target.url, timeout).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    CheckResult {
        url: target.url.clone(),
        content_requirement: target.content_requirement.clone(),
        elapsed_ms,
        outcome: classify(&response, &target.content_requirement),
        status_code: response.status_code(),
        checked_at,
    }
}

/// Probe every target once and return one result per target, in
/// configured order.
///
/// Never fails: a probe that panics or misses the cycle deadline is
/// recorded as [`Outcome::Unreachable`].
pub async fn run_cycle<P: Prober>(prober: Arc<P>, config: &ProbeConfig) -> Vec<CheckResult> {
    let cycle_started = Instant::now();
    let semaphore = Arc::new(Semaphore::new(config.concurrency.clamp(1, Semaphore::MAX_PERMITS)));
    let mut tasks = JoinSet::new();

    for (index, target) in config.targets.iter().enumerate() {
        let prober = prober.clone();
        let semaphore = semaphore.clone();
        let target = target.clone();
        let timeout = config.probe_timeout(&target);

        tasks.spawn(async move {
            // The semaphore is never closed.
            let _permit = semaphore.acquire_owned().await.ok();
            (index, check_target(prober.as_ref(), &target, timeout).await)
        });
    }

    let mut slots: Vec<Option<CheckResult>> = vec![None; config.targets.len()];

    let deadline_hit = match config.cycle_deadline() {
        Some(limit) => tokio::time::timeout(limit, collect(&mut tasks, &mut slots))
            .await
            .is_err(),
        None => {
            collect(&mut tasks, &mut slots).await;
            false
        }
    };

    if deadline_hit {
        warn!(
            pending = tasks.len(),
            deadline_secs = config.cycle_deadline.unwrap_or_default(),
            "cycle deadline reached, abandoning unfinished probes"
        );
        tasks.abort_all();
    }

    let elapsed_ms = cycle_started.elapsed().as_secs_f64() * 1000.0;
    slots
        .into_iter()
        .zip(&config.targets)
        .map(|(slot, target)| slot.unwrap_or_else(|| abandoned(target, elapsed_ms)))
        .collect()
}

async fn collect(
    tasks: &mut JoinSet<(usize, CheckResult)>,
    slots: &mut [Option<CheckResult>],
) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                debug!(url = %result.url, outcome = %result.outcome, "probe finished");
                slots[index] = Some(result);
            }
            Err(e) => warn!(error = %e, "probe task failed"),
        }
    }
}

/// Result for a target whose probe never reported back.
fn abandoned(target: &Target, elapsed_ms: f64) -> CheckResult {
    CheckResult {
        url: target.url.clone(),
        content_requirement: target.content_requirement.clone(),
        elapsed_ms,
        outcome: Outcome::Unreachable,
        status_code: None,
        checked_at: epoch_millis(),
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
