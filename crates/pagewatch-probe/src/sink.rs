//! Result sink that writes one log line per check.

use tracing::{debug, info};

use pagewatch_core::{CheckResult, CycleReport, ResultSink};

/// Emits every result under the `pagewatch::results` tracing target.
///
/// The message keeps the established line shape for downstream log
/// consumers; the same data is attached as structured fields for JSON
/// output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ResultSink for LogSink {
    fn record(&self, results: &[CheckResult]) {
        for result in results {
            info!(
                target: "pagewatch::results",
                url = %result.url,
                elapsed_ms = result.elapsed_ms_rounded(),
                content_requirement = %result.content_requirement,
                outcome = %result.outcome,
                status_code = result.status_code,
                checked_at = result.checked_at,
                "{}",
                render_line(result)
            );
        }
    }

    fn cycle_completed(&self, report: &CycleReport) {
        debug!(
            target: "pagewatch::results",
            cycle = report.cycle,
            next_cycle_in_secs = report.idle.as_secs_f64(),
            degraded = report.degraded,
            "next cycle of execution scheduled"
        );
    }
}

/// `Checked URL='<url>' response-time=<ms> ms content_requirement='<req>' status=<label>`
pub fn render_line(result: &CheckResult) -> String {
    format!(
        "Checked URL='{}' response-time={:.2} ms content_requirement='{}' status={}",
        result.url,
        result.elapsed_ms,
        result.content_requirement,
        result.outcome.label()
    )
}
