//! Prometheus text exposition format.
//!
//! Renders a metrics snapshot into the Prometheus text exposition format
//! for scraping by a Prometheus server or compatible agent.

use std::fmt::Write;

use pagewatch_core::Outcome;

use crate::collector::MetricsSnapshot;

/// Render a snapshot into Prometheus text format.
///
/// Per-target series carry a `url` label; checks are additionally split
/// by `outcome`.
pub fn render_prometheus(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();

    out.push_str("# HELP pagewatch_checks_total Checks performed, by outcome.\n");
    out.push_str("# TYPE pagewatch_checks_total counter\n");
    for t in &snapshot.targets {
        let url = escape_label(&t.url);
        for outcome in Outcome::ALL {
            let _ = writeln!(
                out,
                "pagewatch_checks_total{{url=\"{url}\",outcome=\"{}\"}} {}",
                outcome.as_str(),
                t.count(outcome)
            );
        }
    }

    out.push_str("# HELP pagewatch_response_time_p50_ms P50 response time in milliseconds over recent checks.\n");
    out.push_str("# TYPE pagewatch_response_time_p50_ms gauge\n");
    for t in &snapshot.targets {
        let _ = writeln!(
            out,
            "pagewatch_response_time_p50_ms{{url=\"{}\"}} {:.2}",
            escape_label(&t.url),
            t.latency_p50_ms
        );
    }

    out.push_str("# HELP pagewatch_response_time_p99_ms P99 response time in milliseconds over recent checks.\n");
    out.push_str("# TYPE pagewatch_response_time_p99_ms gauge\n");
    for t in &snapshot.targets {
        let _ = writeln!(
            out,
            "pagewatch_response_time_p99_ms{{url=\"{}\"}} {:.2}",
            escape_label(&t.url),
            t.latency_p99_ms
        );
    }

    out.push_str("# HELP pagewatch_cycles_total Probe cycles completed.\n");
    out.push_str("# TYPE pagewatch_cycles_total counter\n");
    let _ = writeln!(out, "pagewatch_cycles_total {}", snapshot.cycles);

    out.push_str("# HELP pagewatch_degraded_cycles_total Cycles that overran the checking period.\n");
    out.push_str("# TYPE pagewatch_degraded_cycles_total counter\n");
    let _ = writeln!(out, "pagewatch_degraded_cycles_total {}", snapshot.degraded_cycles);

    out.push_str("# HELP pagewatch_last_cycle_seconds Duration of the last completed cycle.\n");
    out.push_str("# TYPE pagewatch_last_cycle_seconds gauge\n");
    let _ = writeln!(out, "pagewatch_last_cycle_seconds {:.3}", snapshot.last_cycle_secs);

    out
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::collector::TargetSnapshot;

    fn test_snapshot(urls: &[&str]) -> MetricsSnapshot {
        MetricsSnapshot {
            targets: urls
                .iter()
                .map(|url| TargetSnapshot {
                    url: url.to_string(),
                    outcomes: [1, 2, 0, 3, 40],
                    latency_p50_ms: 5.2,
                    latency_p99_ms: 45.8,
                })
                .collect(),
            cycles: 46,
            degraded_cycles: 2,
            last_cycle_secs: 1.25,
        }
    }

    #[test]
    fn render_empty() {
        let output = render_prometheus(&test_snapshot(&[]));
        // Should still have type declarations.
        assert!(output.contains("# HELP pagewatch_checks_total"));
        assert!(output.contains("# TYPE pagewatch_checks_total counter"));
        assert!(output.contains("pagewatch_cycles_total 46"));
    }

    #[test]
    fn render_single_target() {
        let output = render_prometheus(&test_snapshot(&["https://example.com/"]));

        assert!(output.contains(
            "pagewatch_checks_total{url=\"https://example.com/\",outcome=\"unreachable\"} 1"
        ));
        assert!(output.contains(
            "pagewatch_checks_total{url=\"https://example.com/\",outcome=\"success\"} 40"
        ));
        assert!(output.contains("pagewatch_response_time_p50_ms{url=\"https://example.com/\"} 5.20"));
        assert!(output.contains("pagewatch_response_time_p99_ms{url=\"https://example.com/\"} 45.80"));
        assert!(output.contains("pagewatch_degraded_cycles_total 2"));
        assert!(output.contains("pagewatch_last_cycle_seconds 1.250"));
    }

    #[test]
    fn render_escapes_labels() {
        let output = render_prometheus(&test_snapshot(&["http://a/?q=\"x\""]));
        assert!(output.contains("url=\"http://a/?q=\\\"x\\\"\""));
    }

    #[test]
    fn render_format_is_prometheus_compatible() {
        let output = render_prometheus(&test_snapshot(&["http://a", "http://b"]));

        // Every sample line is `name[{labels}] value`.
        for line in output.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (_, value) = line.rsplit_once(' ').expect("sample line has a value");
            assert!(value.parse::<f64>().is_ok(), "bad value in line: {line}");
        }
    }
}
