//! pagewatch-metrics — observability for the probe loop.
//!
//! Counts outcomes per target, keeps a short window of response times,
//! tracks how many cycles overran the checking period, and renders all
//! of it in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! MetricsCollector (ResultSink)
//!   ├── record()           ← once per cycle with ordered results
//!   ├── cycle_completed()  ← cycle duration, degraded flag
//!   └── snapshot() → MetricsSnapshot
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod collector;
pub mod prometheus;

pub use collector::{MetricsCollector, MetricsSnapshot, TargetSnapshot};
pub use prometheus::render_prometheus;
