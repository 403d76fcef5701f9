//! pagewatch-probe — the probing core.
//!
//! Periodically fetches every configured target, classifies each
//! response and hands the ordered results to the registered sinks.
//!
//! # Architecture
//!
//! ```text
//! CycleScheduler (Running ⇄ Sleeping)
//!   ├── run_cycle()            one pass over all targets
//!   │   ├── Prober::probe()    single GET, bounded timeout
//!   │   └── classify()         status precedence, then contains()
//!   ├── ResultSink::record()   LogSink, MetricsCollector, ...
//!   └── compute_idle()         period - elapsed, or 5–20 s fallback
//! ```
//!
//! Probes within a cycle run concurrently up to the configured limit;
//! results are collected and restored to configured target order before
//! any sink sees them.

pub mod classifier;
pub mod prober;
pub mod runner;
pub mod scheduler;
pub mod sink;

pub use classifier::{classify, contains};
pub use prober::{HttpProber, Prober};
pub use runner::{check_target, run_cycle};
pub use scheduler::{CycleScheduler, IdlePlan, SchedulerState, compute_idle};
pub use sink::{LogSink, render_line};
