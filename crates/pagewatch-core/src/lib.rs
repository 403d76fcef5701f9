//! pagewatch-core — shared types for the pagewatch workspace.
//!
//! Holds the data model every other crate speaks: the configured
//! [`Target`] list wrapped in a validated [`ProbeConfig`], the
//! [`ProbeResponse`] a prober hands back, the closed [`Outcome`]
//! classification and the [`CheckResult`] record that flows into a
//! [`ResultSink`].

pub mod config;
pub mod error;
pub mod sink;
pub mod types;

pub use config::{ConfigFormat, ProbeConfig};
pub use error::{ConfigError, ConfigResult};
pub use sink::{CycleReport, ResultSink};
pub use types::*;
