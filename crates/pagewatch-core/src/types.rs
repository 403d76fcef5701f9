//! Shared types used across pagewatch crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One configured URL plus the text fragment its page must contain.
///
/// Identity is the position in the configured list; duplicate URLs are
/// probed independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub url: String,
    /// Case-sensitive fragment the page body must contain. Empty means
    /// no content check.
    #[serde(default)]
    pub content_requirement: String,
    /// Per-target probe timeout in seconds, overriding the global one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl Target {
    pub fn new(url: impl Into<String>, content_requirement: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_requirement: content_requirement.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }
}

/// A completed network exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    pub status_code: u16,
    pub body: String,
}

/// What a prober hands back for a single GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResponse {
    /// The server answered (any status code).
    Received(ResponseDescriptor),
    /// DNS failure, refused connection, malformed URL, TLS failure or
    /// timeout. The reason is informational only.
    Unreachable { reason: String },
}

impl ProbeResponse {
    pub fn received(status_code: u16, body: impl Into<String>) -> Self {
        ProbeResponse::Received(ResponseDescriptor {
            status_code,
            body: body.into(),
        })
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        ProbeResponse::Unreachable {
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProbeResponse::Received(d) => Some(d.status_code),
            ProbeResponse::Unreachable { .. } => None,
        }
    }
}

/// Classification of a single probe, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Network-level failure, no response.
    Unreachable,
    /// Status code in [400, 500).
    ClientError,
    /// Status code in [500, 600).
    ServerError,
    /// Any other status, required content absent.
    ContentMismatch,
    /// Any other status, required content present.
    Success,
}

impl Outcome {
    /// Every variant, in precedence order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Unreachable,
        Outcome::ClientError,
        Outcome::ServerError,
        Outcome::ContentMismatch,
        Outcome::Success,
    ];

    /// Stable machine-readable name (metrics labels, JSON logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Unreachable => "unreachable",
            Outcome::ClientError => "client_error",
            Outcome::ServerError => "server_error",
            Outcome::ContentMismatch => "content_mismatch",
            Outcome::Success => "success",
        }
    }

    /// Human-readable status text used in the result log line.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Unreachable => "Server down (or Unreachable)",
            Outcome::ClientError => "Client's Request error (i.e. NotFound/Forbidden/BadRequest etc.)",
            Outcome::ServerError => "Server specific error",
            Outcome::ContentMismatch => "Required Content Not found",
            Outcome::Success => "Content requirement met",
        }
    }

    /// Position in [`Outcome::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One probe of one target in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub url: String,
    pub content_requirement: String,
    /// Wall-clock time around the network call, in milliseconds.
    pub elapsed_ms: f64,
    pub outcome: Outcome,
    /// `None` when the target was unreachable.
    pub status_code: Option<u16>,
    /// UNIX epoch milliseconds at which the probe started.
    pub checked_at: u64,
}

impl CheckResult {
    /// Elapsed time rounded to hundredths of a millisecond, for display.
    pub fn elapsed_ms_rounded(&self) -> f64 {
        (self.elapsed_ms * 100.0).round() / 100.0
    }
}
