//! The HTTP prober: one bounded GET per call.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use pagewatch_core::{ProbeResponse, ResponseDescriptor};

const USER_AGENT: &str = concat!("pagewatch/", env!("CARGO_PKG_VERSION"));

/// Issues a single GET and reports what came back.
///
/// Implementations never retry and never fail: every network-level
/// problem becomes [`ProbeResponse::Unreachable`].
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, url: &str, timeout: Duration) -> impl Future<Output = ProbeResponse> + Send;
}

/// [`Prober`] backed by a shared `reqwest` client (HTTP and HTTPS).
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<ResponseDescriptor> {
        let response = self.client.get(url).send().await?;
        let status_code = response.status().as_u16();
        let body = response.text().await?;
        Ok(ResponseDescriptor { status_code, body })
    }
}

impl Prober for HttpProber {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeResponse {
        match tokio::time::timeout(timeout, self.fetch(url)).await {
            Ok(Ok(descriptor)) => ProbeResponse::Received(descriptor),
            Ok(Err(e)) => {
                debug!(error = %e, %url, "probe failed");
                ProbeResponse::unreachable(e.to_string())
            }
            Err(_) => {
                debug!(%url, timeout_ms = timeout.as_millis() as u64, "probe timed out");
                ProbeResponse::unreachable(format!("timed out after {timeout:?}"))
            }
        }
    }
}
