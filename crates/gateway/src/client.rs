use std::time::Duration;

use crate::error::GatewayError;

/// Pooled outbound HTTP client used to call upstream providers. The
/// reference gateway wraps a custom HBONE-aware transport here; this
/// gateway has no mesh transport to negotiate, so a plain pooled
/// `reqwest::Client` covers the same concern (connection reuse, TLS,
/// per-call timeout).
#[derive(Clone)]
pub struct Client {
	inner: reqwest::Client,
}

impl Client {
	pub fn new(timeout: Duration) -> anyhow::Result<Self> {
		let inner = reqwest::Client::builder()
			.timeout(timeout)
			.pool_idle_timeout(Duration::from_secs(90))
			.build()?;
		Ok(Self { inner })
	}

	pub async fn forward(&self, req: reqwest::Request) -> Result<reqwest::Response, GatewayError> {
		self.inner.execute(req).await.map_err(|e| {
			if e.is_timeout() {
				GatewayError::UpstreamTimeout
			} else {
				GatewayError::UpstreamUnreachable(e.to_string())
			}
		})
	}

	pub fn inner(&self) -> &reqwest::Client {
		&self.inner
	}
}
