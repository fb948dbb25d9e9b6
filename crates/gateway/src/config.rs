use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

/// Process-level configuration. Loading this from disk or a config service
/// is out of scope; the gateway constructs it programmatically or from a
/// handful of environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
	/// HMAC key for scope-salt derivation. Never logged.
	pub process_secret: String,
	#[serde(default = "default_ttl_secs")]
	pub default_ttl_secs: u64,
	#[serde(default = "default_max_payload_kb")]
	pub max_payload_kb: u64,
	#[serde(default)]
	pub trusted_callers: HashSet<String>,
	/// PBKDF2 passphrase for the remote token map backend, if configured.
	pub aes_passphrase: Option<String>,
	#[serde(default = "default_upstream_timeout_secs")]
	pub upstream_timeout_secs: u64,
}

fn default_ttl_secs() -> u64 {
	4 * 60 * 60
}

fn default_max_payload_kb() -> u64 {
	256
}

fn default_upstream_timeout_secs() -> u64 {
	120
}

impl GatewayConfig {
	pub fn default_ttl(&self) -> Duration {
		Duration::from_secs(self.default_ttl_secs)
	}

	pub fn max_payload_bytes(&self) -> usize {
		(self.max_payload_kb * 1024) as usize
	}

	pub fn upstream_timeout(&self) -> Duration {
		Duration::from_secs(self.upstream_timeout_secs)
	}

	/// Minimal environment-variable loader. Full config-file parsing is
	/// out of scope; this only reads the handful of variables needed to
	/// stand the process up.
	pub fn from_env() -> anyhow::Result<Self> {
		let process_secret = std::env::var("GATEWAY_PROCESS_SECRET")
			.map_err(|_| anyhow::anyhow!("GATEWAY_PROCESS_SECRET must be set"))?;
		let trusted_callers = std::env::var("GATEWAY_TRUSTED_CALLERS")
			.unwrap_or_default()
			.split(',')
			.filter(|s| !s.is_empty())
			.map(str::to_string)
			.collect();
		Ok(Self {
			process_secret,
			default_ttl_secs: default_ttl_secs(),
			max_payload_kb: default_max_payload_kb(),
			trusted_callers,
			aes_passphrase: std::env::var("GATEWAY_AES_PASSPHRASE").ok(),
			upstream_timeout_secs: default_upstream_timeout_secs(),
		})
	}
}
