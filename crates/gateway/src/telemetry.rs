use tracing_subscriber::{fmt, EnvFilter};

/// Structured logging setup, matching the reference gateway's
/// env-filter + fmt-layer convention. Raw redacted values are never
/// logged; call sites pass only placeholders, categories, and counts.
pub fn init() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	fmt().with_env_filter(filter).with_target(true).init();
}
