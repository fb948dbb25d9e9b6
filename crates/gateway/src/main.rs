use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use gateway_core::policy::{Action, AppliesTo, PolicyDoc, RegionRouting, Route};
use gateway_core::token_map::{InMemoryRemoteStore, MemoryTokenMap, RemoteTokenMap, TokenMapBackend};
use gateway_core::Category;

use gateway::audit_log::LocalAuditLog;
use gateway::client::Client;
use gateway::config::GatewayConfig;
use gateway::http::server;
use gateway::proxy::AppState;
use gateway::telemetry;

/// Default routing document used when no policy file is supplied. Blocks
/// secrets outright, redacts pii/ops_sensitive to an internal target, and
/// leaves everything else at the default allow.
fn default_policy() -> PolicyDoc {
	PolicyDoc {
		version: "default-0".to_string(),
		restricted_regions: HashSet::new(),
		region_routing: HashMap::from([(
			"default".to_string(),
			RegionRouting { external_allowed: true, preferred_external_targets: vec![], internal_fallback: "internal:default".to_string() },
		)]),
		caller_constraints: HashMap::new(),
		routes: vec![
			Route {
				match_category: Some(Category::Secret),
				action: Action::Block,
				applies_to: AppliesTo::default(),
				allow_models: vec![],
				allow_categories: None,
				allow_detokenize: false,
			},
			Route {
				match_category: Some(Category::ExportControl),
				action: Action::Block,
				applies_to: AppliesTo::default(),
				allow_models: vec![],
				allow_categories: None,
				allow_detokenize: false,
			},
			Route {
				match_category: Some(Category::Pii),
				action: Action::Redact,
				applies_to: AppliesTo::default(),
				allow_models: vec![],
				allow_categories: Some([Category::Pii, Category::OpsSensitive].into_iter().collect()),
				allow_detokenize: true,
			},
		],
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	telemetry::init();

	let config = Arc::new(GatewayConfig::from_env()?);
	let client = Client::new(config.upstream_timeout())?;

	let backend: Arc<dyn TokenMapBackend> = match &config.aes_passphrase {
		Some(passphrase) => Arc::new(RemoteTokenMap::new(InMemoryRemoteStore::new(), passphrase.as_bytes(), b"gateway-token-map-salt")),
		None => Arc::new(MemoryTokenMap::new()),
	};

	let state = Arc::new(AppState {
		config,
		backend,
		policy: RwLock::new(Arc::new(default_policy())),
		client,
		post_verify: None,
		audit: Some(Arc::new(LocalAuditLog::new(1000))),
	});

	let addr = std::env::var("GATEWAY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8089".to_string()).parse()?;
	server::serve(state, addr).await
}
