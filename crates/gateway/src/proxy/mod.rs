pub mod framing;
pub mod orchestrator;

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use gateway_core::policy::PolicyDoc;
use gateway_core::token_map::TokenMapBackend;

use crate::audit_log::LocalAuditLog;
use crate::client::Client;
use crate::config::GatewayConfig;

/// Injectable post-verification hook. The claim-verification subsystem
/// itself is out of scope; this is the hook point and its
/// failure-swallowing contract.
#[async_trait]
pub trait PostVerifyHook: Send + Sync {
	async fn verify(&self, detokenized_text: &str) -> anyhow::Result<Vec<String>>;
}

/// Shared process state threaded through every request.
pub struct AppState {
	pub config: Arc<GatewayConfig>,
	pub backend: Arc<dyn TokenMapBackend>,
	pub policy: RwLock<Arc<PolicyDoc>>,
	pub client: Client,
	pub post_verify: Option<Arc<dyn PostVerifyHook>>,
	pub audit: Option<Arc<LocalAuditLog>>,
}

impl AppState {
	pub fn policy_snapshot(&self) -> Arc<PolicyDoc> {
		self.policy.read().expect("policy lock poisoned").clone()
	}

	pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
		chrono::Utc::now()
	}

	/// Whole-document swap behind a read-acquire fence, for policy
	/// hot-reload. Triggering the reload (file watching) is out of scope;
	/// only the swap primitive is in scope.
	pub fn swap_policy(&self, new_doc: Arc<PolicyDoc>) {
		*self.policy.write().expect("policy lock poisoned") = new_doc;
	}

	pub fn is_trusted(&self, caller: &str) -> bool {
		self.config.trusted_callers.contains(caller)
	}
}

pub fn default_detokenize_allow_list() -> HashSet<gateway_core::Category> {
	[gateway_core::Category::Pii, gateway_core::Category::OpsSensitive].into_iter().collect()
}
