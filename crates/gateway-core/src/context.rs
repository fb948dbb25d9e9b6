/// Per-request context, carried from the `x-mcp-*` headers on proxy
/// endpoints through to the policy engine, redact and detokenize
/// pipelines.
#[derive(Debug, Clone)]
pub struct RequestContext {
	pub caller: String,
	pub region: String,
	pub env: String,
	pub conversation_id: String,
	pub domain: Option<String>,
}

impl RequestContext {
	pub fn new(caller: impl Into<String>, region: impl Into<String>, conversation_id: impl Into<String>) -> Self {
		Self {
			caller: caller.into(),
			region: region.into(),
			env: "prod".to_string(),
			conversation_id: conversation_id.into(),
			domain: None,
		}
	}
}
