use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use gateway_core::audit::{AuditAction, AuditRecord, AuditSink};
use gateway_core::context::RequestContext;
use gateway_core::detokenize::detokenize;
use gateway_core::find_spans;
use gateway_core::policy::{decide, Action};
use gateway_core::redact::redact;
use gateway_core::token_map::Handle;
use gateway_core::Category;

use crate::context::from_headers;
use crate::error::GatewayError;
use crate::provider::ProviderKind;
use crate::proxy::{orchestrator, AppState};

fn audit_context(ctx: &RequestContext) -> std::collections::HashMap<String, String> {
	let mut out = std::collections::HashMap::new();
	out.insert("region".to_string(), ctx.region.clone());
	out.insert("env".to_string(), ctx.env.clone());
	out.insert("conversation_id".to_string(), ctx.conversation_id.clone());
	out
}

// -- /classify --------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
	text: String,
}

#[derive(Debug, Serialize)]
struct ClassifiedCategory {
	category: Category,
	confidence: f64,
	count: usize,
}

#[derive(Debug, Serialize)]
struct ClassifyResponse {
	categories: Vec<ClassifiedCategory>,
	suggested_action: Action,
}

pub async fn classify(State(state): State<Arc<AppState>>, headers: HeaderMap, Json(req): Json<ClassifyRequest>) -> Response {
	let ctx = from_headers(&headers);
	let spans = find_spans(&req.text);

	let mut counts: std::collections::HashMap<Category, usize> = std::collections::HashMap::new();
	for span in &spans {
		*counts.entry(span.category).or_default() += 1;
	}
	let categories: HashSet<Category> = counts.keys().copied().collect();

	let classified = counts
		.into_iter()
		.map(|(category, count)| {
			// export_control confidence scales with keyword density; every
			// other category is a direct pattern/validator match.
			let confidence = if category == Category::ExportControl { (0.5 + 0.1 * count as f64).min(1.0) } else { 1.0 };
			ClassifiedCategory { category, confidence, count }
		})
		.collect();

	let policy = state.policy_snapshot();
	let decision = decide(&policy, &categories, &ctx);

	if let Some(sink) = &state.audit {
		sink.record(AuditRecord {
			ts: state.now(),
			caller: ctx.caller.clone(),
			context: audit_context(&ctx),
			action: AuditAction::Classify,
			categories: categories.into_iter().collect(),
			decision: Some(decision.action),
			redaction_counts: None,
			target: None,
			policy_version: Some(decision.policy_version.clone()),
		});
	}

	(StatusCode::OK, Json(ClassifyResponse { categories: classified, suggested_action: decision.action })).into_response()
}

// -- /redact ----------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RedactRequest {
	payload: String,
}

#[derive(Debug, Serialize)]
struct RedactedSpan {
	category: Category,
	placeholder: String,
	range: (usize, usize),
}

#[derive(Debug, Serialize)]
struct RedactResponse {
	sanitized_payload: String,
	token_map_handle: String,
	redactions: Vec<RedactedSpan>,
}

pub async fn redact_endpoint(State(state): State<Arc<AppState>>, headers: HeaderMap, Json(req): Json<RedactRequest>) -> Result<Response, GatewayError> {
	let ctx = from_headers(&headers);
	let outcome = redact(state.backend.as_ref(), state.config.process_secret.as_bytes(), &req.payload, &ctx).await?;

	if let Some(sink) = &state.audit {
		sink.record(AuditRecord {
			ts: state.now(),
			caller: ctx.caller.clone(),
			context: audit_context(&ctx),
			action: AuditAction::Redact,
			categories: outcome.spans.iter().map(|s| s.category).collect(),
			decision: None,
			redaction_counts: Some(outcome.redaction_counts()),
			target: None,
			policy_version: None,
		});
	}

	let redactions = outcome.spans.iter().map(|s| RedactedSpan { category: s.category, placeholder: s.placeholder.clone(), range: s.range }).collect();

	Ok((
		StatusCode::OK,
		Json(RedactResponse { sanitized_payload: outcome.sanitized, token_map_handle: outcome.handle.as_str(), redactions }),
	)
		.into_response())
}

// -- /detokenize --------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DetokenizeRequest {
	payload: String,
	token_map_handle: String,
	#[serde(default)]
	allow_categories: Option<HashSet<Category>>,
}

#[derive(Debug, Serialize)]
struct DetokenizeResponse {
	restored_payload: String,
}

pub async fn detokenize_endpoint(
	State(state): State<Arc<AppState>>,
	headers: HeaderMap,
	Json(req): Json<DetokenizeRequest>,
) -> Result<Response, GatewayError> {
	let ctx = from_headers(&headers);
	let handle_uuid = uuid::Uuid::parse_str(&req.token_map_handle).map_err(|_| GatewayError::InvalidRequest("token_map_handle is not a valid handle".to_string()))?;
	let handle = Handle(handle_uuid);
	let allow = req.allow_categories.unwrap_or_else(crate::proxy::default_detokenize_allow_list);

	let restored = detokenize(state.backend.as_ref(), &req.payload, &handle, &allow, &ctx.caller, &state.config.trusted_callers, false).await?;

	if let Some(sink) = &state.audit {
		sink.record(AuditRecord {
			ts: state.now(),
			caller: ctx.caller.clone(),
			context: audit_context(&ctx),
			action: AuditAction::Detokenize,
			categories: allow.into_iter().collect(),
			decision: None,
			redaction_counts: None,
			target: None,
			policy_version: None,
		});
	}

	Ok((StatusCode::OK, Json(DetokenizeResponse { restored_payload: restored })).into_response())
}

// -- /route -------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
	text: String,
}

#[derive(Debug, Serialize)]
struct RoutePlan {
	target: String,
	requires_redaction: bool,
	allow_detokenize: bool,
}

#[derive(Debug, Serialize)]
struct RouteResponse {
	action: Action,
	plan: RoutePlan,
	policy_version: String,
}

pub async fn route_endpoint(State(state): State<Arc<AppState>>, headers: HeaderMap, Json(req): Json<RouteRequest>) -> Result<Response, GatewayError> {
	let ctx = from_headers(&headers);
	let spans = find_spans(&req.text);
	let categories: HashSet<Category> = spans.iter().map(|s| s.category).collect();

	let policy = state.policy_snapshot();
	let decision = decide(&policy, &categories, &ctx);

	if let Some(sink) = &state.audit {
		sink.record(AuditRecord {
			ts: state.now(),
			caller: ctx.caller.clone(),
			context: audit_context(&ctx),
			action: AuditAction::Route,
			categories: categories.into_iter().collect(),
			decision: Some(decision.action),
			redaction_counts: None,
			target: Some(decision.target.clone()),
			policy_version: Some(decision.policy_version.clone()),
		});
	}

	if decision.action == Action::Block {
		return Err(GatewayError::PolicyBlock { reason: "one or more detected categories are blocked by policy".to_string() });
	}

	Ok((
		StatusCode::OK,
		Json(RouteResponse {
			action: decision.action,
			plan: RoutePlan { target: decision.target.clone(), requires_redaction: decision.requires_redaction, allow_detokenize: decision.allow_detokenize },
			policy_version: decision.policy_version.clone(),
		}),
	)
		.into_response())
}

// -- /audit/query ---------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
	#[serde(default = "default_audit_limit")]
	limit: usize,
}

fn default_audit_limit() -> usize {
	100
}

#[derive(Debug, Serialize)]
struct AuditQueryResponse {
	records: Vec<AuditRecord>,
}

pub async fn audit_query(State(state): State<Arc<AppState>>, axum::extract::Query(q): axum::extract::Query<AuditQuery>) -> Response {
	let records = state.audit.as_ref().map(|sink| sink.tail(q.limit)).unwrap_or_default();
	(StatusCode::OK, Json(AuditQueryResponse { records })).into_response()
}

// -- /health --------------------------------------------------------------

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	version: &'static str,
	token_backend: &'static str,
	policy_version: String,
	siem_enabled: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
	let backend_ok = state.backend.cleanup().await.is_ok();
	let policy_version = state.policy_snapshot().version.clone();
	let body = HealthResponse {
		status: if backend_ok { "ok" } else { "degraded" },
		version: env!("CARGO_PKG_VERSION"),
		token_backend: if backend_ok { "ok" } else { "degraded" },
		policy_version,
		siem_enabled: state.audit.is_some(),
	};
	let status = if backend_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
	(status, Json(body)).into_response()
}

// -- transparent proxy endpoints -------------------------------------------

pub async fn chat_completions(State(state): State<Arc<AppState>>, headers: HeaderMap, Json(body): Json<Value>) -> Result<Response, GatewayError> {
	proxy_request(state, ProviderKind::OpenAi, "https://api.openai.com/v1/chat/completions", headers, body).await
}

pub async fn anthropic_messages(State(state): State<Arc<AppState>>, headers: HeaderMap, Json(body): Json<Value>) -> Result<Response, GatewayError> {
	proxy_request(state, ProviderKind::Claude, "https://api.anthropic.com/v1/messages", headers, body).await
}

/// Gemini's path segment is `{model}:generateContent` with no slash between
/// them, so axum's `:model` capture swallows the `:generateContent` suffix
/// too; strip it back off before rebuilding the upstream URL.
fn strip_method_suffix(segment: &str) -> &str {
	segment.strip_suffix(":generateContent").unwrap_or(segment)
}

pub async fn gemini_generate_content(
	State(state): State<Arc<AppState>>,
	Path(segment): Path<String>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Result<Response, GatewayError> {
	let model = strip_method_suffix(&segment);
	let upstream_url = format!("https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent");
	proxy_request(state, ProviderKind::Gemini, &upstream_url, headers, body).await
}

pub async fn gemini_generate_content_v1(
	State(state): State<Arc<AppState>>,
	Path(segment): Path<String>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Result<Response, GatewayError> {
	let model = strip_method_suffix(&segment);
	let upstream_url = format!("https://generativelanguage.googleapis.com/v1/models/{model}:generateContent");
	proxy_request(state, ProviderKind::Gemini, &upstream_url, headers, body).await
}

async fn proxy_request(state: Arc<AppState>, kind: ProviderKind, upstream_url: &str, headers: HeaderMap, body: Value) -> Result<Response, GatewayError> {
	let ctx = from_headers(&headers);
	let is_streaming = body.get("stream").and_then(Value::as_bool).unwrap_or(false);
	orchestrator::handle(state, kind, upstream_url.to_string(), body, headers, ctx, is_streaming).await
}

pub async fn not_found() -> Response {
	(StatusCode::NOT_FOUND, Json(json!({"ok": false, "error": "no such route"}))).into_response()
}
