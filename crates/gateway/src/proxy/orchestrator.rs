use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use serde_json::Value;

use gateway_core::context::RequestContext;
use gateway_core::policy::{decide, Action};
use gateway_core::redact::redact;
use gateway_core::stream_detokenizer::{HandleSnapshot, StreamState};
use gateway_core::token_map::Handle;
use gateway_core::Category;

use crate::error::GatewayError;
use crate::provider::{adapter_for, ExtractedMessage, ProviderAdapter, ProviderKind};
use crate::proxy::framing::{ndjson_line, sse_event, Framing, FrameSplitter};
use crate::proxy::AppState;

const HOP_BY_HOP_HEADERS: &[&str] = &["host", "content-length", "connection"];

fn framing_for(kind: ProviderKind) -> Framing {
	match kind {
		ProviderKind::OpenAi | ProviderKind::Claude => Framing::Sse,
		ProviderKind::Gemini => Framing::Ndjson,
	}
}

fn build_upstream_request(
	state: &AppState,
	upstream_url: &str,
	headers: &HeaderMap,
	body: &Value,
) -> reqwest::Request {
	let mut req = state.client.inner().post(upstream_url).json(body).build().expect("upstream request always buildable");
	for (name, value) in headers {
		let name_lower = name.as_str().to_ascii_lowercase();
		if HOP_BY_HOP_HEADERS.contains(&name_lower.as_str()) {
			continue;
		}
		if let (Ok(n), Ok(v)) = (reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes()), reqwest::header::HeaderValue::from_bytes(value.as_bytes()))
		{
			req.headers_mut().insert(n, v);
		}
	}
	req
}

struct RedactedMessages {
	sanitized: Vec<ExtractedMessage>,
	active_handle: Option<Handle>,
	categories: HashSet<Category>,
}

/// REDACT_INPUTS: extract messages, redact each non-empty text,
/// accumulate per-message handles. The *last* non-nil handle becomes the
/// request's active handle, matching the "user's message is last" framing
/// from the response-side DETOKENIZE_RESPONSE step.
async fn redact_inputs(state: &AppState, adapter: &dyn ProviderAdapter, body: &Value, ctx: &RequestContext) -> Result<RedactedMessages, GatewayError> {
	let messages = adapter.extract_messages(body);
	let mut sanitized = Vec::with_capacity(messages.len());
	let mut active_handle = None;
	let mut categories = HashSet::new();

	for m in messages {
		if m.text.is_empty() {
			sanitized.push(m);
			continue;
		}
		let outcome = redact(state.backend.as_ref(), state.config.process_secret.as_bytes(), &m.text, ctx).await?;
		for span in &outcome.spans {
			categories.insert(span.category);
		}
		active_handle = Some(outcome.handle);
		sanitized.push(ExtractedMessage { index: m.index, text: outcome.sanitized });
	}

	Ok(RedactedMessages { sanitized, active_handle, categories })
}

/// Full request handling for one transparent proxy endpoint. Returns the
/// client-facing response, having already run PARSE -> REDACT_INPUTS ->
/// FORWARD -> (DETOKENIZE_RESPONSE | STREAM_LOOP -> FLUSH_TAIL).
pub async fn handle(
	state: Arc<AppState>,
	provider_kind: ProviderKind,
	upstream_url: String,
	mut body: Value,
	headers: HeaderMap,
	ctx: RequestContext,
	is_streaming: bool,
) -> Result<Response, GatewayError> {
	let adapter = adapter_for(provider_kind);

	let redacted = redact_inputs(&state, adapter.as_ref(), &body, &ctx).await?;

	let policy = state.policy_snapshot();
	let decision = decide(&policy, &redacted.categories, &ctx);
	if decision.action == Action::Block {
		return Err(GatewayError::PolicyBlock { reason: format!("categories {:?} blocked by policy", redacted.categories) });
	}

	adapter.inject_messages(&mut body, &redacted.sanitized);

	let req = build_upstream_request(&state, &upstream_url, &headers, &body);
	let upstream_resp = state.client.forward(req).await?;
	let status = upstream_resp.status();

	if !status.is_success() {
		let body_text = upstream_resp.text().await.unwrap_or_default();
		return Err(GatewayError::UpstreamStatus { status, body: body_text });
	}

	if is_streaming {
		let Some(handle) = redacted.active_handle else {
			let bytes = upstream_resp.bytes().await.map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;
			return Ok((StatusCode::OK, bytes).into_response());
		};
		let snapshot = HandleSnapshot::load(state.backend.as_ref(), &handle).await?;
		let framing = framing_for(provider_kind);
		let byte_stream = upstream_resp.bytes_stream();
		let rewritten = rewrite_stream(byte_stream, framing, adapter, snapshot);
		return Ok(Response::builder().status(StatusCode::OK).body(Body::from_stream(rewritten)).expect("static response builder"));
	}

	let mut resp_json: Value = upstream_resp.json().await.map_err(|e| GatewayError::UpstreamUnreachable(e.to_string()))?;

	if let Some(handle) = redacted.active_handle {
		if let Some(text) = adapter.extract_response_text(&resp_json) {
			let allow = crate::proxy::default_detokenize_allow_list();
			let restored = gateway_core::detokenize::detokenize(state.backend.as_ref(), &text, &handle, &allow, &ctx.caller, &state.config.trusted_callers, true)
				.await?;

			let restored = if let Some(hook) = &state.post_verify {
				match hook.verify(&restored).await {
					Ok(warnings) if !warnings.is_empty() => {
						resp_json["warnings"] = serde_json::json!(warnings);
						restored
					}
					_ => restored,
				}
			} else {
				restored
			};

			adapter.inject_response_text(&mut resp_json, &restored);
		}
	}

	Ok((StatusCode::OK, axum::Json(resp_json)).into_response())
}

fn delta_template(kind: ProviderKind) -> Value {
	match kind {
		ProviderKind::OpenAi => serde_json::json!({"choices": [{"delta": {}}]}),
		ProviderKind::Claude => serde_json::json!({"type": "content_block_delta", "delta": {"type": "text_delta"}}),
		ProviderKind::Gemini => serde_json::json!({"candidates": [{"content": {"parts": [{}]}}]}),
	}
}

fn raw_frame(framing: Framing, payload: &str) -> String {
	match framing {
		Framing::Sse => sse_event(payload),
		Framing::Ndjson => ndjson_line(payload),
	}
}

/// STREAM_LOOP + FLUSH_TAIL: reads upstream frame-by-frame, rewrites only
/// the text payload through the Streaming Detokenizer, and re-emits the
/// surrounding framing verbatim. On the stream terminator, emits
/// `flush()` as a synthesized terminal text delta before the terminator.
fn rewrite_stream(
	upstream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
	framing: Framing,
	adapter: Box<dyn ProviderAdapter>,
	snapshot: HandleSnapshot,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
	struct Loop {
		upstream: std::pin::Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
		splitter: FrameSplitter,
		state: StreamState,
		adapter: Box<dyn ProviderAdapter>,
		snapshot: HandleSnapshot,
		kind: ProviderKind,
		framing: Framing,
		pending: VecDeque<Bytes>,
		done: bool,
	}

	impl Loop {
		/// Synthesize `flush()`'s leftover text as a terminal delta frame
		/// in this provider's shape, queued just before the terminator.
		fn emit_flush_tail(&mut self) {
			let tail = self.state.flush();
			if tail.is_empty() {
				return;
			}
			let mut template = delta_template(self.kind);
			self.adapter.inject_stream_delta_text(&mut template, &tail);
			let serialized = serde_json::to_string(&template).unwrap_or_default();
			self.pending.push_back(Bytes::from(raw_frame(self.framing, &serialized)));
		}
	}

	let kind = adapter.kind();
	let initial = Loop {
		upstream: Box::pin(upstream),
		splitter: FrameSplitter::new(framing),
		state: StreamState::new(),
		adapter,
		snapshot,
		kind,
		framing,
		pending: VecDeque::new(),
		done: false,
	};

	stream::unfold(initial, move |mut st| async move {
		loop {
			if let Some(chunk) = st.pending.pop_front() {
				return Some((Ok(chunk), st));
			}
			if st.done {
				return None;
			}

			match st.upstream.next().await {
				Some(Ok(bytes)) => {
					st.splitter.push(&bytes);
					let frames = st.splitter.next_frames();
					for frame in frames {
						if frame.payload == "[DONE]" {
							st.emit_flush_tail();
							st.pending.push_back(Bytes::from(raw_frame(framing, "[DONE]")));
							st.done = true;
							continue;
						}
						let Ok(mut json_frame) = serde_json::from_str::<Value>(&frame.payload) else {
							st.pending.push_back(Bytes::from(raw_frame(framing, &frame.payload)));
							continue;
						};
						let is_terminator = st.adapter.is_stream_terminator(&json_frame, &frame.payload);
						if let Some(delta) = st.adapter.extract_stream_delta_text(&json_frame) {
							let safe = st.state.process_chunk(&delta, &st.snapshot);
							st.adapter.inject_stream_delta_text(&mut json_frame, &safe);
						}
						let serialized = serde_json::to_string(&json_frame).unwrap_or_default();
						st.pending.push_back(Bytes::from(raw_frame(framing, &serialized)));
						if is_terminator {
							st.emit_flush_tail();
							st.done = true;
						}
					}
					if let Some(chunk) = st.pending.pop_front() {
						return Some((Ok(chunk), st));
					}
				}
				Some(Err(e)) => {
					return Some((Err(std::io::Error::new(std::io::ErrorKind::Other, e)), st));
				}
				None => {
					st.emit_flush_tail();
					if let Some(chunk) = st.pending.pop_front() {
						return Some((Ok(chunk), st));
					}
					return None;
				}
			}
		}
	})
}
