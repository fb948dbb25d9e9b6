use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Unified error taxonomy for the HTTP surface, mapped one variant at a
/// time to a status code the same way the reference gateway's `ProxyError`
/// maps onto `StatusCode`.
#[derive(Debug, Error)]
pub enum GatewayError {
	#[error("policy blocked this request: {reason}")]
	PolicyBlock { reason: String },

	#[error("caller is not authorized for this operation")]
	Authorization,

	#[error("request payload exceeds the configured maximum")]
	PayloadTooLarge,

	#[error("upstream provider returned status {status}")]
	UpstreamStatus { status: StatusCode, body: String },

	#[error("upstream provider is unreachable: {0}")]
	UpstreamUnreachable(String),

	#[error("upstream request exceeded its deadline")]
	UpstreamTimeout,

	#[error("token map backend is degraded: {0}")]
	BackendDegraded(String),

	#[error("internal error (trace_id={trace_id}): {message}")]
	Internal { trace_id: String, message: String },

	#[error("malformed request: {0}")]
	InvalidRequest(String),
}

impl GatewayError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			GatewayError::PolicyBlock { .. } => StatusCode::FORBIDDEN,
			GatewayError::Authorization => StatusCode::FORBIDDEN,
			GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
			GatewayError::UpstreamStatus { status, .. } => *status,
			GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
			GatewayError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
			GatewayError::BackendDegraded(_) => StatusCode::SERVICE_UNAVAILABLE,
			GatewayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
			GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
		}
	}
}

impl IntoResponse for GatewayError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if let GatewayError::UpstreamStatus { body, .. } = &self {
			return (status, body.clone()).into_response();
		}
		let payload = json!({ "ok": false, "error": self.to_string() });
		(status, axum::Json(payload)).into_response()
	}
}

impl From<gateway_core::error::TokenMapError> for GatewayError {
	fn from(e: gateway_core::error::TokenMapError) -> Self {
		GatewayError::BackendDegraded(e.to_string())
	}
}

impl From<gateway_core::error::DetokenizeError> for GatewayError {
	fn from(e: gateway_core::error::DetokenizeError) -> Self {
		match e {
			gateway_core::error::DetokenizeError::Unauthorized => GatewayError::Authorization,
			gateway_core::error::DetokenizeError::TokenMap(inner) => inner.into(),
		}
	}
}

impl From<gateway_core::redact::RedactError> for GatewayError {
	fn from(e: gateway_core::redact::RedactError) -> Self {
		match e {
			gateway_core::redact::RedactError::PayloadTooLarge => GatewayError::PayloadTooLarge,
			gateway_core::redact::RedactError::TokenMap(inner) => inner.into(),
		}
	}
}
