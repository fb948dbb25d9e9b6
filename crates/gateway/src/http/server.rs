use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::proxy::AppState;

use super::routes;

pub fn router(state: Arc<AppState>) -> Router {
	Router::new()
		.route("/classify", post(routes::classify))
		.route("/redact", post(routes::redact_endpoint))
		.route("/detokenize", post(routes::detokenize_endpoint))
		.route("/route", post(routes::route_endpoint))
		.route("/audit/query", get(routes::audit_query))
		.route("/health", get(routes::health))
		.route("/v1/chat/completions", post(routes::chat_completions))
		.route("/v1/messages", post(routes::anthropic_messages))
		.route("/v1beta/models/:model", post(routes::gemini_generate_content))
		.route("/v1/models/:model", post(routes::gemini_generate_content_v1))
		.fallback(routes::not_found)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
	let app = router(state);
	let listener = tokio::net::TcpListener::bind(addr).await?;
	tracing::info!(%addr, "gateway listening");
	axum::serve(listener, app).await?;
	Ok(())
}
