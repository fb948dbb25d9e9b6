use axum::http::HeaderMap;
use gateway_core::RequestContext;

const HEADER_CALLER: &str = "x-mcp-caller";
const HEADER_REGION: &str = "x-mcp-region";
const HEADER_ENV: &str = "x-mcp-env";
const HEADER_CONVERSATION_ID: &str = "x-mcp-conversation-id";
const HEADER_DOMAIN: &str = "x-mcp-domain";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers.get(name).and_then(|v| v.to_str().ok())
}

/// Parse the `x-mcp-*` request context headers on proxy endpoints. Missing
/// caller/region/conversation id fall back to conservative defaults so a
/// malformed client never silently gets the default-allow decision's more
/// permissive behavior confused with a named, known caller.
pub fn from_headers(headers: &HeaderMap) -> RequestContext {
	let caller = header_str(headers, HEADER_CALLER).unwrap_or("unknown").to_string();
	let region = header_str(headers, HEADER_REGION).unwrap_or("unknown").to_string();
	let env = header_str(headers, HEADER_ENV).unwrap_or("prod").to_string();
	let conversation_id = header_str(headers, HEADER_CONVERSATION_ID).unwrap_or("default").to_string();
	let domain = header_str(headers, HEADER_DOMAIN).map(str::to_string);

	RequestContext { caller, region, env, conversation_id, domain }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_all_headers() {
		let mut headers = HeaderMap::new();
		headers.insert(HEADER_CALLER, "incident-mgr".parse().unwrap());
		headers.insert(HEADER_REGION, "us".parse().unwrap());
		headers.insert(HEADER_CONVERSATION_ID, "INC-1".parse().unwrap());
		let ctx = from_headers(&headers);
		assert_eq!(ctx.caller, "incident-mgr");
		assert_eq!(ctx.region, "us");
		assert_eq!(ctx.conversation_id, "INC-1");
	}

	#[test]
	fn missing_headers_fall_back_to_defaults() {
		let headers = HeaderMap::new();
		let ctx = from_headers(&headers);
		assert_eq!(ctx.caller, "unknown");
		assert_eq!(ctx.conversation_id, "default");
	}
}
