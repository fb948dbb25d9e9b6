use serde_json::Value;

use super::{ExtractedMessage, ProviderAdapter, ProviderKind};

/// Messages-block-shaped envelope. `body.messages[*].content`; response at
/// `content[0].text`; stream events are typed, with text deltas under
/// `delta.text` on `content_block_delta` events and the terminator being
/// a `message_stop` event.
pub struct Claude;

impl ProviderAdapter for Claude {
	fn kind(&self) -> ProviderKind {
		ProviderKind::Claude
	}

	fn extract_messages(&self, body: &Value) -> Vec<ExtractedMessage> {
		body.get("messages")
			.and_then(Value::as_array)
			.map(|msgs| {
				msgs.iter()
					.enumerate()
					.filter_map(|(index, m)| m.get("content")?.as_str().map(|s| ExtractedMessage { index, text: s.to_string() }))
					.collect()
			})
			.unwrap_or_default()
	}

	fn inject_messages(&self, body: &mut Value, sanitized: &[ExtractedMessage]) {
		if let Some(msgs) = body.get_mut("messages").and_then(Value::as_array_mut) {
			for m in sanitized {
				if let Some(target) = msgs.get_mut(m.index) {
					target["content"] = Value::String(m.text.clone());
				}
			}
		}
	}

	fn extract_response_text(&self, resp: &Value) -> Option<String> {
		resp.get("content")?.get(0)?.get("text")?.as_str().map(str::to_string)
	}

	fn inject_response_text(&self, resp: &mut Value, text: &str) {
		if let Some(slot) = resp.get_mut("content").and_then(|c| c.get_mut(0)) {
			slot["text"] = Value::String(text.to_string());
		}
	}

	fn extract_stream_delta_text(&self, frame: &Value) -> Option<String> {
		if frame.get("type")?.as_str()? != "content_block_delta" {
			return None;
		}
		frame.get("delta")?.get("text")?.as_str().map(str::to_string)
	}

	fn inject_stream_delta_text(&self, frame: &mut Value, text: &str) {
		if let Some(slot) = frame.get_mut("delta") {
			slot["text"] = Value::String(text.to_string());
		}
	}

	fn is_stream_terminator(&self, frame: &Value, _raw_line: &str) -> bool {
		frame.get("type").and_then(Value::as_str) == Some("message_stop")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn extracts_delta_text_only_from_content_block_delta() {
		let adapter = Claude;
		let frame = json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "hi"}});
		assert_eq!(adapter.extract_stream_delta_text(&frame), Some("hi".to_string()));

		let other = json!({"type": "ping"});
		assert_eq!(adapter.extract_stream_delta_text(&other), None);
	}

	#[test]
	fn message_stop_is_the_terminator() {
		let adapter = Claude;
		assert!(adapter.is_stream_terminator(&json!({"type": "message_stop"}), ""));
		assert!(!adapter.is_stream_terminator(&json!({"type": "ping"}), ""));
	}
}
