use serde_json::Value;

use super::{ExtractedMessage, ProviderAdapter, ProviderKind};

/// Chat-completion-shaped envelope. `body.messages[*].content`; response
/// at `choices[0].message.content`; stream deltas at
/// `choices[0].delta.content`; terminator is the literal `[DONE]` line.
pub struct OpenAi;

impl ProviderAdapter for OpenAi {
	fn kind(&self) -> ProviderKind {
		ProviderKind::OpenAi
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
		resp.get("choices")?.get(0)?.get("message")?.get("content")?.as_str().map(str::to_string)
	}

	fn inject_response_text(&self, resp: &mut Value, text: &str) {
		if let Some(slot) = resp.get_mut("choices").and_then(|c| c.get_mut(0)).and_then(|c| c.get_mut("message")) {
			slot["content"] = Value::String(text.to_string());
		}
	}

	fn extract_stream_delta_text(&self, frame: &Value) -> Option<String> {
		frame.get("choices")?.get(0)?.get("delta")?.get("content")?.as_str().map(str::to_string)
	}

	fn inject_stream_delta_text(&self, frame: &mut Value, text: &str) {
		if let Some(slot) = frame.get_mut("choices").and_then(|c| c.get_mut(0)).and_then(|c| c.get_mut("delta")) {
			slot["content"] = Value::String(text.to_string());
		}
	}

	fn is_stream_terminator(&self, _frame: &Value, raw_line: &str) -> bool {
		raw_line.trim() == "[DONE]"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn extracts_and_injects_message_content() {
		let body = json!({"messages": [{"role": "user", "content": "hello john.doe@x.io"}]});
		let adapter = OpenAi;
		let extracted = adapter.extract_messages(&body);
		assert_eq!(extracted.len(), 1);
		assert_eq!(extracted[0].text, "hello john.doe@x.io");

		let mut body = body;
		adapter.inject_messages(&mut body, &[ExtractedMessage { index: 0, text: "hello «token:PII:ab12»".to_string() }]);
		assert_eq!(body["messages"][0]["content"], "hello «token:PII:ab12»");
	}

	#[test]
	fn recognizes_done_terminator() {
		let adapter = OpenAi;
		assert!(adapter.is_stream_terminator(&json!({}), "[DONE]"));
		assert!(!adapter.is_stream_terminator(&json!({}), "{}"));
	}
}
