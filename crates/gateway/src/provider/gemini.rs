use serde_json::Value;

use super::{ExtractedMessage, ProviderAdapter, ProviderKind};

/// Candidate-parts-shaped envelope. `body.contents[*].parts[0].text`;
/// response at `candidates[0].content.parts[0].text`; stream is
/// newline-delimited JSON of the same shape with no explicit sentinel —
/// the orchestrator's framing layer ends the stream on connection close
/// or the presence of a `finishReason`.
pub struct Gemini;

impl ProviderAdapter for Gemini {
	fn kind(&self) -> ProviderKind {
		ProviderKind::Gemini
	}

	fn extract_messages(&self, body: &Value) -> Vec<ExtractedMessage> {
		body.get("contents")
			.and_then(Value::as_array)
			.map(|msgs| {
				msgs.iter()
					.enumerate()
					.filter_map(|(index, m)| {
						m.get("parts")?.get(0)?.get("text")?.as_str().map(|s| ExtractedMessage { index, text: s.to_string() })
					})
					.collect()
			})
			.unwrap_or_default()
	}

	fn inject_messages(&self, body: &mut Value, sanitized: &[ExtractedMessage]) {
		if let Some(contents) = body.get_mut("contents").and_then(Value::as_array_mut) {
			for m in sanitized {
				if let Some(part) = contents.get_mut(m.index).and_then(|c| c.get_mut("parts")).and_then(|p| p.get_mut(0)) {
					part["text"] = Value::String(m.text.clone());
				}
			}
		}
	}

	fn extract_response_text(&self, resp: &Value) -> Option<String> {
		resp.get("candidates")?.get(0)?.get("content")?.get("parts")?.get(0)?.get("text")?.as_str().map(str::to_string)
	}

	fn inject_response_text(&self, resp: &mut Value, text: &str) {
		if let Some(slot) = resp
			.get_mut("candidates")
			.and_then(|c| c.get_mut(0))
			.and_then(|c| c.get_mut("content"))
			.and_then(|c| c.get_mut("parts"))
			.and_then(|p| p.get_mut(0))
		{
			slot["text"] = Value::String(text.to_string());
		}
	}

	fn extract_stream_delta_text(&self, frame: &Value) -> Option<String> {
		self.extract_response_text(frame)
	}

	fn inject_stream_delta_text(&self, frame: &mut Value, text: &str) {
		self.inject_response_text(frame, text)
	}

	fn is_stream_terminator(&self, frame: &Value, _raw_line: &str) -> bool {
		frame.get("candidates").and_then(|c| c.get(0)).and_then(|c| c.get("finishReason")).is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn finish_reason_marks_terminator() {
		let adapter = Gemini;
		let frame = json!({"candidates": [{"content": {"parts": [{"text": "ok"}]}, "finishReason": "STOP"}]});
		assert!(adapter.is_stream_terminator(&frame, ""));
	}

	#[test]
	fn extracts_nested_part_text() {
		let adapter = Gemini;
		let resp = json!({"candidates": [{"content": {"parts": [{"text": "hi there"}]}}]});
		assert_eq!(adapter.extract_response_text(&resp), Some("hi there".to_string()));
	}
}
