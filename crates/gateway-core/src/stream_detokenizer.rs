use std::collections::HashMap;

use crate::category::Category;
use crate::codec::recognize;
use crate::error::TokenMapError;
use crate::token_map::{Handle, TokenMapBackend};

/// A point-in-time snapshot of one handle's token map, loaded once before a
/// stream starts. `processChunk` is pure and must not suspend, so it never
/// reaches back into the token map backend mid-stream.
#[derive(Debug, Clone, Default)]
pub struct HandleSnapshot {
	raw: HashMap<String, String>,
	categories: HashMap<String, Category>,
}

impl HandleSnapshot {
	pub async fn load(backend: &dyn TokenMapBackend, handle: &Handle) -> Result<Self, TokenMapError> {
		let (raw, categories) = backend.all(handle).await?;
		Ok(Self { raw, categories })
	}

	fn restore(&self, placeholder: &str) -> String {
		match self.categories.get(placeholder) {
			Some(Category::Pii) | Some(Category::OpsSensitive) => {
				self.raw.get(placeholder).cloned().unwrap_or_else(|| placeholder.to_string())
			}
			_ => placeholder.to_string(),
		}
	}
}

/// `{handle, buffer}` from the original design; the handle here is carried
/// by whichever `HandleSnapshot` the orchestrator passes to each call, so
/// this type only needs to own the buffer.
#[derive(Debug, Default)]
pub struct StreamState {
	buffer: String,
}

impl StreamState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append `chunk`, emit everything that is either outside any
	/// placeholder site or a fully resolved placeholder, and retain at
	/// most one trailing partial-placeholder prefix in the buffer.
	pub fn process_chunk(&mut self, chunk: &str, snapshot: &HandleSnapshot) -> String {
		self.buffer.push_str(chunk);

		let matches = recognize(&self.buffer);
		if matches.is_empty() {
			let (emit, keep) = split_trailing_partial(&self.buffer);
			self.buffer = keep;
			return emit;
		}

		let mut out = String::new();
		let mut last_end = 0;
		for m in &matches {
			out.push_str(&self.buffer[last_end..m.start]);
			out.push_str(&snapshot.restore(&m.text));
			last_end = m.end;
		}
		let (emit, keep) = split_trailing_partial(&self.buffer[last_end..]);
		self.buffer = keep;
		out.push_str(&emit);
		out
	}

	/// Emit and clear the buffer unchanged; a partial placeholder prefix
	/// falls through as literal text at stream end.
	pub fn flush(&mut self) -> String {
		std::mem::take(&mut self.buffer)
	}
}

/// Split `text` at the last unterminated `«` (an opening guillemet with no
/// matching `»` after it), which marks the start of a placeholder that
/// might still be in flight. Everything before that point is safe to
/// emit now; everything from that point on must wait for more bytes.
fn split_trailing_partial(text: &str) -> (String, String) {
	if let Some(idx) = text.rfind('«') {
		if !text[idx..].contains('»') {
			return (text[..idx].to_string(), text[idx..].to_string());
		}
	}
	(text.to_string(), String::new())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn snapshot() -> HandleSnapshot {
		HandleSnapshot {
			raw: HashMap::from([("«token:PII:ab12»".to_string(), "john.doe@x.io".to_string())]),
			categories: HashMap::from([("«token:PII:ab12»".to_string(), Category::Pii)]),
		}
	}

	#[test]
	fn restores_a_placeholder_split_across_four_chunks() {
		let snap = snapshot();
		let mut state = StreamState::new();
		let mut out = String::new();
		out.push_str(&state.process_chunk("hello «tok", &snap));
		out.push_str(&state.process_chunk("en:PII:", &snap));
		out.push_str(&state.process_chunk("ab12» wor", &snap));
		out.push_str(&state.process_chunk("ld", &snap));
		out.push_str(&state.flush());
		assert_eq!(out, "hello john.doe@x.io world");
	}

	#[test]
	fn never_restores_secret_category() {
		let snap = HandleSnapshot {
			raw: HashMap::from([("«token:SECRET:ab12»".to_string(), "sk-live-xyz".to_string())]),
			categories: HashMap::from([("«token:SECRET:ab12»".to_string(), Category::Secret)]),
		};
		let mut state = StreamState::new();
		let out = state.process_chunk("key «token:SECRET:ab12» end", &snap);
		assert!(out.contains("«token:SECRET:ab12»"));
		assert!(!out.contains("sk-live-xyz"));
	}

	#[test]
	fn flush_emits_partial_prefix_as_literal_text() {
		let snap = snapshot();
		let mut state = StreamState::new();
		let _ = state.process_chunk("trailing «tok", &snap);
		let tail = state.flush();
		assert_eq!(tail, "«tok");
	}

	#[test]
	fn emits_unrelated_text_immediately() {
		let snap = snapshot();
		let mut state = StreamState::new();
		let out = state.process_chunk("no placeholders here", &snap);
		assert_eq!(out, "no placeholders here");
	}
}
