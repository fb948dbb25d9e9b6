mod claude;
mod gemini;
mod openai;

pub use claude::Claude;
pub use gemini::Gemini;
pub use openai::OpenAi;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
	OpenAi,
	Claude,
	Gemini,
}

/// One extracted message, identified by its position in the envelope's
/// message array so `inject_messages` can write sanitized text back to
/// the same slot.
#[derive(Debug, Clone)]
pub struct ExtractedMessage {
	pub index: usize,
	pub text: String,
}

/// Envelope-specific extract/inject for request messages and response
/// text, plus a pointer describing where a streaming delta's text field
/// lives so the framing layer can pull exactly that substring without
/// re-parsing the whole envelope per chunk.
pub trait ProviderAdapter: Send + Sync {
	fn kind(&self) -> ProviderKind;

	fn extract_messages(&self, body: &Value) -> Vec<ExtractedMessage>;
	fn inject_messages(&self, body: &mut Value, sanitized: &[ExtractedMessage]);

	fn extract_response_text(&self, resp: &Value) -> Option<String>;
	fn inject_response_text(&self, resp: &mut Value, text: &str);

	/// Extract the text delta from one streaming frame, if present.
	fn extract_stream_delta_text(&self, frame: &Value) -> Option<String>;
	/// Write a rewritten delta back into the same frame shape.
	fn inject_stream_delta_text(&self, frame: &mut Value, text: &str);

	/// True if this raw stream line/frame signals the end of the stream.
	fn is_stream_terminator(&self, frame: &Value, raw_line: &str) -> bool;
}

pub fn adapter_for(kind: ProviderKind) -> Box<dyn ProviderAdapter> {
	match kind {
		ProviderKind::OpenAi => Box::new(OpenAi),
		ProviderKind::Claude => Box::new(Claude),
		ProviderKind::Gemini => Box::new(Gemini),
	}
}
