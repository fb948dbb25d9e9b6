use bytes::BytesMut;

/// The two stream framings this gateway forwards: SSE (`data: ... \n\n`,
/// terminator `data: [DONE]\n\n`) and newline-delimited JSON. Grounded in
/// the reference gateway's `parse::sse`/`parse::transform` buffering
/// technique: accumulate bytes, pull out complete frames, leave any
/// trailing partial frame in the buffer for the next chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
	Sse,
	Ndjson,
}

/// One complete frame pulled out of the buffer, plus whatever surrounding
/// bytes (SSE's `data: ` prefix and blank-line terminator, or the NDJSON
/// newline) need to be re-emitted verbatim around the rewritten payload.
#[derive(Debug, Clone)]
pub struct Frame {
	pub payload: String,
}

/// Accumulates raw upstream bytes and yields complete frames as they
/// become available, preserving any partial trailing frame across calls.
#[derive(Debug, Default)]
pub struct FrameSplitter {
	framing: Option<Framing>,
	buf: BytesMut,
}

impl FrameSplitter {
	pub fn new(framing: Framing) -> Self {
		Self { framing: Some(framing), buf: BytesMut::new() }
	}

	pub fn push(&mut self, chunk: &[u8]) {
		self.buf.extend_from_slice(chunk);
	}

	pub fn next_frames(&mut self) -> Vec<Frame> {
		match self.framing {
			Some(Framing::Sse) => self.drain_sse(),
			Some(Framing::Ndjson) => self.drain_ndjson(),
			None => Vec::new(),
		}
	}

	fn drain_sse(&mut self) -> Vec<Frame> {
		let mut frames = Vec::new();
		loop {
			let Some(pos) = find_subslice(&self.buf, b"\n\n") else { break };
			let event = self.buf.split_to(pos + 2);
			let text = String::from_utf8_lossy(&event).to_string();
			for line in text.lines() {
				if let Some(payload) = line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")) {
					frames.push(Frame { payload: payload.trim().to_string() });
				}
			}
		}
		frames
	}

	fn drain_ndjson(&mut self) -> Vec<Frame> {
		let mut frames = Vec::new();
		loop {
			let Some(pos) = find_subslice(&self.buf, b"\n") else { break };
			let line = self.buf.split_to(pos + 1);
			let text = String::from_utf8_lossy(&line[..line.len().saturating_sub(1)]).to_string();
			let trimmed = text.trim();
			if !trimmed.is_empty() {
				frames.push(Frame { payload: trimmed.to_string() });
			}
		}
		frames
	}
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack.windows(needle.len()).position(|w| w == needle)
}

pub fn sse_event(payload: &str) -> String {
	format!("data: {}\n\n", payload)
}

pub fn ndjson_line(payload: &str) -> String {
	format!("{}\n", payload)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_sse_events_across_chunk_boundaries() {
		let mut splitter = FrameSplitter::new(Framing::Sse);
		splitter.push(b"data: {\"a\":1}\n\n");
		let frames = splitter.next_frames();
		assert_eq!(frames.len(), 1);
		assert_eq!(frames[0].payload, "{\"a\":1}");
	}

	#[test]
	fn buffers_partial_sse_event_until_complete() {
		let mut splitter = FrameSplitter::new(Framing::Sse);
		splitter.push(b"data: {\"a\"");
		assert!(splitter.next_frames().is_empty());
		splitter.push(b":1}\n\n");
		let frames = splitter.next_frames();
		assert_eq!(frames.len(), 1);
	}

	#[test]
	fn recognizes_done_sentinel_as_a_frame() {
		let mut splitter = FrameSplitter::new(Framing::Sse);
		splitter.push(b"data: [DONE]\n\n");
		let frames = splitter.next_frames();
		assert_eq!(frames[0].payload, "[DONE]");
	}

	#[test]
	fn splits_ndjson_lines() {
		let mut splitter = FrameSplitter::new(Framing::Ndjson);
		splitter.push(b"{\"a\":1}\n{\"b\":2}\n");
		let frames = splitter.next_frames();
		assert_eq!(frames.len(), 2);
		assert_eq!(frames[1].payload, "{\"b\":2}");
	}
}
