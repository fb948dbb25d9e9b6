use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Per-conversation salt used to scope placeholder derivation so that
/// identical raw values in different conversations yield different
/// placeholders, while the same raw value within one conversation is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSalt(pub(crate) Vec<u8>);

impl ScopeSalt {
	/// `HMAC-SHA256(processSecret, conversationId || "default")`.
	pub fn derive(process_secret: &[u8], conversation_id: &str) -> Self {
		let mut mac = HmacSha256::new_from_slice(process_secret).expect("hmac accepts any key length");
		mac.update(conversation_id.as_bytes());
		mac.update(b"default");
		Self(mac.finalize().into_bytes().to_vec())
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_conversation_is_deterministic() {
		let a = ScopeSalt::derive(b"secret", "INC-1");
		let b = ScopeSalt::derive(b"secret", "INC-1");
		assert_eq!(a, b);
	}

	#[test]
	fn different_conversations_diverge() {
		let a = ScopeSalt::derive(b"secret", "INC-1");
		let b = ScopeSalt::derive(b"secret", "INC-2");
		assert_ne!(a, b);
	}
}
