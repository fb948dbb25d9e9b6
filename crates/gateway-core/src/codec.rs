use hmac::{Hmac, Mac};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::Sha256;

use crate::category::Category;
use crate::scope::ScopeSalt;

type HmacSha256 = Hmac<Sha256>;

/// Recognition regex for the placeholder wire format. A change here breaks
/// any token map already in flight, since it is a wire contract.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"«token:([A-Z_]+):([0-9a-f]{4})»").unwrap());

/// `placeholder(type, raw, scopeSalt) = "«token:" + type + ":" + hex(HMAC_SHA256(scopeSalt, raw)[0..2]) + "»"`.
pub fn placeholder(category: Category, raw: &str, scope_salt: &ScopeSalt) -> String {
	let mut mac = HmacSha256::new_from_slice(scope_salt.as_bytes()).expect("hmac accepts any key length");
	mac.update(raw.as_bytes());
	let digest = mac.finalize().into_bytes();
	format!("«token:{}:{}»", category.wire_name(), hex::encode(&digest[0..2]))
}

/// A recognized placeholder occurrence within a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognized {
	pub start: usize,
	pub end: usize,
	pub text: String,
	pub category: Option<Category>,
}

/// Scan `text` for placeholder-shaped substrings, in order of appearance.
/// Unknown `TYPE` values (not a known category wire name) are still
/// recognized as placeholder-shaped but carry `category: None`; callers
/// decide whether to treat that as an error.
pub fn recognize(text: &str) -> Vec<Recognized> {
	PLACEHOLDER_RE
		.captures_iter(text)
		.map(|caps| {
			let m = caps.get(0).unwrap();
			let ty = caps.get(1).unwrap().as_str();
			Recognized {
				start: m.start(),
				end: m.end(),
				text: m.as_str().to_string(),
				category: Category::from_wire_name(ty),
			}
		})
		.collect()
}

/// True if `s` is exactly one well-formed placeholder and nothing else.
pub fn is_placeholder(s: &str) -> bool {
	PLACEHOLDER_RE.find(s).map(|m| m.start() == 0 && m.end() == s.len()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn placeholder_is_deterministic_within_scope() {
		let salt = ScopeSalt::derive(b"secret", "INC-1");
		let a = placeholder(Category::Pii, "john.doe@x.io", &salt);
		let b = placeholder(Category::Pii, "john.doe@x.io", &salt);
		assert_eq!(a, b);
	}

	#[test]
	fn placeholder_diverges_across_scopes() {
		let s1 = ScopeSalt::derive(b"secret", "INC-1");
		let s2 = ScopeSalt::derive(b"secret", "INC-2");
		let a = placeholder(Category::Pii, "john.doe@x.io", &s1);
		let b = placeholder(Category::Pii, "john.doe@x.io", &s2);
		assert_ne!(a, b);
	}

	#[test]
	fn recognize_finds_embedded_placeholder() {
		let salt = ScopeSalt::derive(b"secret", "INC-1");
		let ph = placeholder(Category::Pii, "john.doe@x.io", &salt);
		let text = format!("hello {} world", ph);
		let found = recognize(&text);
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].category, Some(Category::Pii));
		assert_eq!(found[0].text, ph);
	}

	#[test]
	fn recognize_ignores_malformed_lookalikes() {
		let found = recognize("«token:PII:zz»");
		assert!(found.is_empty());
	}
}
