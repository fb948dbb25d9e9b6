use serde::{Deserialize, Serialize};

/// Sensitivity classification of a detected span.
///
/// Variant order is significant: it is the priority order used when
/// resolving overlapping spans during merge (earlier wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Secret,
	Pii,
	OpsSensitive,
	ExportControl,
}

impl Category {
	/// Priority-ordered list, earliest wins on overlap.
	pub const PRIORITY: [Category; 4] = [
		Category::Secret,
		Category::Pii,
		Category::OpsSensitive,
		Category::ExportControl,
	];

	/// Upper-cased name used in the placeholder wire format (`TYPE` in
	/// `«token:TYPE:HHHH»`).
	pub fn wire_name(&self) -> &'static str {
		match self {
			Category::Secret => "SECRET",
			Category::Pii => "PII",
			Category::OpsSensitive => "OPS_SENSITIVE",
			Category::ExportControl => "EXPORT_CONTROL",
		}
	}

	pub fn from_wire_name(s: &str) -> Option<Category> {
		match s {
			"SECRET" => Some(Category::Secret),
			"PII" => Some(Category::Pii),
			"OPS_SENSITIVE" => Some(Category::OpsSensitive),
			"EXPORT_CONTROL" => Some(Category::ExportControl),
			_ => None,
		}
	}

	pub(crate) fn priority_rank(&self) -> usize {
		Self::PRIORITY.iter().position(|c| c == self).unwrap()
	}
}

impl std::fmt::Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.wire_name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn priority_order_matches_secret_first() {
		assert_eq!(Category::PRIORITY[0], Category::Secret);
		assert_eq!(Category::PRIORITY[3], Category::ExportControl);
	}

	#[test]
	fn wire_name_round_trips() {
		for c in Category::PRIORITY {
			assert_eq!(Category::from_wire_name(c.wire_name()), Some(c));
		}
	}
}
