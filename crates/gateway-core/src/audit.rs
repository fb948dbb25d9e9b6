use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::policy::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
	Classify,
	Redact,
	Detokenize,
	Route,
}

/// Per-category redaction tally attached to audit records and returned
/// from `/redact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionCount {
	pub category: Category,
	pub count: usize,
}

/// One append-only audit line. Never carries raw redacted values, only
/// categories and counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
	pub ts: chrono::DateTime<chrono::Utc>,
	pub caller: String,
	pub context: HashMap<String, String>,
	pub action: AuditAction,
	pub categories: Vec<Category>,
	pub decision: Option<Action>,
	pub redaction_counts: Option<Vec<RedactionCount>>,
	pub target: Option<String>,
	pub policy_version: Option<String>,
}

/// External sink for audit records (SIEM shipper, local JSON-lines file,
/// etc). Kept out of scope for this crate beyond the interface: callers
/// provide their own implementation.
pub trait AuditSink: Send + Sync {
	fn record(&self, record: AuditRecord);
}

/// No-op sink, useful as a default when no SIEM integration is configured.
#[derive(Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
	fn record(&self, _record: AuditRecord) {}
}

pub fn tally(counts: &[RedactionCount]) -> HashMap<Category, usize> {
	counts.iter().map(|c| (c.category, c.count)).collect()
}
