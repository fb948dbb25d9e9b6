use std::collections::VecDeque;
use std::sync::Mutex;

use gateway_core::audit::{AuditRecord, AuditSink};

/// Minimal in-memory tail used to back `/audit/query` locally. Real SIEM
/// shipping is an external sink (out of scope); this just gives the
/// management endpoint something concrete to read from by default.
pub struct LocalAuditLog {
	records: Mutex<VecDeque<AuditRecord>>,
	capacity: usize,
}

impl LocalAuditLog {
	pub fn new(capacity: usize) -> Self {
		Self { records: Mutex::new(VecDeque::with_capacity(capacity)), capacity }
	}

	pub fn tail(&self, limit: usize) -> Vec<AuditRecord> {
		let records = self.records.lock().expect("audit log lock poisoned");
		records.iter().rev().take(limit).cloned().collect()
	}
}

impl AuditSink for LocalAuditLog {
	fn record(&self, record: AuditRecord) {
		let mut records = self.records.lock().expect("audit log lock poisoned");
		if records.len() == self.capacity {
			records.pop_front();
		}
		records.push_back(record);
	}
}
