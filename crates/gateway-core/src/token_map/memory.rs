use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::category::Category;
use crate::error::TokenMapError;

use super::{Handle, TokenMapBackend};

struct Entry {
	expiry: Instant,
	kv: Mutex<HashMap<String, (String, Category)>>,
}

/// Concurrent in-memory backend. Expiry is checked lazily on read; nothing
/// is proactively evicted except by `cleanup()`.
#[derive(Default)]
pub struct MemoryTokenMap {
	handles: flurry::HashMap<uuid::Uuid, Entry>,
}

impl MemoryTokenMap {
	pub fn new() -> Self {
		Self { handles: flurry::HashMap::new() }
	}
}

#[async_trait]
impl TokenMapBackend for MemoryTokenMap {
	async fn create(&self, ttl: Duration) -> Result<Handle, TokenMapError> {
		let handle = Handle::new();
		let guard = self.handles.guard();
		self.handles.insert(
			handle.0,
			Entry { expiry: Instant::now() + ttl, kv: Mutex::new(HashMap::new()) },
			&guard,
		);
		Ok(handle)
	}

	async fn put(&self, handle: &Handle, placeholder: &str, raw: &str, category: Category) -> Result<(), TokenMapError> {
		let guard = self.handles.guard();
		let entry = self.handles.get(&handle.0, &guard).ok_or(TokenMapError::HandleNotFound)?;
		if entry.expiry < Instant::now() {
			return Err(TokenMapError::HandleNotFound);
		}
		entry.kv.lock().insert(placeholder.to_string(), (raw.to_string(), category));
		Ok(())
	}

	async fn get(&self, handle: &Handle, placeholder: &str) -> Result<Option<(String, Category)>, TokenMapError> {
		let guard = self.handles.guard();
		let entry = self.handles.get(&handle.0, &guard).ok_or(TokenMapError::HandleNotFound)?;
		if entry.expiry < Instant::now() {
			return Err(TokenMapError::HandleNotFound);
		}
		let value = entry.kv.lock().get(placeholder).cloned();
		Ok(value)
	}

	async fn all(&self, handle: &Handle) -> Result<(HashMap<String, String>, HashMap<String, Category>), TokenMapError> {
		let guard = self.handles.guard();
		let entry = self.handles.get(&handle.0, &guard).ok_or(TokenMapError::HandleNotFound)?;
		if entry.expiry < Instant::now() {
			return Err(TokenMapError::HandleNotFound);
		}
		let kv = entry.kv.lock();
		let mut raw = HashMap::with_capacity(kv.len());
		let mut categories = HashMap::with_capacity(kv.len());
		for (placeholder, (value, category)) in kv.iter() {
			raw.insert(placeholder.clone(), value.clone());
			categories.insert(placeholder.clone(), *category);
		}
		Ok((raw, categories))
	}

	async fn cleanup(&self) -> Result<usize, TokenMapError> {
		let guard = self.handles.guard();
		let now = Instant::now();
		let expired: Vec<uuid::Uuid> =
			self.handles.iter(&guard).filter(|(_, e)| e.expiry < now).map(|(h, _)| *h).collect();
		for h in &expired {
			self.handles.remove(h, &guard);
		}
		Ok(expired.len())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn put_then_get_round_trips() {
		let map = MemoryTokenMap::new();
		let handle = map.create(Duration::from_secs(60)).await.unwrap();
		map.put(&handle, "«token:PII:ab12»", "john.doe@x.io", Category::Pii).await.unwrap();
		let got = map.get(&handle, "«token:PII:ab12»").await.unwrap();
		assert_eq!(got, Some(("john.doe@x.io".to_string(), Category::Pii)));
	}

	#[tokio::test]
	async fn expired_handle_is_not_found() {
		let map = MemoryTokenMap::new();
		let handle = map.create(Duration::from_millis(1)).await.unwrap();
		tokio::time::sleep(Duration::from_millis(20)).await;
		let err = map.get(&handle, "anything").await.unwrap_err();
		assert!(matches!(err, TokenMapError::HandleNotFound));
	}

	#[tokio::test]
	async fn cleanup_removes_expired_handles() {
		let map = MemoryTokenMap::new();
		let _handle = map.create(Duration::from_millis(1)).await.unwrap();
		tokio::time::sleep(Duration::from_millis(20)).await;
		let removed = map.cleanup().await.unwrap();
		assert_eq!(removed, 1);
	}
}
