mod memory;
mod remote;

pub use memory::MemoryTokenMap;
pub use remote::{InMemoryRemoteStore, RemoteStore, RemoteTokenMap};

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::category::Category;
use crate::error::TokenMapError;

/// Opaque handle referencing one redact invocation's token map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub Uuid);

impl Handle {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	pub fn as_str(&self) -> String {
		self.0.to_string()
	}
}

impl Default for Handle {
	fn default() -> Self {
		Self::new()
	}
}

/// Two identically-contracted backends: in-memory and remote-encrypted.
/// Created on first redact, mutated only during that same invocation,
/// read by detokenize, destroyed by TTL expiry.
#[async_trait]
pub trait TokenMapBackend: Send + Sync {
	async fn create(&self, ttl: Duration) -> Result<Handle, TokenMapError>;

	async fn put(&self, handle: &Handle, placeholder: &str, raw: &str, category: Category) -> Result<(), TokenMapError>;

	async fn get(&self, handle: &Handle, placeholder: &str) -> Result<Option<(String, Category)>, TokenMapError>;

	/// Returns `(placeholder -> raw, placeholder -> category)`.
	async fn all(&self, handle: &Handle) -> Result<(HashMap<String, String>, HashMap<String, Category>), TokenMapError>;

	/// Removes expired entries, returns the number removed.
	async fn cleanup(&self) -> Result<usize, TokenMapError>;
}

pub const DEFAULT_TTL: Duration = Duration::from_secs(4 * 60 * 60);
