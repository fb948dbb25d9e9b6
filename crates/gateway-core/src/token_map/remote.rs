use std::collections::HashMap;
use std::time::Duration;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::TokenMapError;

use super::{Handle, TokenMapBackend};

const NONCE_LEN: usize = 12;
const PBKDF2_ROUNDS: u32 = 100_000;

/// A network-addressable key/value store the remote backend encrypts
/// against. Implementations are responsible for their own TTL expiry of
/// blobs (e.g. native Redis/DynamoDB TTL); this crate never assumes it can
/// enumerate a remote store's full keyspace cheaply.
#[async_trait]
pub trait RemoteStore: Send + Sync {
	async fn put_blob(&self, key: &str, blob: Vec<u8>, ttl: Duration) -> Result<(), TokenMapError>;
	/// Returns the blob along with its remaining TTL, so a caller that reads
	/// and re-writes a blob (`RemoteTokenMap::put`) can preserve the original
	/// expiry instead of re-arming it.
	async fn get_blob(&self, key: &str) -> Result<Option<(Vec<u8>, Duration)>, TokenMapError>;
}

/// In-process stand-in for a real remote store, used by tests and local
/// development. Expiry is checked on read, same as the memory backend.
#[derive(Default)]
pub struct InMemoryRemoteStore {
	blobs: Mutex<HashMap<String, (Vec<u8>, std::time::Instant)>>,
}

impl InMemoryRemoteStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
	async fn put_blob(&self, key: &str, blob: Vec<u8>, ttl: Duration) -> Result<(), TokenMapError> {
		self.blobs.lock().insert(key.to_string(), (blob, std::time::Instant::now() + ttl));
		Ok(())
	}

	async fn get_blob(&self, key: &str) -> Result<Option<(Vec<u8>, Duration)>, TokenMapError> {
		let guard = self.blobs.lock();
		let now = std::time::Instant::now();
		match guard.get(key) {
			Some((blob, expiry)) if *expiry >= now => Ok(Some((blob.clone(), expiry.saturating_duration_since(now)))),
			_ => Ok(None),
		}
	}
}

#[derive(Serialize, Deserialize, Default)]
struct StoredMap {
	kv: HashMap<String, (String, Category)>,
}

/// Remote-backed token map: entries are AES-256-GCM encrypted at rest, with
/// the key derived from a passphrase via PBKDF2-HMAC-SHA256. TTL is
/// delegated to the underlying `RemoteStore`, matching how a real remote
/// KV (Redis `EXPIRE`, DynamoDB TTL attribute) already provides it.
pub struct RemoteTokenMap<S: RemoteStore> {
	store: S,
	key: [u8; 32],
}

impl<S: RemoteStore> RemoteTokenMap<S> {
	pub fn new(store: S, passphrase: &[u8], salt: &[u8]) -> Self {
		let mut key = [0u8; 32];
		pbkdf2::pbkdf2_hmac::<sha2::Sha256>(passphrase, salt, PBKDF2_ROUNDS, &mut key);
		Self { store, key }
	}

	fn cipher(&self) -> Aes256Gcm {
		Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key))
	}

	fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, TokenMapError> {
		let mut nonce_bytes = [0u8; NONCE_LEN];
		rand::thread_rng().fill_bytes(&mut nonce_bytes);
		let nonce = Nonce::from_slice(&nonce_bytes);
		let ciphertext = self
			.cipher()
			.encrypt(nonce, plaintext)
			.map_err(|e| TokenMapError::Crypto(e.to_string()))?;
		let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
		out.extend_from_slice(&nonce_bytes);
		out.extend_from_slice(&ciphertext);
		Ok(out)
	}

	fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, TokenMapError> {
		if blob.len() < NONCE_LEN {
			return Err(TokenMapError::Crypto("blob shorter than nonce".into()));
		}
		let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
		let nonce = Nonce::from_slice(nonce_bytes);
		self.cipher()
			.decrypt(nonce, ciphertext)
			.map_err(|e| TokenMapError::Crypto(e.to_string()))
	}

	/// Returns the decrypted map alongside its remaining TTL, so callers that
	/// read-then-write (`put`) can re-save without resetting the expiry.
	async fn load(&self, handle: &Handle) -> Result<(StoredMap, Duration), TokenMapError> {
		let (blob, remaining_ttl) = self.store.get_blob(&handle.as_str()).await?.ok_or(TokenMapError::HandleNotFound)?;
		let plaintext = self.decrypt(&blob)?;
		let map = serde_json::from_slice(&plaintext).map_err(|e| TokenMapError::Backend(e.to_string()))?;
		Ok((map, remaining_ttl))
	}

	async fn save(&self, handle: &Handle, map: &StoredMap, ttl: Duration) -> Result<(), TokenMapError> {
		let plaintext = serde_json::to_vec(map).map_err(|e| TokenMapError::Backend(e.to_string()))?;
		let blob = self.encrypt(&plaintext)?;
		self.store.put_blob(&handle.as_str(), blob, ttl).await
	}
}

#[async_trait]
impl<S: RemoteStore> TokenMapBackend for RemoteTokenMap<S> {
	async fn create(&self, ttl: Duration) -> Result<Handle, TokenMapError> {
		let handle = Handle::new();
		self.save(&handle, &StoredMap::default(), ttl).await?;
		Ok(handle)
	}

	async fn put(&self, handle: &Handle, placeholder: &str, raw: &str, category: Category) -> Result<(), TokenMapError> {
		let (mut stored, remaining_ttl) = self.load(handle).await?;
		stored.kv.insert(placeholder.to_string(), (raw.to_string(), category));
		// Re-save with the TTL already remaining on the handle, not the
		// default: a write must extend the map's contents, never the
		// handle's lifetime, matching the in-memory backend's contract.
		self.save(handle, &stored, remaining_ttl).await
	}

	async fn get(&self, handle: &Handle, placeholder: &str) -> Result<Option<(String, Category)>, TokenMapError> {
		let (stored, _) = self.load(handle).await?;
		Ok(stored.kv.get(placeholder).cloned())
	}

	async fn all(&self, handle: &Handle) -> Result<(HashMap<String, String>, HashMap<String, Category>), TokenMapError> {
		let (stored, _) = self.load(handle).await?;
		let mut raw = HashMap::with_capacity(stored.kv.len());
		let mut categories = HashMap::with_capacity(stored.kv.len());
		for (placeholder, (value, category)) in stored.kv {
			raw.insert(placeholder.clone(), value);
			categories.insert(placeholder, category);
		}
		Ok((raw, categories))
	}

	/// The remote store owns TTL expiry natively; nothing to sweep here.
	async fn cleanup(&self) -> Result<usize, TokenMapError> {
		Ok(0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn map() -> RemoteTokenMap<InMemoryRemoteStore> {
		RemoteTokenMap::new(InMemoryRemoteStore::new(), b"passphrase", b"salt")
	}

	#[tokio::test]
	async fn put_then_get_round_trips_through_encryption() {
		let m = map();
		let handle = m.create(Duration::from_secs(60)).await.unwrap();
		m.put(&handle, "«token:SECRET:ab12»", "sk-live-xyz", Category::Secret).await.unwrap();
		let got = m.get(&handle, "«token:SECRET:ab12»").await.unwrap();
		assert_eq!(got, Some(("sk-live-xyz".to_string(), Category::Secret)));
	}

	#[tokio::test]
	async fn expired_handle_is_not_found() {
		let m = map();
		let handle = m.create(Duration::from_millis(1)).await.unwrap();
		tokio::time::sleep(Duration::from_millis(20)).await;
		let err = m.get(&handle, "anything").await.unwrap_err();
		assert!(matches!(err, TokenMapError::HandleNotFound));
	}

	#[tokio::test]
	async fn put_preserves_remaining_ttl_instead_of_resetting_it() {
		let m = map();
		let handle = m.create(Duration::from_millis(60)).await.unwrap();
		tokio::time::sleep(Duration::from_millis(30)).await;
		m.put(&handle, "«token:SECRET:ab12»", "sk-live-xyz", Category::Secret).await.unwrap();
		// If `put` re-armed the TTL to `DEFAULT_TTL` instead of preserving
		// what was left on the handle, this would still find it.
		tokio::time::sleep(Duration::from_millis(40)).await;
		let err = m.get(&handle, "«token:SECRET:ab12»").await.unwrap_err();
		assert!(matches!(err, TokenMapError::HandleNotFound));
	}
}
