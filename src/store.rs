use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::StoreError;

/// A synchronous key-value store addressed by `(namespace, address)`.
/// Values are opaque strings; writes overwrite.
pub trait KeyStore: Send + Sync {
	fn get(&self, namespace: &str, address: &str) -> Result<Option<String>, StoreError>;

	fn put(&self, namespace: &str, address: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyStore + ?Sized> KeyStore for Arc<S> {
	fn get(&self, namespace: &str, address: &str) -> Result<Option<String>, StoreError> {
		(**self).get(namespace, address)
	}

	fn put(&self, namespace: &str, address: &str, value: &str) -> Result<(), StoreError> {
		(**self).put(namespace, address, value)
	}
}

// -- In-memory backend --

#[derive(Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl KeyStore for MemoryStore {
	fn get(&self, namespace: &str, address: &str) -> Result<Option<String>, StoreError> {
		let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		Ok(entries.get(&(namespace.to_owned(), address.to_owned())).cloned())
	}

	fn put(&self, namespace: &str, address: &str, value: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		entries.insert((namespace.to_owned(), address.to_owned()), value.to_owned());
		Ok(())
	}
}

// -- JSON file backend --

/// On-disk layout: `{ "<namespace>": { "<address>": "<value>" } }`.
type FileContents = BTreeMap<String, BTreeMap<String, String>>;

/// Persists entries as a single JSON document.  Every `put` rewrites the
/// file through a temporary sibling and a rename, so a crash mid-write
/// leaves the previous contents intact.
pub struct FileStore {
	path: PathBuf,
	lock: Mutex<()>,
}

impl FileStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read(&self) -> Result<FileContents, StoreError> {
		if !self.path.exists() {
			return Ok(FileContents::new());
		}
		let raw = std::fs::read_to_string(&self.path)?;
		if raw.trim().is_empty() {
			return Ok(FileContents::new());
		}
		serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))
	}

	fn write(&self, contents: &FileContents) -> Result<(), StoreError> {
		if let Some(parent) = self.path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let serialized = serde_json::to_string_pretty(contents)
			.map_err(|e| StoreError::Corrupt(e.to_string()))?;
		let tmp = self.path.with_extension("json.tmp");
		std::fs::write(&tmp, serialized)?;
		std::fs::rename(&tmp, &self.path)?;
		Ok(())
	}
}

impl KeyStore for FileStore {
	fn get(&self, namespace: &str, address: &str) -> Result<Option<String>, StoreError> {
		let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
		let contents = self.read()?;
		Ok(contents
			.get(namespace)
			.and_then(|ns| ns.get(address))
			.cloned())
	}

	fn put(&self, namespace: &str, address: &str, value: &str) -> Result<(), StoreError> {
		let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
		let mut contents = self.read()?;
		contents
			.entry(namespace.to_owned())
			.or_default()
			.insert(address.to_owned(), value.to_owned());
		self.write(&contents)?;
		debug!(namespace, address, path = %self.path.display(), "key store entry written");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_store_overwrites() {
		let store = MemoryStore::new();
		assert!(store.get("ns", "addr").unwrap().is_none());

		store.put("ns", "addr", "aa").unwrap();
		store.put("ns", "addr", "bb").unwrap();
		assert_eq!(store.get("ns", "addr").unwrap().as_deref(), Some("bb"));
	}

	#[test]
	fn namespaces_are_independent() {
		let store = MemoryStore::new();
		store.put("one", "addr", "1").unwrap();
		store.put("two", "addr", "2").unwrap();
		assert_eq!(store.get("one", "addr").unwrap().as_deref(), Some("1"));
		assert_eq!(store.get("two", "addr").unwrap().as_deref(), Some("2"));
	}

	#[test]
	fn file_store_persists_across_instances() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("keys.json");

		FileStore::new(&path).put("ns", "0xabc", "02ff").unwrap();
		FileStore::new(&path).put("ns", "0xdef", "03ee").unwrap();

		let reopened = FileStore::new(&path);
		assert_eq!(reopened.get("ns", "0xabc").unwrap().as_deref(), Some("02ff"));
		assert_eq!(reopened.get("ns", "0xdef").unwrap().as_deref(), Some("03ee"));
		assert!(reopened.get("other", "0xabc").unwrap().is_none());
	}

	#[test]
	fn file_store_missing_file_reads_empty() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().join("absent.json"));
		assert!(store.get("ns", "addr").unwrap().is_none());
	}

	#[test]
	fn file_store_reports_corruption() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("keys.json");
		std::fs::write(&path, "not json").unwrap();

		let store = FileStore::new(&path);
		assert!(matches!(store.get("ns", "addr"), Err(StoreError::Corrupt(_))));
		assert!(matches!(store.put("ns", "addr", "v"), Err(StoreError::Corrupt(_))));
	}
}
