use tracing::{error, info};

use crate::crypto::{self, COMPRESSED_KEY_LEN};
use crate::error::{RecoveryError, StoreError};
use crate::store::KeyStore;

/// Storage namespace for public keys recovered from external-backend
/// signatures.
pub const PUBKEY_NAMESPACE: &str = "recovered-pubkey";

/// A compressed public key recovered for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredKey {
	pub address: String,
	pub public_key: [u8; COMPRESSED_KEY_LEN],
}

impl RecoveredKey {
	pub fn to_hex(&self) -> String {
		hex::encode(self.public_key)
	}
}

/// Derives signer public keys from personal-message signatures and keeps
/// the latest one per address.
pub struct KeyRecovery<S> {
	store: S,
}

impl<S: KeyStore> KeyRecovery<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Recover the compressed public key behind `signature` over `message`
	/// and persist it for `address`, replacing any earlier value.
	pub fn recover_and_store(
		&self,
		message: &str,
		signature: &[u8],
		address: &str,
	) -> Result<RecoveredKey, RecoveryError> {
		let public_key = crypto::recover_compressed_key(message, signature)?;
		let key = RecoveredKey {
			address: address.to_owned(),
			public_key,
		};
		self.store.put(PUBKEY_NAMESPACE, address, &key.to_hex())?;
		info!(address, public_key = %key.to_hex(), "stored recovered public key");
		Ok(key)
	}

	/// Fire-and-forget variant for key-backend events that nobody awaits.
	/// Failures go to the error log instead of the caller.
	pub fn record(&self, message: &str, signature: &[u8], address: &str) -> Option<RecoveredKey> {
		match self.recover_and_store(message, signature, address) {
			Ok(key) => Some(key),
			Err(e) => {
				error!(address, error = %e, "public key recovery failed");
				None
			}
		}
	}

	/// Read back the key last stored for `address`.
	pub fn stored_key(&self, address: &str) -> Result<Option<RecoveredKey>, StoreError> {
		let Some(value) = self.store.get(PUBKEY_NAMESPACE, address)? else {
			return Ok(None);
		};
		let public_key = hex::decode(&value)
			.ok()
			.and_then(|b| <[u8; COMPRESSED_KEY_LEN]>::try_from(b).ok())
			.ok_or_else(|| {
				StoreError::Corrupt(format!("stored key for {address} is not a compressed point"))
			})?;
		Ok(Some(RecoveredKey {
			address: address.to_owned(),
			public_key,
		}))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use k256::ecdsa::SigningKey;

	use super::*;
	use crate::crypto::{compress, sign_personal_message};
	use crate::store::MemoryStore;

	struct ReadOnlyStore;

	impl KeyStore for ReadOnlyStore {
		fn get(&self, _: &str, _: &str) -> Result<Option<String>, StoreError> {
			Ok(None)
		}

		fn put(&self, _: &str, _: &str, _: &str) -> Result<(), StoreError> {
			Err(StoreError::Io(std::io::Error::new(
				std::io::ErrorKind::PermissionDenied,
				"store is read-only",
			)))
		}
	}

	fn random_key() -> SigningKey {
		SigningKey::random(&mut rand::thread_rng())
	}

	#[test]
	fn round_trip_matches_known_key() {
		let key = random_key();
		let sig = sign_personal_message(&key, "authorize session").unwrap();
		let recovery = KeyRecovery::new(MemoryStore::new());

		let recovered = recovery
			.recover_and_store("authorize session", &sig, "acct1")
			.unwrap();

		assert_eq!(recovered.public_key, compress(key.verifying_key()).unwrap());
		assert_eq!(recovered.address, "acct1");
		assert_eq!(
			recovery.store().get(PUBKEY_NAMESPACE, "acct1").unwrap(),
			Some(recovered.to_hex())
		);
	}

	#[test]
	fn different_message_recovers_different_key() {
		let key = random_key();
		let sig = sign_personal_message(&key, "message A").unwrap();
		let recovery = KeyRecovery::new(MemoryStore::new());

		// Recovery over the wrong message either fails or lands elsewhere.
		match recovery.recover_and_store("message B", &sig, "acct1") {
			Ok(recovered) => {
				assert_ne!(recovered.public_key, compress(key.verifying_key()).unwrap())
			}
			Err(e) => assert!(matches!(e, RecoveryError::RecoveryFailure(_))),
		}
	}

	#[test]
	fn last_write_wins() {
		let recovery = KeyRecovery::new(MemoryStore::new());
		let first = random_key();
		let second = random_key();

		let sig = sign_personal_message(&first, "m").unwrap();
		recovery.recover_and_store("m", &sig, "acct").unwrap();
		let sig = sign_personal_message(&second, "m").unwrap();
		recovery.recover_and_store("m", &sig, "acct").unwrap();

		let stored = recovery.stored_key("acct").unwrap().unwrap();
		assert_eq!(stored.public_key, compress(second.verifying_key()).unwrap());
	}

	#[test]
	fn invalid_signature_is_not_stored() {
		let recovery = KeyRecovery::new(MemoryStore::new());
		let err = recovery.recover_and_store("m", &[1u8; 12], "acct").unwrap_err();
		assert!(matches!(err, RecoveryError::InvalidSignature(_)));
		assert!(recovery.stored_key("acct").unwrap().is_none());
	}

	#[test]
	fn persistence_failure_surfaces() {
		let key = random_key();
		let sig = sign_personal_message(&key, "m").unwrap();
		let recovery = KeyRecovery::new(ReadOnlyStore);

		let err = recovery.recover_and_store("m", &sig, "acct").unwrap_err();
		assert!(matches!(err, RecoveryError::Persistence(_)));
		assert!(recovery.record("m", &sig, "acct").is_none());
	}

	#[test]
	fn record_returns_key_on_success() {
		let key = random_key();
		let sig = sign_personal_message(&key, "m").unwrap();
		let store = Arc::new(MemoryStore::new());
		let recovery = KeyRecovery::new(store.clone());

		let recorded = recovery.record("m", &sig, "acct").unwrap();
		assert_eq!(
			store.get(PUBKEY_NAMESPACE, "acct").unwrap(),
			Some(recorded.to_hex())
		);
	}

	#[test]
	fn stored_key_rejects_garbage() {
		let store = MemoryStore::new();
		store.put(PUBKEY_NAMESPACE, "acct", "abcd").unwrap();
		let recovery = KeyRecovery::new(store);
		assert!(matches!(recovery.stored_key("acct"), Err(StoreError::Corrupt(_))));
	}
}
