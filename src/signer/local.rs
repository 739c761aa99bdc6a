use anyhow::{anyhow, Result};
use k256::ecdsa::SigningKey;

use crate::crypto;

/// Signs with a secp256k1 key held in process memory, the way an embedded
/// ("ghost") wallet does.  Signatures follow the personal-message
/// convention so they recover exactly like a browser wallet's.
pub struct LocalSigner {
	key: SigningKey,
	address: String,
}

impl LocalSigner {
	pub fn new(key: SigningKey) -> Self {
		let address = crypto::address_from_key(key.verifying_key());
		Self { key, address }
	}

	/// Parse a 32-byte private key from hex, with or without `0x`.
	pub fn from_hex(value: &str) -> Result<Self> {
		let bytes = crypto::decode_hex(value).map_err(|e| anyhow!("invalid key hex: {e}"))?;
		let key = SigningKey::from_slice(&bytes).map_err(|_| anyhow!("invalid secp256k1 private key"))?;
		Ok(Self::new(key))
	}

	pub fn random() -> Self {
		Self::new(SigningKey::random(&mut rand::thread_rng()))
	}

	pub fn signing_key(&self) -> &SigningKey {
		&self.key
	}
}

#[async_trait::async_trait]
impl super::Signer for LocalSigner {
	fn address(&self) -> &str {
		&self.address
	}

	async fn sign_message(&self, message: &str) -> Result<String> {
		let sig = crypto::sign_personal_message(&self.key, message)
			.map_err(|e| anyhow!("signing failed: {e}"))?;
		Ok(format!("0x{}", hex::encode(sig)))
	}
}
