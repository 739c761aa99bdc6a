pub mod local;

use anyhow::Result;

pub use local::LocalSigner;

/// Environment variable holding the embedded signing key (hex).
pub const KEY_ENV: &str = "SIGNING_GATE_KEY";

/// A key backend that can produce personal-message signatures.  The
/// private key never leaves the backend; callers only see signatures.
#[async_trait::async_trait]
pub trait Signer: Send + Sync {
	/// The account address this signer controls.
	fn address(&self) -> &str;

	/// Sign an arbitrary message and return a hex-encoded recoverable
	/// signature (65 bytes = 130 hex chars, `v` as 27/28).
	async fn sign_message(&self, message: &str) -> Result<String>;
}

/// Build the embedded signer from `SIGNING_GATE_KEY`.
pub fn from_env() -> Result<Box<dyn Signer>> {
	let key = std::env::var(KEY_ENV).map_err(|_| {
		anyhow::anyhow!("No signing key available. Set {KEY_ENV} to a hex private key")
	})?;
	Ok(Box::new(LocalSigner::from_hex(&key)?))
}
