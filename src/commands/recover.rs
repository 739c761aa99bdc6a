use anyhow::Result;

use crate::cli::Cli;
use crate::commands::{resolve_address, resolve_store};
use crate::config::Config;
use crate::crypto;
use crate::error::RecoveryError;
use crate::recovery::KeyRecovery;

/// Recover the signer's public key from a personal-message signature and
/// store it under the active address.
pub fn run(cli: &Cli, message: &str, signature: &str) -> Result<()> {
	let config = Config::load()?;
	let address = resolve_address(cli, &config)?;
	let recovery = KeyRecovery::new(resolve_store(cli, &config)?);

	let sig = crypto::decode_hex(signature)
		.map_err(|e| RecoveryError::InvalidSignature(format!("not hex: {e}")))?;
	let key = recovery.recover_and_store(message, &sig, &address)?;

	println!("Recovered key stored.");
	println!("  Address:    {}", key.address);
	println!("  Public key: 0x{}", key.to_hex());
	Ok(())
}
