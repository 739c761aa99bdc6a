pub mod key;
pub mod recover;
pub mod sign;
pub mod signer;
pub mod trust;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::store::FileStore;

/// Open the key store from the CLI flag or config.
pub fn resolve_store(cli: &Cli, config: &Config) -> Result<FileStore> {
	let path = match &cli.store {
		Some(p) => p.clone(),
		None => config.store_path()?,
	};
	Ok(FileStore::new(path))
}

/// Resolve the active address from the CLI flag or config.
pub fn resolve_address(cli: &Cli, config: &Config) -> Result<String> {
	cli.address
		.as_deref()
		.or(config.signer.address.as_deref())
		.map(str::to_owned)
		.ok_or_else(|| anyhow::anyhow!("No address configured. Run: signing-gate signer connect"))
}

/// Refuse to sign when the configured address is not the key's address.
pub fn check_signer_address(configured: Option<&str>, signer_address: &str) -> Result<()> {
	match configured {
		Some(addr) if !addr.eq_ignore_ascii_case(signer_address) => anyhow::bail!(
			"Address {addr} does not match the signing key ({signer_address}). \
			 Run: signing-gate signer connect"
		),
		_ => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

	#[test]
	fn unset_address_accepts_any_key() {
		assert!(check_signer_address(None, KEY_ADDRESS).is_ok());
	}

	#[test]
	fn matching_address_ignores_case() {
		let checksummed = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
		assert!(check_signer_address(Some(checksummed), KEY_ADDRESS).is_ok());
	}

	#[test]
	fn mismatched_address_is_refused() {
		let err = check_signer_address(
			Some("0x70997970c51812dc3a010c7d01b50e0d17dc79c8"),
			KEY_ADDRESS,
		)
		.unwrap_err();
		assert!(err.to_string().contains("does not match the signing key"));
	}
}
