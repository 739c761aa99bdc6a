use anyhow::Result;

use crate::cli::SignerCommand;
use crate::config::Config;
use crate::signer::{self, KEY_ENV};

pub fn run(cmd: &SignerCommand) -> Result<()> {
	match cmd {
		SignerCommand::Connect => connect(),
		SignerCommand::Status => show_status(),
	}
}

fn connect() -> Result<()> {
	let signer = signer::from_env()?;
	let address = signer.address().to_owned();
	println!("Connected: {address}");

	let mut config = Config::load()?;
	config.signer.address = Some(address);
	config.save()?;
	println!("Address saved to config.");

	Ok(())
}

fn show_status() -> Result<()> {
	let config = Config::load()?;

	let address = config
		.signer
		.address
		.as_deref()
		.unwrap_or("not connected");
	let key = if std::env::var_os(KEY_ENV).is_some() {
		"set"
	} else {
		"not set"
	};
	let timeout = config
		.gate
		.timeout_secs
		.map(|s| format!("{s}s"))
		.unwrap_or_else(|| "none".into());

	println!("Signer");
	println!("  Address:   {address}");
	println!("  Key:       {key} ({KEY_ENV})");
	println!("  Store:     {}", config.store_path()?.display());
	println!("  Collision: {:?}", config.gate.collision);
	println!("  Timeout:   {timeout}");
	Ok(())
}
