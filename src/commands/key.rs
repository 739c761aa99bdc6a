use anyhow::Result;

use crate::cli::{Cli, KeyCommand};
use crate::commands::{resolve_address, resolve_store};
use crate::config::Config;
use crate::recovery::KeyRecovery;

pub fn run(cli: &Cli, cmd: &KeyCommand) -> Result<()> {
	match cmd {
		KeyCommand::Show => show(cli),
	}
}

fn show(cli: &Cli) -> Result<()> {
	let config = Config::load()?;
	let address = resolve_address(cli, &config)?;
	let recovery = KeyRecovery::new(resolve_store(cli, &config)?);

	match recovery.stored_key(&address)? {
		Some(key) => {
			println!("Address:    {address}");
			println!("Public key: 0x{}", key.to_hex());
		}
		None => println!("No recovered key stored for {address}."),
	}
	Ok(())
}
