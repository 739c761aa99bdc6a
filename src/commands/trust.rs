use anyhow::Result;

use crate::cli::TrustCommand;
use crate::config::Config;
use crate::trust::{TrustedDomain, Verdict};

pub fn run(cmd: &TrustCommand) -> Result<()> {
	match cmd {
		TrustCommand::List => list(),
		TrustCommand::Check { hostname } => check(hostname),
		TrustCommand::Add { hostname, icon } => add(hostname, icon.as_deref()),
		TrustCommand::Remove { hostname } => remove(hostname),
	}
}

fn list() -> Result<()> {
	let trust = Config::load()?.domain_trust();
	if trust.is_empty() {
		println!("No verified origins.");
		return Ok(());
	}

	for domain in trust.iter() {
		match &domain.icon {
			Some(icon) => println!("{}  icon={icon}", domain.hostname),
			None => println!("{}", domain.hostname),
		}
	}
	println!("\n{} origin(s) total.", trust.len());
	Ok(())
}

fn check(hostname: &str) -> Result<()> {
	let trust = Config::load()?.domain_trust();
	match trust.check(hostname) {
		Verdict::Verified(_) => println!("{hostname} is verified."),
		Verdict::Unverified => println!("{hostname} is NOT verified."),
	}
	Ok(())
}

fn add(hostname: &str, icon: Option<&str>) -> Result<()> {
	let mut config = Config::load()?;
	let mut trust = config.domain_trust();

	let mut domain = TrustedDomain::new(hostname);
	if let Some(icon) = icon {
		domain = domain.with_icon(icon);
	}
	let replaced = trust.insert(domain).is_some();

	config.set_domain_trust(&trust);
	config.save()?;
	if replaced {
		println!("Updated verified origin: {hostname}");
	} else {
		println!("Added verified origin: {hostname}");
	}
	Ok(())
}

fn remove(hostname: &str) -> Result<()> {
	let mut config = Config::load()?;
	let mut trust = config.domain_trust();

	if trust.remove(hostname).is_none() {
		anyhow::bail!("{hostname} is not in the verified list");
	}
	config.set_domain_trust(&trust);
	config.save()?;
	println!("Removed verified origin: {hostname}");
	Ok(())
}
