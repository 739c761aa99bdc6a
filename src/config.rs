use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::gate::CollisionPolicy;
use crate::trust::{DomainTrust, TrustedDomain};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub signer: SignerConfig,
	#[serde(default)]
	pub storage: StorageConfig,
	#[serde(default)]
	pub gate: GateConfig,
	#[serde(default)]
	pub trust: TrustConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
	pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
	/// Key store file; defaults to `keys.json` in the config directory.
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
	#[serde(default)]
	pub collision: CollisionPolicy,
	/// Seconds to wait for a decision.  Unset means wait indefinitely.
	pub timeout_secs: Option<u64>,
}

impl GateConfig {
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout_secs.map(Duration::from_secs)
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustConfig {
	#[serde(default)]
	pub domains: Vec<TrustedDomain>,
}

impl Config {
	/// Directory where CLI state is stored (~/.signing-gate/).
	pub fn dir() -> Result<PathBuf> {
		dirs::home_dir()
			.map(|home| home.join(".signing-gate"))
			.ok_or_else(|| anyhow!("could not determine home directory"))
	}

	/// Path to the config file.
	pub fn path() -> Result<PathBuf> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load config from disk, falling back to defaults if no file exists.
	pub fn load() -> Result<Self> {
		let path = Self::path()?;
		if path.exists() {
			let content = std::fs::read_to_string(&path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the current config to disk, creating the directory if needed.
	pub fn save(&self) -> Result<()> {
		let path = Self::path()?;
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, toml::to_string_pretty(self)?)?;
		Ok(())
	}

	/// Key store location: explicit setting, else the config directory.
	pub fn store_path(&self) -> Result<PathBuf> {
		match &self.storage.path {
			Some(p) => Ok(p.clone()),
			None => Ok(Self::dir()?.join("keys.json")),
		}
	}

	pub fn domain_trust(&self) -> DomainTrust {
		DomainTrust::new(self.trust.domains.iter().cloned())
	}

	/// Write a modified trust set back into the config.
	pub fn set_domain_trust(&mut self, trust: &DomainTrust) {
		self.trust.domains = trust.iter().cloned().collect();
	}
}
