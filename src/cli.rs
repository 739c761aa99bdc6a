use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::gate::GateKind;

#[derive(Parser)]
#[command(
	name = "signing-gate",
	about = "Approval gate and public-key recovery for wallet signing requests.",
	version
)]
pub struct Cli {
	/// Override the key store file.
	#[arg(long, global = true)]
	pub store: Option<PathBuf>,

	/// Override active account address.
	#[arg(long, global = true)]
	pub address: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GateArg {
	AutoSign,
	GhostWallet,
}

impl From<GateArg> for GateKind {
	fn from(arg: GateArg) -> Self {
		match arg {
			GateArg::AutoSign => GateKind::AutoSign,
			GateArg::GhostWallet => GateKind::GhostWallet,
		}
	}
}

#[derive(Subcommand)]
pub enum Command {
	/// Sign a message for a requesting site, after interactive approval.
	///
	/// The key comes from SIGNING_GATE_KEY. If `--address` or the configured
	/// signer address is set, it must match that key.
	Sign {
		/// Hostname of the requesting site.
		#[arg(long)]
		origin: String,

		/// Message to sign.
		#[arg(long)]
		message: String,

		/// Gate the request goes through.
		#[arg(long, value_enum, default_value = "ghost-wallet")]
		gate: GateArg,

		/// Skip the unverified-origin warning.
		#[arg(long)]
		ignore_warning: bool,
	},

	/// Recover and store the public key behind a personal-message signature.
	Recover {
		/// The message that was signed.
		#[arg(long)]
		message: String,

		/// 65-byte signature as hex (0x-prefixed or bare).
		#[arg(long)]
		signature: String,
	},

	/// Inspect recovered keys.
	Key {
		#[command(subcommand)]
		command: KeyCommand,
	},

	/// Manage the verified-origin list.
	Trust {
		#[command(subcommand)]
		command: TrustCommand,
	},

	/// Manage the embedded signer.
	Signer {
		#[command(subcommand)]
		command: SignerCommand,
	},
}

// -- Key subcommands --

#[derive(Subcommand)]
pub enum KeyCommand {
	/// Print the stored compressed public key for an address.
	Show,
}

// -- Trust subcommands --

#[derive(Subcommand)]
pub enum TrustCommand {
	/// List verified origins.
	List,

	/// Check whether a hostname is verified.
	Check {
		/// Hostname, matched exactly.
		hostname: String,
	},

	/// Mark a hostname as verified.
	Add {
		hostname: String,

		/// Icon URL shown next to the origin.
		#[arg(long)]
		icon: Option<String>,
	},

	/// Remove a hostname from the verified list.
	Remove { hostname: String },
}

// -- Signer subcommands --

#[derive(Subcommand)]
pub enum SignerCommand {
	/// Derive the address from SIGNING_GATE_KEY and save it.
	Connect,

	/// Show current signer configuration.
	Status,
}
