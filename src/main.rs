use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use signing_gate::cli::{Cli, Command};
use signing_gate::commands;

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "signing_gate=info".into()))
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	let cli = Cli::parse();

	match &cli.command {
		Command::Sign {
			origin,
			message,
			gate,
			ignore_warning,
		} => commands::sign::run(&cli, origin, message, *gate, *ignore_warning).await,
		Command::Recover { message, signature } => commands::recover::run(&cli, message, signature),
		Command::Key { command } => commands::key::run(&cli, command),
		Command::Trust { command } => commands::trust::run(command),
		Command::Signer { command } => commands::signer::run(command),
	}
}
