use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::cli::{Cli, GateArg};
use crate::commands::{check_signer_address, resolve_store};
use crate::config::Config;
use crate::error::{FlowError, GateError};
use crate::flow::{ApprovalFlow, SigningRequest};
use crate::gate::{ApprovalGate, Gates};
use crate::recovery::KeyRecovery;
use crate::signer;
use crate::trust::Verdict;

/// How often the terminal prompt looks for a pending request.
const RENDER_TICK: Duration = Duration::from_millis(100);

/// Lines typed by the user.  `None` once stdin is closed.
type Input = mpsc::UnboundedReceiver<String>;

/// Read stdin on a plain thread so no read is left pending on the runtime
/// when the command finishes.  The thread is detached and ends with the
/// process.
fn spawn_stdin_reader() -> Input {
	let (tx, rx) = mpsc::unbounded_channel();
	std::thread::spawn(move || {
		for line in std::io::stdin().lock().lines() {
			let Ok(line) = line else { break };
			if tx.send(line).is_err() {
				break;
			}
		}
	});
	rx
}

/// Sign `message` on behalf of `origin`, with the terminal acting as the
/// approval UI.
pub async fn run(
	cli: &Cli,
	origin: &str,
	message: &str,
	gate: GateArg,
	ignore_warning: bool,
) -> Result<()> {
	let config = Config::load()?;
	let trust = config.domain_trust();
	let signer = signer::from_env()?;
	let configured = cli.address.as_deref().or(config.signer.address.as_deref());
	check_signer_address(configured, signer.address())?;
	let store = resolve_store(cli, &config)?;
	let mut input = spawn_stdin_reader();

	let mut request = SigningRequest::new(origin, message, gate.into());
	match trust.check(origin) {
		Verdict::Verified(domain) => {
			print!("Origin:  {origin} (verified)");
			if let Some(icon) = &domain.icon {
				print!("  icon={icon}");
			}
			println!();
		}
		Verdict::Unverified => {
			println!("WARNING: {origin} is not a verified origin.");
			if !ignore_warning && !confirm(&mut input, "Proceed anyway? [y/N] ").await? {
				anyhow::bail!("Request cancelled: unverified origin.");
			}
			request = request.acknowledged();
		}
	}

	let gates = Gates::new(config.gate.collision, config.gate.timeout());
	let ui = tokio::spawn(prompt_loop(gates.get(request.gate).clone(), input));
	let flow = ApprovalFlow::new(trust, gates, signer, KeyRecovery::new(store));

	let outcome = flow.sign(request).await;
	ui.abort();

	match outcome {
		Ok(signature) => {
			println!("Signed by {}", flow.address());
			println!("Signature: {signature}");
			Ok(())
		}
		Err(FlowError::Gate(GateError::Denied(reason))) => {
			anyhow::bail!("Request denied: {reason}")
		}
		Err(e) => Err(e.into()),
	}
}

/// Render a prompt whenever the gate holds a request and resolve it from
/// the user's answer.
async fn prompt_loop(gate: Arc<ApprovalGate>, mut input: Input) -> Result<()> {
	let mut tick = tokio::time::interval(RENDER_TICK);
	loop {
		tick.tick().await;
		let Some(info) = gate.current() else {
			continue;
		};

		println!();
		println!("Approval requested ({} gate)", info.kind.as_str());
		println!("  Origin:  {}", info.origin);
		println!("  Message: {}", info.summary);
		println!("  Request: {}", &info.id[..16]);

		if confirm(&mut input, "Approve? [y/N] ").await? {
			gate.approve_id(&info.id);
		} else {
			gate.deny_id(&info.id, "user rejected");
		}
	}
}

async fn confirm(input: &mut Input, prompt: &str) -> Result<bool> {
	print!("{prompt}");
	std::io::stdout().flush()?;
	let answer = input.recv().await;
	Ok(matches!(
		answer.as_deref().map(str::trim),
		Some("y" | "Y" | "yes")
	))
}
