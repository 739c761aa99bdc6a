//! Runs the `signing-gate` binary against a throwaway home directory.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn write_config(home: &Path, extra: &str) {
	let dir = home.join(".signing-gate");
	std::fs::create_dir_all(&dir).unwrap();
	let config = format!(
		"[gate]\ntimeout_secs = 1\n\n[[trust.domains]]\nhostname = \"known.example\"\n{extra}"
	);
	std::fs::write(dir.join("config.toml"), config).unwrap();
}

fn spawn_sign(home: &Path) -> Child {
	Command::new(env!("CARGO_BIN_EXE_signing-gate"))
		.args(["sign", "--origin", "known.example", "--message", "hi"])
		.env("HOME", home)
		.env("SIGNING_GATE_KEY", KEY)
		.env_remove("RUST_LOG")
		.stdin(Stdio::piped())
		.stdout(Stdio::null())
		.stderr(Stdio::piped())
		.spawn()
		.unwrap()
}

fn wait_with_deadline(child: &mut Child, deadline: Duration) -> Option<ExitStatus> {
	let start = Instant::now();
	while start.elapsed() < deadline {
		if let Some(status) = child.try_wait().unwrap() {
			return Some(status);
		}
		std::thread::sleep(Duration::from_millis(50));
	}
	None
}

fn stderr_of(child: &mut Child) -> String {
	let mut out = String::new();
	child.stderr.take().unwrap().read_to_string(&mut out).unwrap();
	out
}

#[test]
fn sign_exits_after_timeout_with_stdin_open() {
	let home = tempfile::tempdir().unwrap();
	write_config(home.path(), "");

	let mut child = spawn_sign(home.path());
	// Hold the write end so stdin never reaches EOF.
	let _stdin = child.stdin.take().unwrap();

	let status = wait_with_deadline(&mut child, Duration::from_secs(5));
	if status.is_none() {
		child.kill().unwrap();
		child.wait().unwrap();
		panic!("sign did not exit after the gate timeout");
	}
	assert!(!status.unwrap().success());
	assert!(stderr_of(&mut child).contains("timed out"));
}

#[test]
fn sign_refuses_key_for_another_address() {
	let home = tempfile::tempdir().unwrap();
	write_config(
		home.path(),
		"\n[signer]\naddress = \"0x70997970c51812dc3a010c7d01b50e0d17dc79c8\"\n",
	);

	let mut child = spawn_sign(home.path());
	drop(child.stdin.take());

	let status = wait_with_deadline(&mut child, Duration::from_secs(5));
	if status.is_none() {
		child.kill().unwrap();
		child.wait().unwrap();
		panic!("sign did not exit on an address mismatch");
	}
	assert!(!status.unwrap().success());
	assert!(stderr_of(&mut child).contains("does not match the signing key"));
}
