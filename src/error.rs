use std::time::Duration;

use thiserror::Error;

/// Why a pending approval did not resolve successfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
	/// `open` was called while another request was still pending and the
	/// gate is configured to reject newcomers.
	#[error("{gate} gate already has a pending request ({pending_id})")]
	Collision { gate: &'static str, pending_id: String },

	/// The user (or a policy) refused the request.
	#[error("{0}")]
	Denied(String),

	/// No decision arrived before the gate's timeout.
	#[error("approval timed out after {0:?}")]
	TimedOut(Duration),

	/// The gate was dropped with the request still pending.
	#[error("approval request was abandoned")]
	Abandoned,
}

/// Failures from the key-value store backing recovered keys.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("key store I/O failed: {0}")]
	Io(#[from] std::io::Error),

	#[error("key store file is corrupt: {0}")]
	Corrupt(String),
}

/// Failures of `recover_and_store`.
#[derive(Debug, Error)]
pub enum RecoveryError {
	#[error("invalid signature: {0}")]
	InvalidSignature(String),

	#[error("public key recovery failed: {0}")]
	RecoveryFailure(String),

	#[error("could not persist recovered key: {0}")]
	Persistence(#[from] StoreError),
}

/// Failures of the end-to-end signing flow.
#[derive(Debug, Error)]
pub enum FlowError {
	/// The origin is not in the verified set and the warning was not
	/// acknowledged.
	#[error("origin {0} is not verified")]
	UnverifiedOrigin(String),

	#[error(transparent)]
	Gate(#[from] GateError),

	#[error("signer failed: {0:#}")]
	Signer(anyhow::Error),
}
