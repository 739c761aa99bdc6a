use tracing::{info, warn};

use crate::crypto;
use crate::error::FlowError;
use crate::gate::{GateKind, Gates};
use crate::recovery::KeyRecovery;
use crate::signer::Signer;
use crate::store::KeyStore;
use crate::trust::DomainTrust;

/// An externally triggered request to sign a message.
#[derive(Debug, Clone)]
pub struct SigningRequest {
	/// Hostname of the requesting site.
	pub origin: String,
	pub message: String,
	pub gate: GateKind,
	/// The user saw the unverified-origin warning and chose to proceed.
	pub acknowledge_unverified: bool,
}

impl SigningRequest {
	pub fn new(origin: impl Into<String>, message: impl Into<String>, gate: GateKind) -> Self {
		Self {
			origin: origin.into(),
			message: message.into(),
			gate,
			acknowledge_unverified: false,
		}
	}

	pub fn acknowledged(mut self) -> Self {
		self.acknowledge_unverified = true;
		self
	}
}

/// Wires the trust check, the approval gates, a key backend and key
/// recovery into one signing path.
pub struct ApprovalFlow<S> {
	trust: DomainTrust,
	gates: Gates,
	signer: Box<dyn Signer>,
	recovery: KeyRecovery<S>,
}

impl<S: KeyStore> ApprovalFlow<S> {
	pub fn new(
		trust: DomainTrust,
		gates: Gates,
		signer: Box<dyn Signer>,
		recovery: KeyRecovery<S>,
	) -> Self {
		Self {
			trust,
			gates,
			signer,
			recovery,
		}
	}

	pub fn trust(&self) -> &DomainTrust {
		&self.trust
	}

	pub fn gates(&self) -> &Gates {
		&self.gates
	}

	pub fn recovery(&self) -> &KeyRecovery<S> {
		&self.recovery
	}

	pub fn address(&self) -> &str {
		self.signer.address()
	}

	/// Run a request through the gate and, once approved, sign it.
	///
	/// The signature is also fed to key recovery so the signer's public key
	/// is on record; a recovery failure is logged and does not affect the
	/// returned signature.
	pub async fn sign(&self, request: SigningRequest) -> Result<String, FlowError> {
		if !self.trust.is_verified(&request.origin) {
			if !request.acknowledge_unverified {
				return Err(FlowError::UnverifiedOrigin(request.origin));
			}
			warn!(origin = %request.origin, "proceeding with unverified origin");
		}

		self.gates
			.get(request.gate)
			.request(request.origin.as_str(), request.message.as_str())
			.await?;

		let signature = self
			.signer
			.sign_message(&request.message)
			.await
			.map_err(FlowError::Signer)?;
		info!(origin = %request.origin, address = self.signer.address(), "message signed");

		match crypto::decode_hex(&signature) {
			Ok(bytes) => {
				self.recovery
					.record(&request.message, &bytes, self.signer.address());
			}
			Err(e) => warn!(error = %e, "signer returned non-hex signature; key not recorded"),
		}

		Ok(signature)
	}
}
