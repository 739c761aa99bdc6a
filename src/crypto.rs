use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha2::Sha256;
use sha3::{Digest, Keccak256};

use crate::error::RecoveryError;

/// Length of a recoverable signature: `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

/// Length of a SEC1 compressed secp256k1 point.
pub const COMPRESSED_KEY_LEN: usize = 33;

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

// -- Personal-message hashing --

/// EIP-191 personal-message digest:
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`.
///
/// `len` is the decimal byte length of the message, not its character count.
pub fn personal_message_hash(message: &str) -> [u8; 32] {
	let bytes = message.as_bytes();
	let mut h = Keccak256::new();
	h.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
	h.update(bytes.len().to_string().as_bytes());
	h.update(bytes);
	h.finalize().into()
}

// -- Signature parsing --

/// Decode a hex string, tolerating a `0x` prefix and surrounding whitespace.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
	let trimmed = value.trim();
	hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
}

/// Split a 65-byte `r || s || v` signature into its ECDSA part and
/// recovery id.  `v` may be 0/1 or the legacy 27/28.
pub fn parse_signature(bytes: &[u8]) -> Result<(Signature, RecoveryId), RecoveryError> {
	if bytes.len() == SIGNATURE_LEN - 1 {
		return Err(RecoveryError::InvalidSignature(
			"64-byte signature carries no recovery id".into(),
		));
	}
	if bytes.len() != SIGNATURE_LEN {
		return Err(RecoveryError::InvalidSignature(format!(
			"expected {SIGNATURE_LEN} bytes, got {}",
			bytes.len()
		)));
	}

	let v = match bytes[64] {
		27 | 28 => bytes[64] - 27,
		0 | 1 => bytes[64],
		other => {
			return Err(RecoveryError::InvalidSignature(format!(
				"recovery id must be 0/1 or 27/28, got {other}"
			)))
		}
	};
	let recid = RecoveryId::from_byte(v)
		.ok_or_else(|| RecoveryError::InvalidSignature(format!("bad recovery id {v}")))?;

	let sig = Signature::from_slice(&bytes[..64])
		.map_err(|e| RecoveryError::InvalidSignature(e.to_string()))?;

	// A high-s signature recovers through the mirrored point, so flip parity.
	Ok(match sig.normalize_s() {
		Some(low) => (low, RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced())),
		None => (sig, recid),
	})
}

// -- Recovery --

/// Recover the signer's verifying key from a personal-message signature.
pub fn recover_verifying_key(
	message: &str,
	signature: &[u8],
) -> Result<VerifyingKey, RecoveryError> {
	let (sig, recid) = parse_signature(signature)?;
	let digest = personal_message_hash(message);
	VerifyingKey::recover_from_prehash(&digest, &sig, recid)
		.map_err(|e| RecoveryError::RecoveryFailure(e.to_string()))
}

/// Recover the signer's public key in 33-byte SEC1 compressed form.
pub fn recover_compressed_key(
	message: &str,
	signature: &[u8],
) -> Result<[u8; COMPRESSED_KEY_LEN], RecoveryError> {
	let key = recover_verifying_key(message, signature)?;
	compress(&key)
}

/// Encode a verifying key as a 33-byte compressed point.
pub fn compress(key: &VerifyingKey) -> Result<[u8; COMPRESSED_KEY_LEN], RecoveryError> {
	let point = key.to_encoded_point(true);
	point.as_bytes().try_into().map_err(|_| {
		RecoveryError::RecoveryFailure(format!(
			"compressed point has {} bytes",
			point.as_bytes().len()
		))
	})
}

// -- Signing --

/// Produce a 65-byte personal-message signature with `v` encoded as 27/28,
/// matching what browser wallets return from `personal_sign`.
pub fn sign_personal_message(
	key: &SigningKey,
	message: &str,
) -> Result<[u8; SIGNATURE_LEN], k256::ecdsa::Error> {
	let digest = personal_message_hash(message);
	let (sig, recid) = key.sign_prehash_recoverable(&digest)?;
	let mut out = [0u8; SIGNATURE_LEN];
	out[..64].copy_from_slice(&sig.to_bytes());
	out[64] = recid.to_byte() + 27;
	Ok(out)
}

// -- Identities --

/// Derive the 0x-prefixed account address from a verifying key: the last
/// 20 bytes of `keccak256(x || y)`.
pub fn address_from_key(key: &VerifyingKey) -> String {
	let point = key.to_encoded_point(false);
	let digest = Keccak256::digest(&point.as_bytes()[1..]);
	format!("0x{}", hex::encode(&digest[12..]))
}

/// Deterministic id for a pending approval request.  Result is a
/// 64-character hex string.
pub fn compute_request_id(origin: &str, summary: &str, timestamp_nanos: i64, nonce: &[u8]) -> String {
	let mut h = Sha256::new();
	h.update(origin.as_bytes());
	h.update(summary.as_bytes());
	h.update(timestamp_nanos.to_le_bytes());
	h.update(nonce);
	hex::encode(h.finalize())
}
