//! Signed tokens and verification outcomes.

use crate::utils::{format_hex, to_checksum};
use crate::MessageValue;
use alloy_primitives::{Address, Bytes};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A PoWo message together with the signature over its digest.
///
/// Serializes to JSON with the signature as `0x` hex and the message fields
/// under their wallet names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedToken {
	pub message: MessageValue,
	/// 65-byte `r || s || v` signature.
	pub signature: Bytes,
	/// Address the issuer claims signed the message. Informational only;
	/// verification always uses the caller's expected signer.
	pub signer: Address,
}

impl SignedToken {
	pub fn signature_hex(&self) -> String {
		format_hex(&self.signature)
	}
}

/// Why a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
	/// Message or schema could not be encoded.
	#[error("Malformed input: {0}")]
	MalformedInput(String),
	/// Signature is not a parseable (r, s, v) triple.
	#[error("Malformed signature: {0}")]
	MalformedSignature(String),
	/// Signature is well formed but was produced by someone else.
	#[error("Message was signed by unexpected wallet {} (expected {})", to_checksum(.recovered), to_checksum(.expected))]
	SignerMismatch { expected: Address, recovered: Address },
	/// The `expires` field is not a timestamp.
	#[error("Malformed expiry: {0}")]
	MalformedExpiry(String),
	/// The validity window has closed.
	#[error("Token expired at {expires} (now {now})")]
	Expired {
		expires: DateTime<Utc>,
		now: DateTime<Utc>,
	},
}

impl InvalidReason {
	/// Stable machine-readable name of the reason.
	pub fn code(&self) -> &'static str {
		match self {
			InvalidReason::MalformedInput(_) => "malformed_input",
			InvalidReason::MalformedSignature(_) => "malformed_signature",
			InvalidReason::SignerMismatch { .. } => "signer_mismatch",
			InvalidReason::MalformedExpiry(_) => "malformed_expiry",
			InvalidReason::Expired { .. } => "expired",
		}
	}
}

/// Classified result of verifying a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
	Valid,
	Invalid(InvalidReason),
}

impl Verification {
	pub fn is_valid(&self) -> bool {
		matches!(self, Verification::Valid)
	}

	pub fn reason(&self) -> Option<&InvalidReason> {
		match self {
			Verification::Valid => None,
			Verification::Invalid(reason) => Some(reason),
		}
	}
}
