//! Error taxonomy for caller-supplied token material.

use thiserror::Error;

/// Errors raised while turning caller input into typed token values.
///
/// Every variant is recoverable by the caller (reject or re-prompt); none of
/// them indicates a fault in the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
	/// An address, hex field or schema entry failed shape validation.
	#[error("Malformed input: {0}")]
	MalformedInput(String),
	/// Signature bytes do not form a usable (r, s, v) triple.
	#[error("Malformed signature: {0}")]
	MalformedSignature(String),
	/// The `expires` field is not a parseable timestamp.
	#[error("Malformed expiry: {0}")]
	MalformedExpiry(String),
}
