//! Signing requests handed to wallet signers.

use crate::utils::format_hex;
use alloy_primitives::B256;
use serde::Serialize;

/// Everything a signer needs to produce a PoWo signature.
///
/// Wallets that recompute the digest themselves use `typed_data`
/// (`eth_signTypedData_v4` shape); key-holding signers sign `digest` directly.
/// Both describe the same message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
	#[serde(serialize_with = "serialize_digest")]
	pub digest: B256,
	pub typed_data: serde_json::Value,
}

impl SigningRequest {
	pub fn digest_hex(&self) -> String {
		format_hex(self.digest)
	}
}

fn serialize_digest<S>(digest: &B256, serializer: S) -> Result<S::Ok, S::Error>
where
	S: serde::Serializer,
{
	serializer.serialize_str(&format_hex(digest))
}
