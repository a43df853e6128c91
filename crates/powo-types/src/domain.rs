//! Signing domain for PoWo messages.

use serde::{Deserialize, Serialize};

/// Application name bound into every PoWo signature.
pub const DOMAIN_NAME: &str = "Gateway Powo";
/// Domain version tag.
pub const DOMAIN_VERSION: &str = "1";
/// Ethereum mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// EIP-712 domain identifying the signing context.
///
/// Signer and verifier must agree on every field. A mismatch does not fail
/// loudly: it produces a different digest and therefore a different recovered
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
	pub name: String,
	pub version: String,
	pub chain_id: u64,
}

impl Domain {
	pub fn new(name: impl Into<String>, version: impl Into<String>, chain_id: u64) -> Self {
		Self {
			name: name.into(),
			version: version.into(),
			chain_id,
		}
	}

	/// The gateway domain on the given chain.
	pub fn gateway_powo(chain_id: u64) -> Self {
		Self::new(DOMAIN_NAME, DOMAIN_VERSION, chain_id)
	}
}

impl Default for Domain {
	fn default() -> Self {
		Self::gateway_powo(DEFAULT_CHAIN_ID)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_domain() {
		let domain = Domain::default();
		assert_eq!(domain.name, "Gateway Powo");
		assert_eq!(domain.version, "1");
		assert_eq!(domain.chain_id, 1);
	}

	#[test]
	fn test_domain_json_uses_wallet_field_names() {
		let json = serde_json::to_value(Domain::gateway_powo(5)).unwrap();
		assert_eq!(json["chainId"], 5);
		assert_eq!(json["name"], "Gateway Powo");
	}
}
