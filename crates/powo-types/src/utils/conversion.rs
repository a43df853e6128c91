//! Address parsing for caller-supplied text.
//!
//! Follows the wallet convention for EIP-55: all-lowercase and all-uppercase
//! hex carry no checksum and are accepted as is, while mixed-case input must
//! match the checksum exactly.

use super::formatting::without_0x_prefix;
use alloy_primitives::Address;
use std::str::FromStr;

/// Parses a `0x`-prefixed 20-byte address, enforcing the checksum on mixed-case input.
pub fn parse_address(input: &str) -> Result<Address, String> {
	let input = input.trim();
	if !(input.starts_with("0x") || input.starts_with("0X")) {
		return Err(format!("Address '{}' must start with 0x", input));
	}

	let digits = without_0x_prefix(input);
	if digits.len() != 40 {
		return Err(format!(
			"Address must have 40 hex digits, got {}",
			digits.len()
		));
	}
	if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err(format!("Address '{}' contains non-hex characters", input));
	}

	let address = Address::from_str(digits).map_err(|e| format!("Invalid address: {}", e))?;

	let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
	let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
	if has_lower && has_upper {
		let checksummed = to_checksum(&address);
		if without_0x_prefix(&checksummed) != digits {
			return Err(format!("Bad address checksum for '{}'", input));
		}
	}

	Ok(address)
}

/// EIP-55 checksummed rendering of an address.
pub fn to_checksum(address: &Address) -> String {
	address.to_checksum(None)
}

#[cfg(test)]
mod tests {
	use super::*;

	const GATEKEEPER: &str = "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826";

	#[test]
	fn test_parse_checksummed_address() {
		let address = parse_address(GATEKEEPER).unwrap();
		assert_eq!(to_checksum(&address), GATEKEEPER);
	}

	#[test]
	fn test_parse_single_case_addresses() {
		let lower = parse_address(&GATEKEEPER.to_lowercase()).unwrap();
		let upper = parse_address(&format!("0x{}", &GATEKEEPER[2..].to_uppercase())).unwrap();
		assert_eq!(lower, upper);
		assert_eq!(to_checksum(&lower), GATEKEEPER);
	}

	#[test]
	fn test_reject_bad_checksum() {
		// Flip the case of one letter
		let tampered = GATEKEEPER.replacen("CD2a", "Cd2a", 1);
		let err = parse_address(&tampered).unwrap_err();
		assert!(err.contains("checksum"));
	}

	#[test]
	fn test_reject_malformed_shapes() {
		assert!(parse_address("CD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826").is_err());
		assert!(parse_address("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD8").is_err());
		assert!(parse_address("0xZZ2a3d9F938E13CD947Ec05AbC7FE734Df8DD826").is_err());
		assert!(parse_address("").is_err());
	}
}
