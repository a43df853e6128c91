//! Hex string formatting utilities.
//!
//! Digests and signatures cross textual boundaries as `0x`-prefixed lowercase
//! hex; these helpers keep that representation in one place.

use alloy_primitives::hex;

/// Utility function to truncate a hex string for display purposes.
///
/// Shows only the first 10 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Removes "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Renders bytes as `0x`-prefixed lowercase hex.
pub fn format_hex(bytes: impl AsRef<[u8]>) -> String {
	format!("0x{}", hex::encode(bytes))
}
