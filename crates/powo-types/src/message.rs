//! PoWo message values.
//!
//! A message value is the payload a holder signs: when it expires, which
//! gatekeeper it is bound to and where that gatekeeper lives. Values are built
//! fresh for every signing or verification attempt and never mutated.

use crate::utils::{parse_address, parse_timestamp, to_checksum};
use crate::TokenError;
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payload of a PoWo token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageValue {
	/// Absolute expiry instant as ISO-8601 text. Kept verbatim since the text is what gets signed.
	pub expires: String,
	#[serde(
		rename = "gatekeeperAddress",
		serialize_with = "serialize_checksummed",
		deserialize_with = "deserialize_checked"
	)]
	pub gatekeeper_address: Address,
	#[serde(rename = "gatekeeperURL")]
	pub gatekeeper_url: String,
}

/// A field value borrowed out of a message, tagged with its encoding class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
	String(&'a str),
	Address(&'a Address),
}

impl MessageValue {
	pub fn new(
		expires: impl Into<String>,
		gatekeeper_address: Address,
		gatekeeper_url: impl Into<String>,
	) -> Self {
		Self {
			expires: expires.into(),
			gatekeeper_address,
			gatekeeper_url: gatekeeper_url.into(),
		}
	}

	/// Builds a value from raw caller text, validating the gatekeeper address.
	///
	/// The expiry is not parsed here: an unparseable expiry is a verification
	/// outcome, not an input error.
	pub fn parse(
		expires: &str,
		gatekeeper_address: &str,
		gatekeeper_url: &str,
	) -> Result<Self, TokenError> {
		let address = parse_address(gatekeeper_address).map_err(TokenError::MalformedInput)?;
		Ok(Self::new(expires.trim(), address, gatekeeper_url.trim()))
	}

	/// Looks up a field by its schema name.
	pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
		match name {
			"expires" => Some(FieldValue::String(&self.expires)),
			"gatekeeperAddress" => Some(FieldValue::Address(&self.gatekeeper_address)),
			"gatekeeperURL" => Some(FieldValue::String(&self.gatekeeper_url)),
			_ => None,
		}
	}

	/// Parses `expires` into an instant.
	pub fn expires_at(&self) -> Result<DateTime<Utc>, TokenError> {
		parse_timestamp(&self.expires)
			.map_err(|e| TokenError::MalformedExpiry(format!("'{}': {}", self.expires, e)))
	}
}

fn serialize_checksummed<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&to_checksum(address))
}

fn deserialize_checked<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
	D: Deserializer<'de>,
{
	let text = String::deserialize(deserializer)?;
	parse_address(&text).map_err(serde::de::Error::custom)
}
