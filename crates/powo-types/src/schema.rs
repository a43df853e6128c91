//! Field schema of structured messages.
//!
//! A schema is the ordered list of `(name, type)` pairs of one struct type.
//! Order matters twice: it defines the type string that is hashed into the
//! type hash, and the order in which field values are encoded.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary type name of gateway messages.
pub const POWO_TYPE_NAME: &str = "PoWo";

/// Solidity types a schema field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
	/// Dynamic UTF-8 string, hashed before encoding.
	String,
	/// 20-byte account address, left-padded to a word.
	Address,
}

impl FieldKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			FieldKind::String => "string",
			FieldKind::Address => "address",
		}
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FieldKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"string" => Ok(FieldKind::String),
			"address" => Ok(FieldKind::Address),
			other => Err(format!("Unsupported field type '{}'", other)),
		}
	}
}

/// One `(name, type)` entry of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedField {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: FieldKind,
}

impl TypedField {
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
		}
	}
}

/// Ordered field list of a named struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSchema {
	pub type_name: String,
	pub fields: Vec<TypedField>,
}

impl FieldSchema {
	pub fn new(type_name: impl Into<String>, fields: Vec<TypedField>) -> Self {
		Self {
			type_name: type_name.into(),
			fields,
		}
	}

	/// The `PoWo` schema: `expires`, `gatekeeperAddress`, `gatekeeperURL`.
	pub fn powo() -> Self {
		Self::new(
			POWO_TYPE_NAME,
			vec![
				TypedField::new("expires", FieldKind::String),
				TypedField::new("gatekeeperAddress", FieldKind::Address),
				TypedField::new("gatekeeperURL", FieldKind::String),
			],
		)
	}

	/// Canonical type string, e.g. `PoWo(string expires,address gatekeeperAddress,string gatekeeperURL)`.
	pub fn type_string(&self) -> String {
		let members: Vec<String> = self
			.fields
			.iter()
			.map(|field| format!("{} {}", field.kind, field.name))
			.collect();
		format!("{}({})", self.type_name, members.join(","))
	}
}

impl Default for FieldSchema {
	fn default() -> Self {
		Self::powo()
	}
}
