//! Canonical EIP-712 encoding of PoWo messages.
//!
//! The digest every signature is made over is
//! `keccak256(0x1901 || encode_domain(domain) || encode_value(schema, value))`,
//! where `encode_value` is `keccak256(encode_type(schema) || field words...)`
//! with the field words taken in schema order.

use alloy_primitives::{keccak256, B256};
use powo_types::{
	utils::{compute_domain_hash, compute_final_digest, Eip712AbiEncoder},
	Domain, FieldKind, FieldSchema, FieldValue, MessageValue, SigningRequest, TokenError,
	TypedField,
};
use serde_json::json;

/// Domain separator of `domain`.
pub fn encode_domain(domain: &Domain) -> B256 {
	compute_domain_hash(&domain.name, &domain.version, domain.chain_id)
}

/// Type hash of `schema`: keccak256 of its canonical type string.
pub fn encode_type(schema: &FieldSchema) -> B256 {
	keccak256(schema.type_string().as_bytes())
}

/// Struct hash of `value` under `schema`.
///
/// Fails only when the schema names a field the message does not carry, or
/// declares a type that does not match the field.
pub fn encode_value(schema: &FieldSchema, value: &MessageValue) -> Result<B256, TokenError> {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&encode_type(schema));
	for field in &schema.fields {
		match (field.kind, resolve_field(field, value)?) {
			(FieldKind::String, FieldValue::String(text)) => enc.push_string(text),
			(FieldKind::Address, FieldValue::Address(address)) => enc.push_address(address),
			(kind, _) => {
				return Err(TokenError::MalformedInput(format!(
					"Field '{}' is not of type {}",
					field.name, kind
				)))
			},
		}
	}
	Ok(keccak256(enc.finish()))
}

/// Final signing target for `value`.
pub fn digest(
	domain: &Domain,
	schema: &FieldSchema,
	value: &MessageValue,
) -> Result<B256, TokenError> {
	let struct_hash = encode_value(schema, value)?;
	Ok(compute_final_digest(&encode_domain(domain), &struct_hash))
}

fn resolve_field<'a>(
	field: &TypedField,
	value: &'a MessageValue,
) -> Result<FieldValue<'a>, TokenError> {
	value.field(&field.name).ok_or_else(|| {
		TokenError::MalformedInput(format!("Message has no field named '{}'", field.name))
	})
}

/// Domain and schema bound together, with the domain separator and type
/// hash computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCodec {
	domain: Domain,
	schema: FieldSchema,
	domain_separator: B256,
}

impl MessageCodec {
	pub fn new(domain: Domain, schema: FieldSchema) -> Self {
		let domain_separator = encode_domain(&domain);
		Self {
			domain,
			schema,
			domain_separator,
		}
	}

	/// Codec for `PoWo` messages under `domain`.
	pub fn powo(domain: Domain) -> Self {
		Self::new(domain, FieldSchema::powo())
	}

	pub fn domain(&self) -> &Domain {
		&self.domain
	}

	pub fn schema(&self) -> &FieldSchema {
		&self.schema
	}

	pub fn domain_separator(&self) -> B256 {
		self.domain_separator
	}

	pub fn type_hash(&self) -> B256 {
		encode_type(&self.schema)
	}

	pub fn struct_hash(&self, value: &MessageValue) -> Result<B256, TokenError> {
		encode_value(&self.schema, value)
	}

	pub fn digest(&self, value: &MessageValue) -> Result<B256, TokenError> {
		let digest = compute_final_digest(&self.domain_separator, &self.struct_hash(value)?);
		tracing::debug!(digest = %digest, expires = %value.expires, "Encoded message");
		Ok(digest)
	}

	/// Builds the request handed to a signer: the digest plus the
	/// `eth_signTypedData_v4` description of the same message.
	pub fn signing_request(&self, value: &MessageValue) -> Result<SigningRequest, TokenError> {
		let digest = self.digest(value)?;

		let mut message = serde_json::Map::new();
		for field in &self.schema.fields {
			let rendered = match resolve_field(field, value)? {
				FieldValue::String(text) => text.to_string(),
				FieldValue::Address(address) => address.to_checksum(None),
			};
			message.insert(field.name.clone(), serde_json::Value::String(rendered));
		}

		let mut types = serde_json::Map::new();
		types.insert(
			"EIP712Domain".to_string(),
			json!([
				{ "name": "name", "type": "string" },
				{ "name": "version", "type": "string" },
				{ "name": "chainId", "type": "uint256" },
			]),
		);
		types.insert(self.schema.type_name.clone(), json!(self.schema.fields));

		let typed_data = json!({
			"types": types,
			"primaryType": self.schema.type_name,
			"domain": self.domain,
			"message": message,
		});

		Ok(SigningRequest { digest, typed_data })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use powo_types::utils::DOMAIN_TYPE;
	use std::collections::HashSet;

	fn sample() -> MessageValue {
		MessageValue::new(
			"2099-01-01T00:00:00.000Z",
			address!("CD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"),
			"https://api.civic.com/asdf",
		)
	}

	fn powo_digest(value: &MessageValue) -> B256 {
		digest(&Domain::default(), &FieldSchema::powo(), value).unwrap()
	}

	#[test]
	fn test_digest_is_deterministic() {
		let value = sample();
		let first = powo_digest(&value);
		for _ in 0..16 {
			assert_eq!(powo_digest(&value), first);
		}
		assert_eq!(
			MessageCodec::powo(Domain::default()).digest(&value).unwrap(),
			first
		);
	}

	#[test]
	fn test_encode_type_hashes_type_string() {
		assert_eq!(
			encode_type(&FieldSchema::powo()),
			keccak256(
				"PoWo(string expires,address gatekeeperAddress,string gatekeeperURL)".as_bytes()
			)
		);
	}

	#[test]
	fn test_encode_domain_matches_manual_encoding() {
		let domain = Domain::default();
		let mut words = Vec::new();
		words.extend_from_slice(keccak256(DOMAIN_TYPE.as_bytes()).as_slice());
		words.extend_from_slice(keccak256("Gateway Powo".as_bytes()).as_slice());
		words.extend_from_slice(keccak256("1".as_bytes()).as_slice());
		let mut chain_word = [0u8; 32];
		chain_word[31] = 1;
		words.extend_from_slice(&chain_word);

		assert_eq!(encode_domain(&domain), keccak256(&words));
	}

	#[test]
	fn test_encode_value_matches_manual_encoding() {
		let value = sample();
		let mut words = Vec::new();
		words.extend_from_slice(encode_type(&FieldSchema::powo()).as_slice());
		words.extend_from_slice(keccak256(value.expires.as_bytes()).as_slice());
		words.extend_from_slice(&[0u8; 12]);
		words.extend_from_slice(value.gatekeeper_address.as_slice());
		words.extend_from_slice(keccak256(value.gatekeeper_url.as_bytes()).as_slice());

		assert_eq!(
			encode_value(&FieldSchema::powo(), &value).unwrap(),
			keccak256(&words)
		);
	}

	#[test]
	fn test_digest_sensitive_to_field_mutations() {
		let base = sample();
		let mut seen = HashSet::new();
		seen.insert(powo_digest(&base));

		// Every single-bit flip of the gatekeeper address
		for byte in 0..20 {
			for bit in 0..8 {
				let mut value = base.clone();
				value.gatekeeper_address.0[byte] ^= 1 << bit;
				assert!(seen.insert(powo_digest(&value)));
			}
		}

		// Every single-character change of the string fields
		for i in 0..base.expires.len() {
			let mut bytes = base.expires.clone().into_bytes();
			bytes[i] ^= 0x01;
			let mut value = base.clone();
			value.expires = String::from_utf8(bytes).unwrap();
			assert!(seen.insert(powo_digest(&value)));
		}
		for i in 0..base.gatekeeper_url.len() {
			let mut bytes = base.gatekeeper_url.clone().into_bytes();
			bytes[i] ^= 0x01;
			let mut value = base.clone();
			value.gatekeeper_url = String::from_utf8(bytes).unwrap();
			assert!(seen.insert(powo_digest(&value)));
		}

		// Appending to a field
		let mut value = base.clone();
		value.gatekeeper_url.push('/');
		assert!(seen.insert(powo_digest(&value)));
	}

	#[test]
	fn test_digest_sensitive_to_field_order() {
		let value = sample();
		let mut reordered = FieldSchema::powo();
		reordered.fields.swap(0, 2);

		assert_ne!(
			digest(&Domain::default(), &reordered, &value).unwrap(),
			powo_digest(&value)
		);
	}

	#[test]
	fn test_domain_isolation() {
		let value = sample();
		let schema = FieldSchema::powo();
		let mainnet = digest(&Domain::gateway_powo(1), &schema, &value).unwrap();
		let other = digest(&Domain::gateway_powo(137), &schema, &value).unwrap();
		assert_ne!(mainnet, other);

		let renamed = Domain::new("Gateway PoWo", "1", 1);
		assert_ne!(digest(&renamed, &schema, &value).unwrap(), mainnet);
		let bumped = Domain::new("Gateway Powo", "2", 1);
		assert_ne!(digest(&bumped, &schema, &value).unwrap(), mainnet);
	}

	#[test]
	fn test_schema_mismatch_is_malformed_input() {
		let value = sample();

		let unknown = FieldSchema::new(
			"PoWo",
			vec![TypedField::new("gatekeeperDID", FieldKind::String)],
		);
		assert!(matches!(
			encode_value(&unknown, &value),
			Err(TokenError::MalformedInput(_))
		));

		let mistyped = FieldSchema::new(
			"PoWo",
			vec![TypedField::new("gatekeeperAddress", FieldKind::String)],
		);
		assert!(matches!(
			encode_value(&mistyped, &value),
			Err(TokenError::MalformedInput(_))
		));
	}

	#[test]
	fn test_signing_request_shape() {
		let codec = MessageCodec::powo(Domain::default());
		let request = codec.signing_request(&sample()).unwrap();

		assert_eq!(request.digest, codec.digest(&sample()).unwrap());
		assert!(request.digest_hex().starts_with("0x"));
		assert_eq!(request.digest_hex().len(), 66);

		let typed = &request.typed_data;
		assert_eq!(typed["primaryType"], "PoWo");
		assert_eq!(typed["domain"]["name"], "Gateway Powo");
		assert_eq!(typed["domain"]["version"], "1");
		assert_eq!(typed["domain"]["chainId"], 1);
		assert_eq!(typed["types"]["EIP712Domain"][2]["type"], "uint256");
		assert_eq!(typed["types"]["PoWo"][1]["name"], "gatekeeperAddress");
		assert_eq!(typed["types"]["PoWo"][1]["type"], "address");
		assert_eq!(
			typed["message"]["gatekeeperAddress"],
			"0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
		);
		assert_eq!(typed["message"]["expires"], "2099-01-01T00:00:00.000Z");
	}

	#[test]
	fn test_codec_caches_domain_separator() {
		let codec = MessageCodec::powo(Domain::gateway_powo(10));
		assert_eq!(
			codec.domain_separator(),
			encode_domain(&Domain::gateway_powo(10))
		);
		assert_eq!(codec.type_hash(), encode_type(&FieldSchema::powo()));
		assert_eq!(codec.domain().chain_id, 10);
		assert_eq!(codec.schema(), &FieldSchema::powo());
	}
}
