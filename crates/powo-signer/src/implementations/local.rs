//! Local private-key signer.
//!
//! Signs PoWo digests with a secp256k1 key taken from configuration. Meant
//! for development, tests and service-side issuance; holders normally sign
//! with their own wallet through another [`SignerInterface`] implementation.

use crate::{SignerError, SignerFactory, SignerInterface, SignerRegistry};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use powo_types::{
	without_0x_prefix, Address, Bytes, ConfigSchema, Field, ImplementationRegistry, Schema,
	SecretString, SigningRequest, ValidationError,
};

/// Signer backed by an in-process private key.
#[derive(Debug)]
pub struct LocalSigner {
	signer: PrivateKeySigner,
}

impl LocalSigner {
	/// Creates a signer from a hex private key (with or without `0x`).
	pub fn new(private_key: &SecretString) -> Result<Self, SignerError> {
		let signer = private_key
			.with_exposed(|key| key.parse::<PrivateKeySigner>())
			.map_err(|e| SignerError::InvalidKey(format!("Failed to parse private key: {}", e)))?;
		Ok(Self { signer })
	}
}

#[async_trait]
impl SignerInterface for LocalSigner {
	async fn address(&self) -> Result<Address, SignerError> {
		Ok(self.signer.address())
	}

	async fn sign_typed_data(&self, request: &SigningRequest) -> Result<Bytes, SignerError> {
		let signature = self
			.signer
			.sign_hash(&request.digest)
			.await
			.map_err(|e| SignerError::SigningFailed(e.to_string()))?;
		Ok(Bytes::from(signature.as_bytes().to_vec()))
	}
}

/// Configuration schema for LocalSigner.
pub struct LocalSignerSchema;

impl ConfigSchema for LocalSignerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key").with_validator(|value| {
					let key = value.as_str().unwrap_or_default();
					let digits = without_0x_prefix(key);
					if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
						return Err("Private key must be 64 hex characters".to_string());
					}
					Ok(())
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

/// Factory function to create a local signer from configuration.
///
/// Configuration parameters:
/// - `private_key`: hex-encoded secp256k1 key
pub fn create_signer(config: &toml::Value) -> Result<Box<dyn SignerInterface>, SignerError> {
	LocalSignerSchema
		.validate(config)
		.map_err(|e| SignerError::InvalidKey(format!("Invalid configuration: {}", e)))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| SignerError::InvalidKey("private_key is required".to_string()))?;

	Ok(Box::new(LocalSigner::new(&private_key)?))
}

/// Registry for the local signer implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = SignerFactory;

	fn factory() -> Self::Factory {
		create_signer
	}
}

impl SignerRegistry for Registry {}
