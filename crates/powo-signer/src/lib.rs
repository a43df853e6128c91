//! Signer capability for PoWo tokens.
//!
//! Wallet connectivity and account selection live outside this workspace. This
//! crate defines the seam they plug into: a [`SignerInterface`] that reports
//! its account address and signs a [`SigningRequest`], a service wrapper the
//! issuer is handed explicitly, and a factory registry so the binary can
//! build the configured implementation by name.

use async_trait::async_trait;
use powo_types::{Address, Bytes, ImplementationRegistry, SigningRequest};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors reported by signer implementations.
///
/// These are passed through to callers unchanged and are never folded into
/// verification outcomes.
#[derive(Debug, Error)]
pub enum SignerError {
	/// The holder declined to sign.
	#[error("User rejected the signing request: {0}")]
	UserRejected(String),
	/// The signing agent could not be reached.
	#[error("Signer unavailable: {0}")]
	Unavailable(String),
	/// Key material is missing or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The implementation failed while producing a signature.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
}

/// Interface every signer implementation provides.
#[async_trait]
pub trait SignerInterface: Send + Sync {
	/// Address of the account that will sign.
	async fn address(&self) -> Result<Address, SignerError>;

	/// Signs the typed message described by `request`, returning the
	/// 65-byte `r || s || v` signature.
	async fn sign_typed_data(&self, request: &SigningRequest) -> Result<Bytes, SignerError>;
}

/// Type alias for signer factory functions.
pub type SignerFactory = fn(&toml::Value) -> Result<Box<dyn SignerInterface>, SignerError>;

/// Registry trait for signer implementations.
pub trait SignerRegistry: ImplementationRegistry<Factory = SignerFactory> {}

/// Get all registered signer implementations as `(name, factory)` pairs.
pub fn get_all_implementations() -> Vec<(&'static str, SignerFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Builds the implementation registered under `name` from its config table.
pub fn create_signer(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn SignerInterface>, SignerError> {
	let factory = get_all_implementations()
		.into_iter()
		.find(|(registered, _)| *registered == name)
		.map(|(_, factory)| factory)
		.ok_or_else(|| SignerError::Unavailable(format!("Unknown signer implementation '{}'", name)))?;
	factory(config)
}

/// Service that wraps the signer implementation handed to the issuer.
pub struct SignerService {
	implementation: Box<dyn SignerInterface>,
}

impl SignerService {
	pub fn new(implementation: Box<dyn SignerInterface>) -> Self {
		Self { implementation }
	}

	/// Retrieves the address of the signing account.
	pub async fn get_address(&self) -> Result<Address, SignerError> {
		self.implementation.address().await
	}

	/// Forwards a signing request to the implementation.
	pub async fn sign(&self, request: &SigningRequest) -> Result<Bytes, SignerError> {
		tracing::debug!(digest = %request.digest_hex(), "Requesting signature");
		self.implementation.sign_typed_data(request).await
	}
}
