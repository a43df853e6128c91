//! Token issuance.
//!
//! The issuer stamps a message with an expiry, asks the injected signer to
//! sign it and checks the returned signature before handing the token out.

use crate::clock::Clock;
use crate::codec::MessageCodec;
use crate::verifier;
use alloy_primitives::Address;
use chrono::Duration;
use powo_signer::{SignerError, SignerService};
use powo_types::{
	utils::{format_timestamp, truncate_id},
	InvalidReason, MessageValue, SignedToken, TokenError, Verification,
};
use std::sync::Arc;
use thiserror::Error;

/// Default validity window of an issued token.
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Errors that can occur while issuing a token.
#[derive(Debug, Error)]
pub enum IssueError {
	/// The signer failed or the holder declined; passed through unchanged.
	#[error(transparent)]
	Signer(#[from] SignerError),
	/// The message could not be encoded.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// The signer returned a signature that does not verify for its own address.
	#[error("Signer returned an unusable signature: {0}")]
	Rejected(InvalidReason),
}

/// Issues signed PoWo tokens for one codec and signer.
pub struct TokenIssuer {
	codec: MessageCodec,
	signer: Arc<SignerService>,
	clock: Arc<dyn Clock>,
	lifetime: Duration,
}

impl TokenIssuer {
	pub fn new(codec: MessageCodec, signer: Arc<SignerService>, clock: Arc<dyn Clock>) -> Self {
		Self {
			codec,
			signer,
			clock,
			lifetime: Duration::minutes(DEFAULT_TOKEN_LIFETIME_MINUTES),
		}
	}

	pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
		self.lifetime = lifetime;
		self
	}

	pub fn lifetime(&self) -> Duration {
		self.lifetime
	}

	/// Builds the message for a gatekeeper, expiring one lifetime from now.
	pub fn build_message(&self, gatekeeper_address: Address, gatekeeper_url: &str) -> MessageValue {
		let expires = self.clock.now() + self.lifetime;
		MessageValue::new(format_timestamp(&expires), gatekeeper_address, gatekeeper_url)
	}

	/// Signs a prepared message.
	pub async fn sign(&self, message: MessageValue) -> Result<SignedToken, IssueError> {
		let request = self.codec.signing_request(&message)?;
		let signer = self.signer.get_address().await?;
		let signature = self.signer.sign(&request).await?;

		match verifier::verify(
			self.codec.domain(),
			self.codec.schema(),
			&message,
			&signature,
			&signer,
			self.clock.now(),
		) {
			Verification::Valid => {},
			Verification::Invalid(reason) => return Err(IssueError::Rejected(reason)),
		}

		let token = SignedToken {
			message,
			signature,
			signer,
		};
		tracing::info!(
			signer = %token.signer,
			digest = %truncate_id(&request.digest_hex()),
			signature = %truncate_id(&token.signature_hex()),
			expires = %token.message.expires,
			"Issued token"
		);
		Ok(token)
	}

	/// Builds and signs a token for a gatekeeper.
	pub async fn issue(
		&self,
		gatekeeper_address: Address,
		gatekeeper_url: &str,
	) -> Result<SignedToken, IssueError> {
		let message = self.build_message(gatekeeper_address, gatekeeper_url);
		self.sign(message).await
	}
}
