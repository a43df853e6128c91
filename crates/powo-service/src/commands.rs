//! Command implementations, kept free of argument parsing and printing.

use powo_config::{Config, ConfigError};
use powo_core::{Clock, IssueError, MessageCodec, TokenIssuer, TokenVerifier};
use powo_signer::{create_signer, SignerError, SignerService};
use powo_types::{
	format_hex, parse_address, InvalidReason, MessageValue, SignedToken, TokenError,
	Verification,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncReadExt;

/// Errors surfaced by the command line.
#[derive(Debug, Error)]
pub enum ServiceError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Token(#[from] TokenError),
	#[error(transparent)]
	Signer(#[from] SignerError),
	#[error(transparent)]
	Issue(#[from] IssueError),
	#[error("Invalid token JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Missing {0}")]
	Missing(String),
	#[error("Token rejected: {0}")]
	Invalid(InvalidReason),
}

fn codec(config: &Config) -> MessageCodec {
	MessageCodec::powo(config.domain())
}

/// Digest, intermediate hashes and signing request of a message.
pub fn digest(
	config: &Config,
	expires: &str,
	gatekeeper_address: &str,
	gatekeeper_url: &str,
) -> Result<serde_json::Value, ServiceError> {
	let codec = codec(config);
	let value = MessageValue::parse(expires, gatekeeper_address, gatekeeper_url)?;
	let request = codec.signing_request(&value)?;

	Ok(json!({
		"digest": request.digest_hex(),
		"domainSeparator": format_hex(codec.domain_separator()),
		"typeHash": format_hex(codec.type_hash()),
		"structHash": format_hex(codec.struct_hash(&value)?),
		"typedData": request.typed_data,
	}))
}

/// Issues a token with the configured signer.
pub async fn issue(
	config: &Config,
	gatekeeper_address: Option<&str>,
	gatekeeper_url: Option<&str>,
	clock: Arc<dyn Clock>,
) -> Result<SignedToken, ServiceError> {
	let signer_config = config
		.signer
		.as_ref()
		.ok_or_else(|| ServiceError::Missing("[signer] configuration section".into()))?;
	let implementation_config = signer_config.primary_config().ok_or_else(|| {
		ServiceError::Missing(format!(
			"signer.implementations.{} configuration",
			signer_config.primary
		))
	})?;
	let implementation = create_signer(&signer_config.primary, implementation_config)?;

	let gatekeeper = match gatekeeper_address {
		Some(text) => parse_address(text).map_err(TokenError::MalformedInput)?,
		None => config
			.token
			.gatekeeper()?
			.ok_or_else(|| ServiceError::Missing("gatekeeper address".into()))?,
	};
	let url = gatekeeper_url
		.map(str::to_string)
		.or_else(|| config.token.gatekeeper_url.clone())
		.ok_or_else(|| ServiceError::Missing("gatekeeper URL".into()))?;

	let issuer = TokenIssuer::new(
		codec(config),
		Arc::new(SignerService::new(implementation)),
		clock,
	)
	.with_lifetime(chrono::Duration::minutes(config.token.lifetime_minutes as i64));

	Ok(issuer.issue(gatekeeper, url.trim()).await?)
}

/// Verifies a token given as JSON against an expected signer.
pub fn verify(
	config: &Config,
	token_json: &str,
	expected_signer: &str,
	clock: Arc<dyn Clock>,
) -> Result<Verification, ServiceError> {
	let expected = parse_address(expected_signer).map_err(TokenError::MalformedInput)?;
	let token: SignedToken = serde_json::from_str(token_json)?;
	let verifier = TokenVerifier::new(codec(config), clock);
	Ok(verifier.verify_token(&token, &expected))
}

/// JSON report of a verification outcome.
pub fn verification_report(verification: &Verification) -> serde_json::Value {
	match verification {
		Verification::Valid => json!({ "valid": true }),
		Verification::Invalid(reason) => json!({
			"valid": false,
			"reason": reason.code(),
			"detail": reason.to_string(),
		}),
	}
}

/// Turns a rejected verification into an error so the process exits non-zero.
pub fn ensure_valid(verification: &Verification) -> Result<(), ServiceError> {
	match verification.reason() {
		Some(reason) => Err(ServiceError::Invalid(reason.clone())),
		None => Ok(()),
	}
}

/// Reads token JSON from a file, or from stdin when `source` is `-`.
pub async fn read_token_source(source: &str) -> Result<String, ServiceError> {
	if source == "-" {
		let mut buf = String::new();
		tokio::io::stdin().read_to_string(&mut buf).await?;
		return Ok(buf);
	}
	Ok(tokio::fs::read_to_string(source).await?)
}
