//! Signature recovery and token verification.
//!
//! A token is accepted only when two independent checks pass: the signature
//! recovers to the expected signer, and the message has not expired at the
//! injected `now`. Identity is checked first so that a token that is both
//! forged and stale reports the forgery.

use crate::clock::Clock;
use crate::codec::{self, MessageCodec};
use alloy_primitives::{Address, PrimitiveSignature, U256};
use chrono::{DateTime, Utc};
use powo_types::{
	Domain, FieldSchema, InvalidReason, MessageValue, SignedToken, TokenError, Verification,
};
use std::sync::Arc;

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Splits a 65-byte signature into its (r, s, v) components.
///
/// `v` may be given as a raw parity bit (0/1) or in the legacy 27/28 form.
/// Any other recovery id is rejected.
pub fn parse_signature(signature: &[u8]) -> Result<PrimitiveSignature, TokenError> {
	if signature.len() != SIGNATURE_LENGTH {
		return Err(TokenError::MalformedSignature(format!(
			"Expected {} bytes, got {}",
			SIGNATURE_LENGTH,
			signature.len()
		)));
	}

	let y_parity = match signature[64] {
		0 | 27 => false,
		1 | 28 => true,
		v => {
			return Err(TokenError::MalformedSignature(format!(
				"Invalid recovery id {}",
				v
			)))
		},
	};
	let r = U256::from_be_slice(&signature[..32]);
	let s = U256::from_be_slice(&signature[32..64]);

	Ok(PrimitiveSignature::new(r, s, y_parity))
}

/// Recovers the address that signed `value` under `domain` and `schema`.
pub fn recover_signer(
	domain: &Domain,
	schema: &FieldSchema,
	value: &MessageValue,
	signature: &[u8],
) -> Result<Address, TokenError> {
	let digest = codec::digest(domain, schema, value)?;
	let parsed = parse_signature(signature)?;
	parsed
		.recover_address_from_prehash(&digest)
		.map_err(|e| TokenError::MalformedSignature(e.to_string()))
}

/// Verifies `signature` over `value` against `expected_signer` at `now`.
pub fn verify(
	domain: &Domain,
	schema: &FieldSchema,
	value: &MessageValue,
	signature: &[u8],
	expected_signer: &Address,
	now: DateTime<Utc>,
) -> Verification {
	let recovered = match recover_signer(domain, schema, value, signature) {
		Ok(address) => address,
		Err(TokenError::MalformedInput(detail)) => {
			return Verification::Invalid(InvalidReason::MalformedInput(detail))
		},
		Err(TokenError::MalformedSignature(detail)) => {
			return Verification::Invalid(InvalidReason::MalformedSignature(detail))
		},
		Err(e) => return Verification::Invalid(InvalidReason::MalformedSignature(e.to_string())),
	};

	if recovered != *expected_signer {
		return Verification::Invalid(InvalidReason::SignerMismatch {
			expected: *expected_signer,
			recovered,
		});
	}

	let expires = match value.expires_at() {
		Ok(instant) => instant,
		Err(TokenError::MalformedExpiry(detail)) => {
			return Verification::Invalid(InvalidReason::MalformedExpiry(detail))
		},
		Err(e) => return Verification::Invalid(InvalidReason::MalformedExpiry(e.to_string())),
	};

	if expires <= now {
		return Verification::Invalid(InvalidReason::Expired { expires, now });
	}

	Verification::Valid
}

/// Verifier bound to one codec and an injected clock.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
	codec: MessageCodec,
	clock: Arc<dyn Clock>,
}

impl TokenVerifier {
	pub fn new(codec: MessageCodec, clock: Arc<dyn Clock>) -> Self {
		Self { codec, clock }
	}

	pub fn codec(&self) -> &MessageCodec {
		&self.codec
	}

	pub fn recover_signer(
		&self,
		value: &MessageValue,
		signature: &[u8],
	) -> Result<Address, TokenError> {
		recover_signer(
			self.codec.domain(),
			self.codec.schema(),
			value,
			signature,
		)
	}

	/// Verifies at an explicit instant.
	pub fn verify_at(
		&self,
		value: &MessageValue,
		signature: &[u8],
		expected_signer: &Address,
		now: DateTime<Utc>,
	) -> Verification {
		let outcome = verify(
			self.codec.domain(),
			self.codec.schema(),
			value,
			signature,
			expected_signer,
			now,
		);
		if let Verification::Invalid(reason) = &outcome {
			tracing::warn!(reason = reason.code(), "Rejected token: {}", reason);
		}
		outcome
	}

	/// Verifies at the instant reported by the injected clock.
	pub fn verify(
		&self,
		value: &MessageValue,
		signature: &[u8],
		expected_signer: &Address,
	) -> Verification {
		self.verify_at(value, signature, expected_signer, self.clock.now())
	}

	/// Verifies a signed token against the caller's expected signer.
	///
	/// The signer recorded inside the token is ignored: it is whatever the
	/// presenter claims.
	pub fn verify_token(&self, token: &SignedToken, expected_signer: &Address) -> Verification {
		self.verify(&token.message, &token.signature, expected_signer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::FixedClock;
	use alloy_primitives::address;
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;
	use chrono::{Duration, TimeZone};

	const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const ANVIL_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
	const OTHER_ADDRESS: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

	fn key() -> PrivateKeySigner {
		ANVIL_KEY.parse().unwrap()
	}

	fn sample() -> MessageValue {
		MessageValue::parse(
			"2099-01-01T00:00:00.000Z",
			"0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826",
			"https://api.civic.com/asdf",
		)
		.unwrap()
	}

	fn sign(domain: &Domain, value: &MessageValue) -> Vec<u8> {
		let digest = codec::digest(domain, &FieldSchema::powo(), value).unwrap();
		key().sign_hash_sync(&digest).unwrap().as_bytes().to_vec()
	}

	fn at(year: i32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()
	}

	fn check(
		value: &MessageValue,
		signature: &[u8],
		expected: &Address,
		now: DateTime<Utc>,
	) -> Verification {
		verify(
			&Domain::default(),
			&FieldSchema::powo(),
			value,
			signature,
			expected,
			now,
		)
	}

	#[test]
	fn test_round_trip_recovers_signer() {
		let value = sample();
		let signature = sign(&Domain::default(), &value);
		let recovered =
			recover_signer(&Domain::default(), &FieldSchema::powo(), &value, &signature).unwrap();
		assert_eq!(recovered, ANVIL_ADDRESS);
		assert_eq!(recovered, key().address());
	}

	#[test]
	fn test_scenario() {
		let value = sample();
		let signature = sign(&Domain::default(), &value);

		assert_eq!(
			check(&value, &signature, &ANVIL_ADDRESS, at(2024)),
			Verification::Valid
		);
		assert_eq!(
			check(&value, &signature, &OTHER_ADDRESS, at(2024)),
			Verification::Invalid(InvalidReason::SignerMismatch {
				expected: OTHER_ADDRESS,
				recovered: ANVIL_ADDRESS,
			})
		);
		assert_eq!(
			check(&value, &signature, &ANVIL_ADDRESS, at(2100)),
			Verification::Invalid(InvalidReason::Expired {
				expires: at(2099),
				now: at(2100),
			})
		);
	}

	#[test]
	fn test_expiry_boundary() {
		let value = sample();
		let signature = sign(&Domain::default(), &value);
		let expires = at(2099);

		assert!(matches!(
			check(&value, &signature, &ANVIL_ADDRESS, expires),
			Verification::Invalid(InvalidReason::Expired { .. })
		));
		assert_eq!(
			check(
				&value,
				&signature,
				&ANVIL_ADDRESS,
				expires - Duration::milliseconds(1)
			),
			Verification::Valid
		);
	}

	#[test]
	fn test_identity_checked_before_expiry() {
		let value = sample();
		let signature = sign(&Domain::default(), &value);
		assert!(matches!(
			check(&value, &signature, &OTHER_ADDRESS, at(2100)),
			Verification::Invalid(InvalidReason::SignerMismatch { .. })
		));
	}

	#[test]
	fn test_short_iso_expiry_forms() {
		for expires in ["2099-01-01T00:00Z", "2099-01-01"] {
			let mut value = sample();
			value.expires = expires.to_string();
			let signature = sign(&Domain::default(), &value);

			assert_eq!(
				check(&value, &signature, &ANVIL_ADDRESS, at(2024)),
				Verification::Valid,
				"{}",
				expires
			);
			assert_eq!(
				check(&value, &signature, &ANVIL_ADDRESS, at(2099)),
				Verification::Invalid(InvalidReason::Expired {
					expires: at(2099),
					now: at(2099),
				}),
				"{}",
				expires
			);
		}
	}

	#[test]
	fn test_malformed_expiry() {
		let mut value = sample();
		value.expires = "soon".to_string();
		let signature = sign(&Domain::default(), &value);
		assert!(matches!(
			check(&value, &signature, &ANVIL_ADDRESS, at(2024)),
			Verification::Invalid(InvalidReason::MalformedExpiry(_))
		));
	}

	#[test]
	fn test_tampered_signature_never_verifies() {
		let value = sample();
		let signature = sign(&Domain::default(), &value);

		for byte in 0..SIGNATURE_LENGTH {
			for bit in 0..8 {
				let mut tampered = signature.clone();
				tampered[byte] ^= 1 << bit;
				let outcome = check(&value, &tampered, &ANVIL_ADDRESS, at(2024));
				assert!(
					matches!(
						outcome,
						Verification::Invalid(InvalidReason::MalformedSignature(_))
							| Verification::Invalid(InvalidReason::SignerMismatch { .. })
					),
					"flipping bit {} of byte {} gave {:?}",
					bit,
					byte,
					outcome
				);
			}
		}
	}

	#[test]
	fn test_tampered_message_never_verifies() {
		let value = sample();
		let signature = sign(&Domain::default(), &value);

		let mut moved = value.clone();
		moved.gatekeeper_url = "https://evil.example/asdf".to_string();
		let mut extended = value.clone();
		extended.expires = "2199-01-01T00:00:00.000Z".to_string();

		for tampered in [moved, extended] {
			assert!(matches!(
				check(&tampered, &signature, &ANVIL_ADDRESS, at(2024)),
				Verification::Invalid(InvalidReason::SignerMismatch { .. })
					| Verification::Invalid(InvalidReason::MalformedSignature(_))
			));
		}
	}

	#[test]
	fn test_domain_mismatch_is_signer_mismatch() {
		let value = sample();
		let signature = sign(&Domain::gateway_powo(137), &value);
		assert!(matches!(
			check(&value, &signature, &ANVIL_ADDRESS, at(2024)),
			Verification::Invalid(InvalidReason::SignerMismatch { .. })
		));
	}

	#[test]
	fn test_parse_signature_shapes() {
		assert!(matches!(
			parse_signature(&[0u8; 64]),
			Err(TokenError::MalformedSignature(_))
		));
		assert!(matches!(
			parse_signature(&[0u8; 66]),
			Err(TokenError::MalformedSignature(_))
		));

		let mut raw = sign(&Domain::default(), &sample());
		let legacy_v = raw[64];
		raw[64] = 29;
		assert!(matches!(
			parse_signature(&raw),
			Err(TokenError::MalformedSignature(_))
		));

		// Raw parity bits are accepted alongside 27/28
		raw[64] = legacy_v - 27;
		assert_eq!(
			recover_signer(&Domain::default(), &FieldSchema::powo(), &sample(), &raw).unwrap(),
			ANVIL_ADDRESS
		);
	}

	#[test]
	fn test_short_signature_reason_detail() {
		assert_eq!(
			check(&sample(), &[0u8; 12], &ANVIL_ADDRESS, at(2024)),
			Verification::Invalid(InvalidReason::MalformedSignature(
				"Expected 65 bytes, got 12".to_string()
			))
		);
	}

	#[test]
	fn test_zero_signature_is_malformed() {
		let mut zero = [0u8; 65];
		zero[64] = 27;
		assert!(matches!(
			check(&sample(), &zero, &ANVIL_ADDRESS, at(2024)),
			Verification::Invalid(InvalidReason::MalformedSignature(_))
		));
	}

	#[test]
	fn test_token_verifier_uses_injected_clock() {
		let value = sample();
		let signature = sign(&Domain::default(), &value);
		let codec = MessageCodec::powo(Domain::default());

		let early = TokenVerifier::new(codec.clone(), Arc::new(FixedClock(at(2024))));
		assert!(early.verify(&value, &signature, &ANVIL_ADDRESS).is_valid());

		let late = TokenVerifier::new(codec, Arc::new(FixedClock(at(2100))));
		assert_eq!(
			late.verify(&value, &signature, &ANVIL_ADDRESS)
				.reason()
				.map(|r| r.code()),
			Some("expired")
		);
		assert_eq!(
			late.recover_signer(&value, &signature).unwrap(),
			ANVIL_ADDRESS
		);
	}

	#[test]
	fn test_verify_token_ignores_claimed_signer() {
		let value = sample();
		let token = SignedToken {
			signature: sign(&Domain::default(), &value).into(),
			message: value,
			signer: OTHER_ADDRESS,
		};
		let verifier = TokenVerifier::new(
			MessageCodec::powo(Domain::default()),
			Arc::new(FixedClock(at(2024))),
		);

		assert!(verifier.verify_token(&token, &ANVIL_ADDRESS).is_valid());
		assert!(!verifier.verify_token(&token, &OTHER_ADDRESS).is_valid());
	}

	#[test]
	fn test_verification_is_repeatable() {
		let value = sample();
		let signature = sign(&Domain::default(), &value);
		let first = check(&value, &signature, &ANVIL_ADDRESS, at(2024));
		for _ in 0..8 {
			assert_eq!(check(&value, &signature, &ANVIL_ADDRESS, at(2024)), first);
		}
	}
}
