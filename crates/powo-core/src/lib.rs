//! Core of PoWo token issuance and verification.
//!
//! - [`codec`] turns a domain, a field schema and a message value into the
//!   EIP-712 digest that is actually signed, and into the typed-data request
//!   handed to wallets.
//! - [`verifier`] recovers the signer of a digest and classifies a token as
//!   valid or invalid for a given expected signer and instant.
//! - [`issuer`] stamps, signs and self-checks new tokens through an injected
//!   signer.
//!
//! Everything except the signer round trip is synchronous, stateless and safe
//! to share across threads. Time is always injected through [`Clock`].

pub mod clock;
pub mod codec;
pub mod issuer;
pub mod verifier;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{digest, encode_domain, encode_type, encode_value, MessageCodec};
pub use issuer::{IssueError, TokenIssuer, DEFAULT_TOKEN_LIFETIME_MINUTES};
pub use verifier::{parse_signature, recover_signer, verify, TokenVerifier};
