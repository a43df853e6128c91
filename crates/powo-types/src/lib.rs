//! Common types for PoWo token issuance and verification.
//!
//! This crate defines the data shared by every other crate of the workspace:
//! the signing domain, the message schema and value, signed tokens,
//! verification outcomes and the error taxonomy, plus the low-level EIP-712
//! word encoder the codec is built on.

/// Signing domain parameters.
pub mod domain;
/// Error taxonomy for caller input.
pub mod error;
/// Message values and field lookup.
pub mod message;
/// Registry trait for pluggable implementations.
pub mod registry;
/// Requests handed to signers.
pub mod request;
/// Ordered field schemas.
pub mod schema;
/// Redacting wrapper for key material.
pub mod secret_string;
/// Signed tokens and verification outcomes.
pub mod token;
/// Encoding, parsing and formatting helpers.
pub mod utils;
/// TOML schema validation for implementation configs.
pub mod validation;

pub use domain::{Domain, DEFAULT_CHAIN_ID, DOMAIN_NAME, DOMAIN_VERSION};
pub use error::TokenError;
pub use message::{FieldValue, MessageValue};
pub use registry::ImplementationRegistry;
pub use request::SigningRequest;
pub use schema::{FieldKind, FieldSchema, TypedField, POWO_TYPE_NAME};
pub use secret_string::SecretString;
pub use token::{InvalidReason, SignedToken, Verification};
pub use utils::{format_hex, parse_address, to_checksum, without_0x_prefix};
pub use validation::{ConfigSchema, Field, Schema, ValidationError};

pub use alloy_primitives::{Address, Bytes, B256};
