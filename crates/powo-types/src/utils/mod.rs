//! Utility functions for encoding, parsing and formatting.
//!
//! This module provides the EIP-712 word encoder plus the helpers that move
//! addresses, hex strings and timestamps across textual boundaries.

pub mod conversion;
pub mod eip712;
pub mod formatting;
pub mod helpers;

pub use conversion::{parse_address, to_checksum};
pub use eip712::{compute_domain_hash, compute_final_digest, Eip712AbiEncoder, DOMAIN_TYPE};
pub use formatting::{format_hex, truncate_id, without_0x_prefix};
pub use helpers::{format_timestamp, parse_timestamp};
